//! Wire types for the engine contract.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration passed to the engine as its single JSON argument.
#[derive(Debug, Clone, Serialize)]
pub struct EngineInvocation {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub anatomical_structure: String,
}

/// Final result payload the engine prints to stdout on clean exit.
///
/// Exactly one of `stl_path` / `error` is expected; a payload carrying
/// `error` fails the job even on a zero exit code.
#[derive(Debug, Deserialize)]
pub struct EngineResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub stl_path: Option<PathBuf>,
    #[serde(default)]
    pub error: Option<String>,
}

impl EngineResult {
    /// Parses the result payload out of the engine's captured stdout.
    ///
    /// The engine may interleave log lines before the payload, so if the
    /// whole capture is not valid JSON the last non-empty line is tried.
    pub fn from_stdout(stdout: &str) -> Result<Self, serde_json::Error> {
        let trimmed = stdout.trim();
        match serde_json::from_str(trimmed) {
            Ok(result) => Ok(result),
            Err(e) => {
                let last_line = trimmed.lines().rev().find(|l| !l.trim().is_empty());
                match last_line {
                    Some(line) => serde_json::from_str(line.trim()),
                    None => Err(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_serializes_expected_keys() {
        let invocation = EngineInvocation {
            input_dir: PathBuf::from("/uploads/abc"),
            output_dir: PathBuf::from("/models/abc"),
            anatomical_structure: "bone".to_string(),
        };
        let json = serde_json::to_value(&invocation).unwrap();
        assert_eq!(json["input_dir"], "/uploads/abc");
        assert_eq!(json["output_dir"], "/models/abc");
        assert_eq!(json["anatomical_structure"], "bone");
    }

    #[test]
    fn test_parse_success_payload() {
        let result =
            EngineResult::from_stdout(r#"{"success": true, "stl_path": "/models/abc/model.stl"}"#)
                .unwrap();
        assert!(result.success);
        assert_eq!(
            result.stl_path,
            Some(PathBuf::from("/models/abc/model.stl"))
        );
        assert!(result.error.is_none());
    }

    #[test]
    fn test_parse_error_payload() {
        let result = EngineResult::from_stdout(r#"{"error": "No DICOM series found"}"#).unwrap();
        assert_eq!(result.error.as_deref(), Some("No DICOM series found"));
        assert!(result.stl_path.is_none());
    }

    #[test]
    fn test_parse_payload_after_log_lines() {
        let stdout = "Preprocessing completed\nSegmentation completed\n{\"success\": true, \"stl_path\": \"/m/x.stl\"}\n";
        let result = EngineResult::from_stdout(stdout).unwrap();
        assert_eq!(result.stl_path, Some(PathBuf::from("/m/x.stl")));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(EngineResult::from_stdout("not json at all").is_err());
        assert!(EngineResult::from_stdout("").is_err());
    }
}
