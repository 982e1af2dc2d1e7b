//! Test doubles for the processing engine.
//!
//! Real engine runs need a Python imaging stack, so tests stand in a shell
//! script for the engine: configure the launcher with `python_path = "sh"`
//! and `script_path` pointing at one of the scripts written here. The
//! scripts honor the engine contract (config JSON as the single argument,
//! marker lines then one result payload on stdout, diagnostics on stderr).

use std::path::{Path, PathBuf};

/// Engine that emits all progress markers, writes an STL into the output
/// directory and prints a success payload.
pub const SUCCEEDING_ENGINE: &str = r#"
out=$(printf '%s' "$1" | sed -n 's/.*"output_dir":"\([^"]*\)".*/\1/p')
echo "Loading DICOM series..."
echo "Preprocessing completed"
echo "Segmentation completed"
echo "Generating STL file..."
printf 'solid scanforge\nendsolid scanforge\n' > "$out/model.stl"
printf '{"success": true, "stl_path": "%s/model.stl"}\n' "$out"
"#;

/// Engine that dies with diagnostics on stderr, the way an OOM-killed
/// segmentation run does.
pub const CRASHING_ENGINE: &str = r#"
echo "Loading DICOM series..."
echo "fatal: out of memory" >&2
exit 137
"#;

/// Engine that exits nonzero without writing anything to stderr.
pub const SILENTLY_CRASHING_ENGINE: &str = r#"
exit 1
"#;

/// Engine that exits cleanly but reports a domain error in its payload.
pub const ERROR_PAYLOAD_ENGINE: &str = r#"
echo "Preprocessing completed"
printf '{"error": "No DICOM series found in input directory"}\n'
"#;

/// Engine that exits cleanly with unparseable stdout.
pub const GARBAGE_OUTPUT_ENGINE: &str = r#"
echo "Preprocessing completed"
echo "this is not a result payload"
"#;

/// Engine that reports a marker then hangs well past any short timeout.
pub const HANGING_ENGINE: &str = r#"
echo "Preprocessing completed"
sleep 600
"#;

/// Engine that succeeds after a short delay; useful for observing the
/// Processing state and for queueing tests.
pub const SLOW_SUCCEEDING_ENGINE: &str = r#"
out=$(printf '%s' "$1" | sed -n 's/.*"output_dir":"\([^"]*\)".*/\1/p')
echo "Preprocessing completed"
sleep 1
echo "Segmentation completed"
printf 'solid scanforge\nendsolid scanforge\n' > "$out/model.stl"
printf '{"success": true, "stl_path": "%s/model.stl"}\n' "$out"
"#;

/// Engine that claims success but points at a file it never wrote.
pub const PHANTOM_ARTIFACT_ENGINE: &str = r#"
out=$(printf '%s' "$1" | sed -n 's/.*"output_dir":"\([^"]*\)".*/\1/p')
printf '{"success": true, "stl_path": "%s/model.stl"}\n' "$out"
"#;

/// Writes an engine script into `dir` and returns its path.
pub fn write_engine_script(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("engine.sh");
    std::fs::write(&path, contents).expect("failed to write engine script");
    path
}

/// A small but valid-looking DICOM blob for upload tests. Real parsing
/// happens inside the engine, so the orchestrator only cares about the
/// file name extension.
pub fn dicom_bytes() -> Vec<u8> {
    let mut bytes = vec![0u8; 128];
    bytes.extend_from_slice(b"DICM");
    bytes.extend_from_slice(&[0x02, 0x00, 0x00, 0x00]);
    bytes
}
