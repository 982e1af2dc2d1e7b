//! Translation of engine log output into progress updates.

/// A discrete progress update derived from engine output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub progress: u8,
    pub message: String,
}

/// Maps one chunk of engine stdout to a progress update, if any.
///
/// Kept behind a trait so the substring heuristic below can be replaced
/// with structured phase events if the engine ever emits them.
pub trait ProgressTranslator: Send + Sync {
    fn translate(&self, chunk: &str) -> Option<ProgressUpdate>;
}

struct Marker {
    needle: &'static str,
    progress: u8,
    message: &'static str,
}

/// Substring-based progress translator.
///
/// Holds an ordered table of (marker, progress, message) entries checked in
/// priority order; the first marker found in a chunk wins, and chunks
/// matching nothing are ignored. COMPATIBILITY RISK: the markers are coupled
/// to the engine's exact log phrasing and silently stop matching if the
/// engine rewords its log lines. Terminal progress (100) is never produced
/// here; it comes from the final result payload.
pub struct MarkerTranslator {
    markers: Vec<Marker>,
}

impl MarkerTranslator {
    pub fn new() -> Self {
        Self {
            markers: vec![
                Marker {
                    needle: "Preprocessing completed",
                    progress: 40,
                    message: "Preprocessing completed, starting segmentation...",
                },
                Marker {
                    needle: "Segmentation completed",
                    progress: 60,
                    message: "Segmentation completed, generating STL...",
                },
                Marker {
                    needle: "Generating STL file",
                    progress: 80,
                    message: "Generating 3D model...",
                },
            ],
        }
    }
}

impl Default for MarkerTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTranslator for MarkerTranslator {
    fn translate(&self, chunk: &str) -> Option<ProgressUpdate> {
        self.markers
            .iter()
            .find(|m| chunk.contains(m.needle))
            .map(|m| ProgressUpdate {
                progress: m.progress,
                message: m.message.to_string(),
            })
    }
}
