//! Presentation of conversion progress.
//!
//! The runner reports through the [`ProgressSink`] trait; `--ui` picks the
//! implementation:
//!
//! | Mode      | Sink           | Output                                  |
//! |-----------|----------------|-----------------------------------------|
//! | `full`    | `ConversionUI` | indicatif progress bar with phase label |
//! | `minimal` | `PlainSink`    | one text line per change                |
//! | `json`    | `JsonSink`     | one JSON object per event               |

pub mod icons;
pub mod plain;
pub mod progress;

pub use plain::{JsonSink, PlainSink};
pub use progress::ConversionUI;

use crate::progress::ProgressUpdate;
use crate::runner::RunOutcome;

/// Receiver of everything a conversion run reports.
///
/// Implementations clamp percentages to 100 before display.
pub trait ProgressSink: Send {
    /// A setup stage started ("Starting container...").
    fn stage(&mut self, message: &str);
    /// The interpreter produced an update.
    fn progress(&mut self, update: &ProgressUpdate);
    /// A raw line of tool output.
    fn output(&mut self, line: &str);
    /// The conversion process exited.
    fn finish(&mut self, outcome: &RunOutcome);
    /// The run stopped before the process exited.
    fn abort(&mut self, message: &str);
}

/// Output mode for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    /// Progress bar
    #[default]
    Full,
    /// Plain status lines
    Minimal,
    /// JSON-formatted events
    Json,
}

impl std::str::FromStr for UiMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "minimal" => Self::Minimal,
            _ => Self::Full,
        })
    }
}

impl UiMode {
    /// Parse UI mode from string (convenience method).
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

/// Build the sink for a mode. `verbose` also shows raw tool output.
pub fn make_sink(mode: UiMode, verbose: bool) -> Box<dyn ProgressSink> {
    match mode {
        UiMode::Full => Box::new(ConversionUI::new(verbose)),
        UiMode::Minimal => Box::new(PlainSink::stdout(verbose)),
        UiMode::Json => Box::new(JsonSink::stdout(verbose)),
    }
}
