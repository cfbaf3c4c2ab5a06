//! Progress interpretation for UltraSinger's console output.
//!
//! UltraSinger (and the tools it drives: yt-dlp, demucs, whisper) print
//! progress in several unrelated formats. This module turns that stream,
//! one line at a time, into a `(label, percent)` pair:
//!
//! - `[UltraSinger] Separating vocals` - phase announcements set the label
//! - `Downloading item 3 of 10` - item counters
//! - `12/552` - ratio counters at the start of a line
//! - `[download]  37.5% of 4.20MiB` - yt-dlp download progress
//! - `  45%|████▌     |` - bare percentages from progress bars
//! - any other `NN%` in the line as a last resort
//!
//! The interpreter is synchronous and does no I/O; callers feed it lines in
//! arrival order and forward the updates it returns.

mod heuristics;
mod interpreter;
mod types;

pub use heuristics::strip_ansi;
pub use interpreter::{DEFAULT_TAG, Interpreter};
pub use types::{DEFAULT_LABEL, FALLBACK_LABEL, Heuristic, InterpreterState, ProgressUpdate};
