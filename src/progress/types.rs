//! Value types produced by the progress interpreter.

use serde::{Deserialize, Serialize};

/// Label used before any phase announcement, and when an announcement is blank.
pub const DEFAULT_LABEL: &str = "Working";

/// Label forced by the catch-all percentage heuristic.
pub const FALLBACK_LABEL: &str = "Working...";

/// Which rule produced an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// `Downloading item <cur> of <tot>`
    ItemCount,
    /// `<cur>/<tot>` at the start of the line
    RatioCount,
    /// `[download] <n>%`
    BracketedDownload,
    /// `<n>%` at the start of the line
    BarePercent,
    /// `<n>%` anywhere in the line
    AnyPercent,
    /// Phase announcement only, percent carried over
    Tag,
}

impl std::fmt::Display for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Heuristic::ItemCount => write!(f, "item-count"),
            Heuristic::RatioCount => write!(f, "ratio-count"),
            Heuristic::BracketedDownload => write!(f, "download"),
            Heuristic::BarePercent => write!(f, "bare-percent"),
            Heuristic::AnyPercent => write!(f, "any-percent"),
            Heuristic::Tag => write!(f, "tag"),
        }
    }
}

/// A `(label, percent)` pair ready for the presentation layer.
///
/// `percent` is not clamped: item and ratio counters where the current
/// value exceeds the total produce values above 100. Use
/// [`ProgressUpdate::clamped_percent`] when rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub label: String,
    pub percent: u32,
    pub source: Heuristic,
}

impl ProgressUpdate {
    pub fn new(label: impl Into<String>, percent: u32, source: Heuristic) -> Self {
        Self {
            label: label.into(),
            percent,
            source,
        }
    }

    /// Percent limited to the 0..=100 range of a progress bar.
    pub fn clamped_percent(&self) -> u32 {
        self.percent.min(100)
    }
}

/// Per-run interpreter state. Reset at the start of every conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterState {
    /// Last phase label announced through the tag.
    pub label: String,
    /// Last percent produced by any heuristic.
    pub percent: u32,
}

impl Default for InterpreterState {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            percent: 0,
        }
    }
}
