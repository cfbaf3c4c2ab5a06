//! Typed error hierarchy for yt2ultrastar.
//!
//! Three top-level enums cover the three subsystems:
//! - `SourceError`: validating the user's input (URL or local file)
//! - `OptionsError`: parsing UltraSinger flag selections
//! - `ConvertError`: container runtime and conversion run failures

use thiserror::Error;

/// Errors from validating the conversion input.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Enter a YouTube URL or a local MP3/MP4 file")]
    Empty,

    #[error("Input file not found: {path}")]
    NotFound { path: std::path::PathBuf },

    #[error("Unsupported input file {path}: expected an .mp3 or .mp4 file")]
    UnsupportedExtension { path: std::path::PathBuf },
}

/// Errors from parsing UltraSinger flag selections.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("Unknown UltraSinger flag '{0}'. Run 'yt2ultrastar flags' to list them")]
    UnknownFlag(String),

    #[error("Invalid value '{value}' for --{flag}. Valid values: {allowed}")]
    InvalidChoice {
        flag: String,
        value: String,
        allowed: String,
    },

    #[error("Flag --{flag} is a switch and does not take a value")]
    UnexpectedValue { flag: String },
}

/// Errors from the container runtime and the conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Docker not found. Install Docker with the compose plugin and try again")]
    DockerUnavailable,

    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} failed with exit code {code}")]
    StepFailed { step: String, code: i32 },

    #[error("Failed to write compose file at {path}: {source}")]
    ComposeWriteFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
