//! UltraSinger flag catalogue and the immutable options of one conversion.
//!
//! Flags are selected as `name` or `name=value` strings (CLI `-f` and the
//! `[defaults].flags` list in config.toml). Three kinds exist:
//!
//! | Kind     | Example                  | Rendered as                 |
//! |----------|--------------------------|-----------------------------|
//! | `Switch` | `force_cpu`              | `--force_cpu`               |
//! | `Choice` | `whisper=large-v2`       | `--whisper large-v2`        |
//! | `Value`  | `cookiefile=/c.txt`      | `--cookiefile /c.txt`       |
//!
//! A choice flag without a value takes its first choice.

use crate::errors::OptionsError;
use crate::source::Source;
use std::fmt;

/// How a flag takes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// Boolean switch, never takes a value.
    Switch,
    /// Value restricted to `FlagSpec::choices`.
    Choice,
    /// Free-form value, optional.
    Value,
}

/// One entry of the flag catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: &'static str,
    pub kind: FlagKind,
    pub choices: &'static [&'static str],
    pub help: &'static str,
}

impl FlagSpec {
    const fn switch(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            kind: FlagKind::Switch,
            choices: &[],
            help,
        }
    }

    const fn choice(
        name: &'static str,
        choices: &'static [&'static str],
        help: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FlagKind::Choice,
            choices,
            help,
        }
    }

    const fn value(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            kind: FlagKind::Value,
            choices: &[],
            help,
        }
    }

    /// Preselected value for choice flags.
    pub fn default_value(&self) -> Option<&'static str> {
        self.choices.first().copied()
    }
}

/// Every UltraSinger flag the wrapper can pass through, in command-line order.
pub const FLAGS: &[FlagSpec] = &[
    FlagSpec::switch("interactive", "Interactive mode"),
    FlagSpec::choice(
        "whisper",
        &[
            "tiny", "base", "small", "medium", "large-v1", "large-v2", "large-v3", "tiny.en",
            "base.en", "small.en", "medium.en",
        ],
        "Whisper transcription model",
    ),
    FlagSpec::value("whisper_align_model", "Alignment model (huggingface id)"),
    FlagSpec::choice(
        "language",
        &["en", "fr", "de", "es", "it", "ja", "zh", "nl", "uk", "pt"],
        "Language of the song",
    ),
    FlagSpec::value("whisper_batch_size", "Whisper batch size"),
    FlagSpec::choice("whisper_compute_type", &["float16", "int8"], "Whisper compute type"),
    FlagSpec::switch("keep_numbers", "Keep numbers in lyrics instead of spelling them out"),
    FlagSpec::choice("crepe", &["tiny", "full"], "Crepe pitch model"),
    FlagSpec::value("crepe_step_size", "Crepe step size in milliseconds"),
    FlagSpec::switch("disable_hyphenation", "Disable word hyphenation"),
    FlagSpec::switch("disable_separation", "Skip vocal separation"),
    FlagSpec::switch("disable_karaoke", "Do not create the karaoke audio file"),
    FlagSpec::switch("create_audio_chunks", "Write audio chunks"),
    FlagSpec::switch("keep_cache", "Keep the cache folder"),
    FlagSpec::switch("plot", "Plot the pitch data"),
    FlagSpec::choice(
        "format_version",
        &["0.3.0", "1.0.0", "1.1.0", "1.2.0", "2.0.0"],
        "UltraStar file format version",
    ),
    FlagSpec::value("musescore_path", "Path to MuseScore inside the container"),
    FlagSpec::value("ffmpeg", "Path to ffmpeg inside the container"),
    FlagSpec::value("cookiefile", "Cookie file for YouTube downloads"),
    FlagSpec::switch("force_cpu", "Run everything on the CPU"),
    FlagSpec::switch("force_whisper_cpu", "Run whisper on the CPU"),
    FlagSpec::switch("force_crepe_cpu", "Run crepe on the CPU"),
];

/// Look up a flag by name. A leading `--` is accepted.
pub fn find_flag(name: &str) -> Option<&'static FlagSpec> {
    let name = name.trim_start_matches("--");
    FLAGS.iter().find(|spec| spec.name == name)
}

/// A validated flag selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSelection {
    spec: &'static FlagSpec,
    value: Option<String>,
}

impl FlagSelection {
    /// Parse `name` or `name=value`, validating against the catalogue.
    pub fn parse(raw: &str) -> Result<Self, OptionsError> {
        let raw = raw.trim();
        let (name, value) = match raw.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (raw, None),
        };
        let spec = find_flag(name).ok_or_else(|| OptionsError::UnknownFlag(name.to_string()))?;

        let value = match (spec.kind, value) {
            (FlagKind::Switch, Some(_)) => {
                return Err(OptionsError::UnexpectedValue {
                    flag: spec.name.to_string(),
                });
            }
            (FlagKind::Switch, None) => None,
            (FlagKind::Choice, None) => spec.default_value().map(str::to_string),
            (FlagKind::Choice, Some(value)) => {
                if !spec.choices.contains(&value) {
                    return Err(OptionsError::InvalidChoice {
                        flag: spec.name.to_string(),
                        value: value.to_string(),
                        allowed: spec.choices.join(", "),
                    });
                }
                Some(value.to_string())
            }
            (FlagKind::Value, value) => value.filter(|v| !v.is_empty()).map(str::to_string),
        };

        Ok(Self { spec, value })
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Command-line arguments for this flag.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![format!("--{}", self.spec.name)];
        if let Some(value) = &self.value {
            args.push(value.clone());
        }
        args
    }

    fn catalogue_index(&self) -> usize {
        FLAGS
            .iter()
            .position(|spec| spec.name == self.spec.name)
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Display for FlagSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.spec.name, value),
            None => write!(f, "{}", self.spec.name),
        }
    }
}

/// Parse a list of raw selections, failing on the first invalid one.
pub fn parse_selections<S: AsRef<str>>(raw: &[S]) -> Result<Vec<FlagSelection>, OptionsError> {
    raw.iter().map(|s| FlagSelection::parse(s.as_ref())).collect()
}

/// Everything one conversion needs from the user. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    source: Source,
    flags: Vec<FlagSelection>,
}

impl ConversionOptions {
    /// Build options from a source and flag selections.
    ///
    /// Later selections of the same flag replace earlier ones; the result is
    /// kept in catalogue order.
    pub fn new(source: Source, selections: impl IntoIterator<Item = FlagSelection>) -> Self {
        let mut flags: Vec<FlagSelection> = Vec::new();
        for selection in selections {
            flags.retain(|existing| existing.name() != selection.name());
            flags.push(selection);
        }
        flags.sort_by_key(FlagSelection::catalogue_index);
        Self { source, flags }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn flags(&self) -> &[FlagSelection] {
        &self.flags
    }

    /// UltraSinger arguments for the selected flags.
    pub fn to_args(&self) -> Vec<String> {
        self.flags.iter().flat_map(FlagSelection::to_args).collect()
    }

    /// Selections in the `name[=value]` form used by the config file.
    pub fn flag_strings(&self) -> Vec<String> {
        self.flags.iter().map(ToString::to_string).collect()
    }
}
