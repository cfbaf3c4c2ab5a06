//! Configuration for yt2ultrastar.
//!
//! Settings live in `.yt2ultrastar/config.toml` in the project directory
//! and are layered file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [container]
//! image = "rakuri255/ultrasinger:latest"
//! name = "UltraSinger"
//! docker_cmd = "docker"
//!
//! [paths]
//! songs_dir = "songs"
//!
//! [progress]
//! tag = "UltraSinger"
//!
//! [defaults]
//! flags = ["language=en", "whisper=large-v2"]
//! ```
//!
//! Environment overrides: `YT2US_IMAGE`, `YT2US_DOCKER_CMD`, `YT2US_SONGS_DIR`.

use crate::options::{FlagSelection, parse_selections};
use crate::progress::DEFAULT_TAG;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = ".yt2ultrastar";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Container settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSection {
    /// Image to run
    #[serde(default = "default_image")]
    pub image: String,
    /// Container name used by `docker exec`
    #[serde(default = "default_container_name")]
    pub name: String,
    /// Docker binary
    #[serde(default = "default_docker_cmd")]
    pub docker_cmd: String,
}

fn default_image() -> String {
    "rakuri255/ultrasinger:latest".to_string()
}

fn default_container_name() -> String {
    "UltraSinger".to_string()
}

fn default_docker_cmd() -> String {
    "docker".to_string()
}

impl Default for ContainerSection {
    fn default() -> Self {
        Self {
            image: default_image(),
            name: default_container_name(),
            docker_cmd: default_docker_cmd(),
        }
    }
}

/// Host paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsSection {
    /// Songs folder, relative to the project directory unless absolute
    #[serde(default = "default_songs_dir")]
    pub songs_dir: PathBuf,
}

fn default_songs_dir() -> PathBuf {
    PathBuf::from("songs")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            songs_dir: default_songs_dir(),
        }
    }
}

/// Progress interpretation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSection {
    /// Bracketed marker of UltraSinger's phase messages, without brackets
    #[serde(default = "default_tag")]
    pub tag: String,
}

fn default_tag() -> String {
    DEFAULT_TAG.to_string()
}

impl Default for ProgressSection {
    fn default() -> Self {
        Self { tag: default_tag() }
    }
}

/// Remembered option flags, applied to every conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsSection {
    /// Flags as `name` or `name=value`
    #[serde(default)]
    pub flags: Vec<String>,
}

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolToml {
    #[serde(default)]
    pub container: ContainerSection,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub progress: ProgressSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
}

impl ToolToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config.toml")
    }

    /// Load from `<config_dir>/config.toml`, or defaults if it doesn't exist.
    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.container.image.trim().is_empty() {
            warnings.push("container.image is empty".to_string());
        }
        if self.container.name.trim().is_empty() {
            warnings.push("container.name is empty".to_string());
        }
        if self.progress.tag.trim().is_empty() {
            warnings.push(
                "progress.tag is empty; phase labels will never be recognised".to_string(),
            );
        }
        for flag in &self.defaults.flags {
            if let Err(e) = FlagSelection::parse(flag) {
                warnings.push(format!("Invalid default flag '{}': {}", flag, e));
            }
        }

        warnings
    }
}

/// Path of the config directory for a project.
pub fn get_config_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_DIR_NAME)
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub project_dir: PathBuf,
    pub config_dir: PathBuf,
    pub toml: ToolToml,
    pub verbose: bool,
}

impl ToolConfig {
    /// Load the configuration of a project directory.
    pub fn new(project_dir: PathBuf, verbose: bool) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let config_dir = get_config_dir(&project_dir);
        let toml = ToolToml::load_or_default(&config_dir)?;

        Ok(Self {
            project_dir,
            config_dir,
            toml,
            verbose,
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Image to run (env → file).
    pub fn image(&self) -> String {
        std::env::var("YT2US_IMAGE").unwrap_or_else(|_| self.toml.container.image.clone())
    }

    /// Docker binary (env → file).
    pub fn docker_cmd(&self) -> String {
        std::env::var("YT2US_DOCKER_CMD").unwrap_or_else(|_| self.toml.container.docker_cmd.clone())
    }

    pub fn container_name(&self) -> &str {
        &self.toml.container.name
    }

    pub fn tag(&self) -> &str {
        &self.toml.progress.tag
    }

    /// Absolute songs folder (env → file), relative paths resolved against the project.
    pub fn songs_dir(&self) -> PathBuf {
        let configured = std::env::var_os("YT2US_SONGS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| self.toml.paths.songs_dir.clone());
        if configured.is_absolute() {
            configured
        } else {
            self.project_dir.join(configured)
        }
    }

    /// Remembered flags, validated.
    pub fn default_flags(&self) -> Result<Vec<FlagSelection>> {
        parse_selections(&self.toml.defaults.flags)
            .with_context(|| {
                format!("Invalid [defaults].flags in {}", self.config_path().display())
            })
    }

    /// Remember `flags` as the defaults for future conversions.
    pub fn save_default_flags(&mut self, flags: Vec<String>) -> Result<PathBuf> {
        self.toml.defaults.flags = flags;
        std::fs::create_dir_all(&self.config_dir).with_context(|| {
            format!("Failed to create config directory {}", self.config_dir.display())
        })?;
        let path = self.config_path();
        self.toml.save(&path)?;
        Ok(path)
    }
}
