//! Songs directory layout and the generated `compose-nogpu.yml`.
//!
//! The container keeps model downloads and caches in bind-mounted host
//! folders so that repeated conversions do not download whisper, demucs
//! and crepe weights again:
//!
//! ```text
//! songs/
//!   compose-nogpu.yml
//!   output/      -> /app/UltraSinger/src/output   (finished charts)
//!   input/       -> /app/UltraSinger/src/input    (local media copied in)
//!   cache/       -> /root/.cache
//!   torch_ext/   -> /app/UltraSinger/src/torch_ext
//!   local/       -> /root/.local
//! ```

use crate::errors::ConvertError;
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const COMPOSE_FILE_NAME: &str = "compose-nogpu.yml";
pub const SERVICE_NAME: &str = "ultrasinger";

pub const CONTAINER_SRC_DIR: &str = "/app/UltraSinger/src";
pub const CONTAINER_OUTPUT_DIR: &str = "/app/UltraSinger/src/output";
pub const CONTAINER_INPUT_DIR: &str = "/app/UltraSinger/src/input";
const CONTAINER_TORCH_EXT_DIR: &str = "/app/UltraSinger/src/torch_ext";
const CONTAINER_CACHE_DIR: &str = "/root/.cache";
const CONTAINER_LOCAL_DIR: &str = "/root/.local";

/// Host-side folders mounted into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongsLayout {
    root: PathBuf,
}

impl SongsLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join("input")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    pub fn local_dir(&self) -> PathBuf {
        self.root.join("local")
    }

    pub fn torch_ext_dir(&self) -> PathBuf {
        self.root.join("torch_ext")
    }

    pub fn compose_path(&self) -> PathBuf {
        self.root.join(COMPOSE_FILE_NAME)
    }

    /// Create the root and every mounted folder.
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        for dir in [
            self.output_dir(),
            self.input_dir(),
            self.cache_dir(),
            self.local_dir(),
            self.torch_ext_dir(),
        ] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(())
    }

    /// Copy a local media file into `input/` and return the copy's path.
    pub fn stage_input(&self, file: &Path) -> anyhow::Result<PathBuf> {
        let name = file
            .file_name()
            .with_context(|| format!("{} has no file name", file.display()))?;
        let target = self.input_dir().join(name);
        std::fs::copy(file, &target).with_context(|| {
            format!("Failed to copy {} to {}", file.display(), target.display())
        })?;
        Ok(target)
    }
}

/// Top-level compose document.
#[derive(Debug, Clone, Serialize)]
pub struct ComposeFile {
    pub services: BTreeMap<String, ComposeService>,
}

/// The single UltraSinger service.
#[derive(Debug, Clone, Serialize)]
pub struct ComposeService {
    pub container_name: String,
    pub image: String,
    pub stdin_open: bool,
    pub tty: bool,
    pub user: String,
    pub volumes: Vec<String>,
    pub environment: Vec<String>,
}

impl ComposeFile {
    /// CPU-only compose file for the given layout, image and container name.
    pub fn for_layout(layout: &SongsLayout, image: &str, container_name: &str) -> Self {
        let mount = |host: PathBuf, container: &str| format!("{}:{}", host.display(), container);

        let service = ComposeService {
            container_name: container_name.to_string(),
            image: image.to_string(),
            stdin_open: true,
            tty: true,
            user: "root".to_string(),
            volumes: vec![
                mount(layout.output_dir(), CONTAINER_OUTPUT_DIR),
                mount(layout.input_dir(), CONTAINER_INPUT_DIR),
                mount(layout.cache_dir(), CONTAINER_CACHE_DIR),
                mount(layout.torch_ext_dir(), CONTAINER_TORCH_EXT_DIR),
                mount(layout.local_dir(), CONTAINER_LOCAL_DIR),
            ],
            environment: vec![
                format!("XDG_CACHE_HOME={}", CONTAINER_CACHE_DIR),
                format!("TORCH_HOME={}/torch", CONTAINER_CACHE_DIR),
                format!("TRANSFORMERS_CACHE={}/huggingface/hub", CONTAINER_CACHE_DIR),
                format!("MPLCONFIGDIR={}/matplotlib", CONTAINER_CACHE_DIR),
                format!("TORCH_EXTENSIONS_DIR={}", CONTAINER_TORCH_EXT_DIR),
                format!("XDG_DATA_HOME={}", CONTAINER_LOCAL_DIR),
            ],
        };

        let mut services = BTreeMap::new();
        services.insert(SERVICE_NAME.to_string(), service);
        Self { services }
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize compose file")
    }

    /// Write the compose file into the layout root and return its path.
    pub fn write(&self, layout: &SongsLayout) -> Result<PathBuf, ConvertError> {
        let path = layout.compose_path();
        let yaml = self.to_yaml()?;
        std::fs::write(&path, yaml).map_err(|source| ConvertError::ComposeWriteFailed {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "compose file written");
        Ok(path)
    }
}
