//! Conversion input: a YouTube URL or a local media file.

use crate::compose::CONTAINER_INPUT_DIR;
use crate::errors::SourceError;
use std::path::{Path, PathBuf};
use url::Url;

const LOCAL_EXTENSIONS: &[&str] = &["mp3", "mp4"];

/// Validated conversion input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Remote video, already normalized.
    Url(String),
    /// Local media file on the host.
    LocalFile(PathBuf),
}

impl Source {
    /// Classify and validate raw user input.
    ///
    /// `http://` and `https://` inputs are URLs and are normalized with
    /// [`normalize_youtube_url`]. Anything else must be an existing `.mp3`
    /// or `.mp4` file.
    pub fn parse(input: &str) -> Result<Self, SourceError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SourceError::Empty);
        }

        if input.starts_with("http://") || input.starts_with("https://") {
            return Ok(Source::Url(normalize_youtube_url(input)));
        }

        let path = Path::new(input);
        if !path.is_file() {
            return Err(SourceError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| LOCAL_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !supported {
            return Err(SourceError::UnsupportedExtension {
                path: path.to_path_buf(),
            });
        }

        Ok(Source::LocalFile(path.to_path_buf()))
    }

    /// The `-i` argument UltraSinger sees inside the container.
    pub fn container_argument(&self) -> String {
        match self {
            Source::Url(url) => url.clone(),
            Source::LocalFile(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("{}/{}", CONTAINER_INPUT_DIR, name)
            }
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{}", url),
            Source::LocalFile(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Keep only the `v` parameter of a video URL.
///
/// Playlist and tracking parameters (`list`, `index`, `t`, `si`, ...) make
/// the downloader fetch whole playlists, so they are dropped. URLs without a
/// `v` parameter lose their query entirely. Unparseable input is returned
/// unchanged.
pub fn normalize_youtube_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    let video_id = url
        .query_pairs()
        .find(|(key, value)| key == "v" && !value.is_empty())
        .map(|(_, value)| value.into_owned());

    url.set_query(None);
    if let Some(id) = video_id {
        url.query_pairs_mut().append_pair("v", &id);
    }
    url.to_string()
}

/// Quote a value for a POSIX shell command line.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
