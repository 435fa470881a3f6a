//! Local persistence for generated images.
//!
//! Artifacts are named `gemini_<UTC timestamp>.<ext>` and written with
//! exclusive-create semantics, so two calls landing in the same second get
//! distinct files instead of overwriting each other.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::Error;

/// Filename prefix for every stored artifact.
const FILE_PREFIX: &str = "gemini";

/// Timestamp format for artifact names (e.g. 20250114T093045Z).
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Upper bound on collision-suffix attempts for a single timestamp.
const MAX_SUFFIX_ATTEMPTS: u32 = 1000;

/// Writes generated images into the configured output directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Save image bytes and return the path of the file written.
    ///
    /// The directory is created if missing. Existing files are never
    /// overwritten; a name collision is resolved with a numeric suffix.
    ///
    /// # Errors
    /// Returns `Error::Io` if the directory cannot be created, the write
    /// fails, or no unique name could be allocated.
    pub async fn save(&self, bytes: &[u8], mime_type: &str) -> Result<PathBuf, Error> {
        tokio::fs::create_dir_all(&self.root).await?;

        let timestamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        let extension = extension_for_mime(mime_type);
        self.write_unique(&timestamp, extension, bytes).await
    }

    /// Open with `create_new` so an existing file is never clobbered; on
    /// collision, retry with the next numeric suffix.
    async fn write_unique(
        &self,
        timestamp: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, Error> {
        for attempt in 0..=MAX_SUFFIX_ATTEMPTS {
            let file_name = if attempt == 0 {
                format!("{}_{}.{}", FILE_PREFIX, timestamp, extension)
            } else {
                format!("{}_{}_{}.{}", FILE_PREFIX, timestamp, attempt, extension)
            };
            let path = self.root.join(file_name);

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    info!(path = %path.display(), "Saved image to local file");
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "Output name taken, trying next suffix");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!(
                "no unique output name available for timestamp {} after {} attempts",
                timestamp, MAX_SUFFIX_ATTEMPTS
            ),
        )))
    }
}

/// Map an image MIME type to a file extension, defaulting to png.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or(mime_type)
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        _ => "png",
    }
}
