use std::env;
use std::future::Future;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use directories::UserDirs;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const SAVE_DIR_ENV: &str = "ROUTE_GPX_SAVE_DIR";
const ASK_SAVE_ENV: &str = "ROUTE_GPX_ASK_SAVE";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Saving {filename} was cancelled.")]
    Cancelled { filename: String },

    #[error("Could not save {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persists a downloaded route export where the user can find it.
pub trait RouteSaver: Clone + Send + Sync + 'static {
    /// Store `payload` as `filename` and return where it ended up.
    fn save(
        &self,
        filename: &str,
        payload: Bytes,
    ) -> impl Future<Output = Result<PathBuf, SaveError>> + Send;
}

/// Writes exports into a fixed directory, creating it when missing.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The user's Downloads directory, or the working directory when the
    /// platform has none.
    pub fn downloads() -> Self {
        let dir = UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl RouteSaver for DirectorySaver {
    async fn save(&self, filename: &str, payload: Bytes) -> Result<PathBuf, SaveError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SaveError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.dir.join(filename);
        write_file(&path, &payload).await?;
        Ok(path)
    }
}

/// Asks for the location with a native save dialog.
#[derive(Debug, Clone, Default)]
pub struct DialogSaver;

impl RouteSaver for DialogSaver {
    async fn save(&self, filename: &str, payload: Bytes) -> Result<PathBuf, SaveError> {
        let path = rfd::AsyncFileDialog::new()
            .set_file_name(filename)
            .add_filter("GPX track", &["gpx"])
            .save_file()
            .await
            .map(|handle| handle.path().to_path_buf())
            .ok_or_else(|| SaveError::Cancelled {
                filename: filename.to_string(),
            })?;

        write_file(&path, &payload).await?;
        Ok(path)
    }
}

/// Save target picked at start-up.
#[derive(Debug, Clone)]
pub enum LocalSaver {
    Directory(DirectorySaver),
    Dialog(DialogSaver),
}

impl LocalSaver {
    /// `ROUTE_GPX_ASK_SAVE=1` selects the dialog, otherwise exports go to
    /// `ROUTE_GPX_SAVE_DIR` or the Downloads directory.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let ask = lookup(ASK_SAVE_ENV).is_some_and(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            )
        });
        if ask {
            return LocalSaver::Dialog(DialogSaver);
        }

        let saver = match lookup(SAVE_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
            Some(dir) => DirectorySaver::new(dir.trim()),
            None => DirectorySaver::downloads(),
        };
        info!(dir = %saver.dir().display(), "saving route exports to directory");
        LocalSaver::Directory(saver)
    }
}

impl RouteSaver for LocalSaver {
    async fn save(&self, filename: &str, payload: Bytes) -> Result<PathBuf, SaveError> {
        match self {
            LocalSaver::Directory(saver) => saver.save(filename, payload).await,
            LocalSaver::Dialog(saver) => saver.save(filename, payload).await,
        }
    }
}

async fn write_file(path: &Path, payload: &[u8]) -> Result<(), SaveError> {
    let io_error = |source: std::io::Error| SaveError::Io {
        path: path.to_path_buf(),
        source,
    };

    debug!(path = %path.display(), bytes = payload.len(), "writing route export");
    let mut file = tokio::fs::File::create(path).await.map_err(io_error)?;
    file.write_all(payload).await.map_err(io_error)?;
    // Flush remaining data to disk
    file.sync_all().await.map_err(io_error)?;
    info!(path = %path.display(), "route export saved");
    Ok(())
}
