//! # Photo File Storage
//!
//! Stores receipt photos in the app-private data directory.
//!
//! ```text
//! data/
//! ├── receipts.db
//! └── photos/
//!     ├── receipt_1712345678901.jpg
//!     └── receipt_1712345690000.jpg
//! ```
//!
//! Payloads are written verbatim with a temp file + rename so a crash never
//! leaves a half-written photo behind. Every write gets its own temp file.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::traits::FileStorage;

/// File storage rooted at `<base_directory>/photos`
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    photos_directory: PathBuf,
}

impl LocalFileStorage {
    /// Create the storage, creating the photos directory if it doesn't exist
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let photos_directory = base_directory.as_ref().join("photos");

        if !photos_directory.exists() {
            fs::create_dir_all(&photos_directory)?;
            info!("Created photos directory: {}", photos_directory.display());
        }

        Ok(Self { photos_directory })
    }

    pub fn photos_directory(&self) -> &Path {
        &self.photos_directory
    }

    fn validate_file_name(file_name: &str) -> Result<()> {
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.contains("..")
        {
            return Err(anyhow!("Invalid photo file name: '{}'", file_name));
        }
        Ok(())
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn write_file(&self, file_name: &str, data: &str) -> Result<String> {
        Self::validate_file_name(file_name)?;

        let file_path = self.photos_directory.join(file_name);
        let temp_path = self
            .photos_directory
            .join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        tokio::fs::write(&temp_path, data).await?;
        tokio::fs::rename(&temp_path, &file_path).await?;

        let absolute_path = tokio::fs::canonicalize(&file_path).await?;
        let uri = format!("file://{}", absolute_path.display());

        debug!("Stored photo ({} bytes) at {}", data.len(), uri);
        Ok(uri)
    }

    async fn delete_file(&self, file_name: &str) -> Result<bool> {
        Self::validate_file_name(file_name)?;

        match tokio::fs::remove_file(self.photos_directory.join(file_name)).await {
            Ok(()) => {
                info!("Removed photo {}", file_name);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
