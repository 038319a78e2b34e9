//! # Storage Traits
//!
//! This module defines the seams between the backend and the capabilities the
//! host runtime provides: a key-value preference store, photo acquisition and
//! app-private file storage. The domain layer only talks to these traits, so
//! the concrete providers can be swapped without touching it.

use anyhow::Result;
use async_trait::async_trait;
use shared::{PhotoSource, UserNotice};

/// Trait defining the interface for key-value preference storage
///
/// Values are opaque UTF-8 text; callers decide how to encode them.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Retrieve the value stored under `key`
    async fn get_value(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, overwriting any existing value for the same key
    async fn put_value(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value by its key
    /// Returns true if the key existed
    async fn delete_value(&self, key: &str) -> Result<bool>;

    /// List all keys in alphabetical order
    async fn list_keys(&self) -> Result<Vec<String>>;
}

/// Parameters for a photo acquisition request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRequest {
    pub source: PhotoSource,
    /// JPEG quality hint, 1..=100
    pub quality: u8,
    pub allow_editing: bool,
}

/// Encoded image returned by a photo provider (a data URL)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPayload {
    pub data_url: String,
}

/// Failure modes of photo acquisition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoError {
    #[error("Photo request was cancelled by the user")]
    Cancelled,
    #[error("Permission to access the {0:?} was denied")]
    PermissionDenied(PhotoSource),
    #[error("Photo provider unavailable: {0}")]
    Unavailable(String),
}

impl PhotoError {
    /// Toast shown to the user when acquiring a photo from `source` failed
    pub fn notice(&self, source: PhotoSource) -> UserNotice {
        match source {
            PhotoSource::Camera => {
                UserNotice::error("Camera error", "Failed to capture photo. Please try again.")
            }
            PhotoSource::Photos => {
                UserNotice::error("Gallery error", "Failed to select photo. Please try again.")
            }
        }
    }
}

/// Trait for the host's photo capture / photo library capability
#[async_trait]
pub trait PhotoProvider: Send + Sync {
    async fn get_photo(&self, request: PhotoRequest) -> std::result::Result<PhotoPayload, PhotoError>;
}

/// Trait for app-private file storage
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Persist `data` under `file_name` and return a resolvable URI
    async fn write_file(&self, file_name: &str, data: &str) -> Result<String>;

    /// Remove a file written by [`write_file`](Self::write_file)
    /// Returns true if the file existed
    async fn delete_file(&self, file_name: &str) -> Result<bool>;
}
