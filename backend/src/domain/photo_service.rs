use std::sync::Arc;
use tracing::{error, info};

use crate::storage::{PhotoError, PhotoPayload, PhotoProvider, PhotoRequest};
use shared::{PhotoSource, ReceiptFormData, UserNotice};

pub const DEFAULT_PHOTO_QUALITY: u8 = 90;

/// Service for acquiring receipt photos from the host camera or photo library
#[derive(Clone)]
pub struct PhotoService {
    provider: Arc<dyn PhotoProvider>,
    quality: u8,
}

impl PhotoService {
    pub fn new(provider: Arc<dyn PhotoProvider>, quality: u8) -> Self {
        Self { provider, quality }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Take a new photo with the camera
    pub async fn capture_photo(&self) -> Result<PhotoPayload, PhotoError> {
        self.get_photo(PhotoSource::Camera).await
    }

    /// Pick an existing photo from the library
    pub async fn select_photo(&self) -> Result<PhotoPayload, PhotoError> {
        self.get_photo(PhotoSource::Photos).await
    }

    /// Acquire a photo and attach it to the form being edited.
    ///
    /// On failure the form is left exactly as it was so the user can retry.
    pub async fn attach_photo(&self, source: PhotoSource, form: &mut ReceiptFormData) -> UserNotice {
        match self.get_photo(source).await {
            Ok(payload) => {
                form.photo = Some(payload.data_url);
                match source {
                    PhotoSource::Camera => {
                        UserNotice::info("Photo captured", "Receipt photo has been added successfully.")
                    }
                    PhotoSource::Photos => {
                        UserNotice::info("Photo selected", "Receipt photo has been added successfully.")
                    }
                }
            }
            Err(e) => e.notice(source),
        }
    }

    async fn get_photo(&self, source: PhotoSource) -> Result<PhotoPayload, PhotoError> {
        let request = PhotoRequest {
            source,
            quality: self.quality,
            allow_editing: false,
        };

        match self.provider.get_photo(request).await {
            Ok(payload) => {
                info!("Acquired photo from {:?} ({} bytes)", source, payload.data_url.len());
                Ok(payload)
            }
            Err(PhotoError::Cancelled) => {
                info!("Photo request from {:?} cancelled", source);
                Err(PhotoError::Cancelled)
            }
            Err(e) => {
                error!("Error acquiring photo from {:?}: {}", source, e);
                Err(e)
            }
        }
    }
}
