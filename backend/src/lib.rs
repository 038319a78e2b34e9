//! # Receipt Tracker Backend
//!
//! Contains all non-UI logic for the receipt tracker application.
//!
//! - **Domain**: warranty classification, list filtering, the add-receipt flow
//! - **Storage**: preference store, collection stores, photo files
//! - **Config / logging**: ambient setup for the embedding host
//!
//! ## Architecture
//!
//! ```text
//! UI Layer (host runtime)
//!     ↓
//! Domain Layer (services, pure filtering)
//!     ↓
//! Storage Layer (collection stores over a key-value provider)
//! ```
//!
//! The UI reads and writes collections through the services and hands the
//! current [`shared::ReceiptQuery`] to the filter on every render. Nothing in
//! the filtering path performs I/O.

pub mod config;
pub mod domain;
pub mod logging;
pub mod storage;

use anyhow::Result;
use std::fs;
use std::sync::Arc;
use tracing::info;

pub use config::AppConfig;
use domain::{CategoryService, PhotoService, ReceiptService};
use storage::{FileStorage, KeyValueStorage, LocalFileStorage, PhotoProvider, SqliteKeyValueStore};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub category_service: CategoryService,
    pub receipt_service: ReceiptService,
    pub photo_service: PhotoService,
}

/// Initialize the backend on disk: SQLite preferences and photo files
/// under `config.data_directory`.
pub async fn initialize_backend(config: AppConfig, photo_provider: Arc<dyn PhotoProvider>) -> Result<AppState> {
    config.validate()?;

    info!("Setting up data directory at {}", config.data_directory.display());
    fs::create_dir_all(&config.data_directory)?;

    info!("Setting up preference store");
    let preferences: Arc<dyn KeyValueStorage> =
        Arc::new(SqliteKeyValueStore::open_file(&config.database_path()).await?);
    let file_storage: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new(&config.data_directory)?);

    Ok(initialize_with_providers(config, preferences, file_storage, photo_provider).await)
}

/// Wire the services on top of host-supplied providers and load both collections
pub async fn initialize_with_providers(
    config: AppConfig,
    preferences: Arc<dyn KeyValueStorage>,
    file_storage: Arc<dyn FileStorage>,
    photo_provider: Arc<dyn PhotoProvider>,
) -> AppState {
    info!("Setting up domain services");
    let category_service = CategoryService::new(preferences.clone(), config.write_mode);
    let receipt_service = ReceiptService::new(
        preferences,
        category_service.clone(),
        file_storage,
        config.write_mode,
    );
    let photo_service = PhotoService::new(photo_provider, config.photo_quality);

    category_service.load().await;
    receipt_service.load().await;

    info!("Setting up application state");
    AppState {
        config,
        category_service,
        receipt_service,
        photo_service,
    }
}
