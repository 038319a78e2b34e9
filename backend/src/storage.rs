//! # Storage Module
//!
//! Handles all data persistence for the receipt tracker.
//!
//! The host runtime owns the actual persistence capabilities; this module
//! describes them as traits and ships the providers used on the desktop and
//! in tests:
//!
//! - **SqliteKeyValueStore**: preference store backed by a SQLite table
//! - **InMemoryKeyValueStore**: preference store for tests and previews
//! - **LocalFileStorage**: photo files in the app data directory
//!
//! On top of a preference store, [`CollectionStore`] keeps one named
//! collection cached in memory and writes every change through.

pub mod collection_store;
pub mod file_storage;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use collection_store::{
    CollectionStore, StoreError, StoreState, WriteMode, CATEGORIES_KEY, RECEIPTS_KEY,
};
pub use file_storage::LocalFileStorage;
pub use memory::InMemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;
pub use traits::{FileStorage, KeyValueStorage, PhotoError, PhotoPayload, PhotoProvider, PhotoRequest};
