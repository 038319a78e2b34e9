//! # Domain Module
//!
//! Contains the business logic of the receipt tracker, independent of any UI
//! framework or storage mechanism.
//!
//! ## Module Organization
//!
//! - **warranty**: warranty status classification on calendar dates
//! - **receipt_filter**: search, category and status filtering of the list
//! - **category_service**: the fixed category catalog
//! - **receipt_service**: the receipt collection and the add-receipt flow
//! - **photo_service**: photo acquisition for the add-receipt form
//!
//! ## Business Rules
//!
//! - A warranty expiring today or within the next 30 days is "expiring soon"
//! - A receipt with an unreadable warranty date counts as expired
//! - Filters are permissive by default and combine with AND
//! - Receipts embed a snapshot of their category
//! - New receipts go to the top of the list

pub mod category_service;
pub mod models;
pub mod photo_service;
pub mod receipt_filter;
pub mod receipt_service;
pub mod warranty;

pub use category_service::CategoryService;
pub use photo_service::{PhotoService, DEFAULT_PHOTO_QUALITY};
pub use receipt_filter::{empty_state, filter_receipts, summarize};
pub use receipt_service::ReceiptService;
pub use warranty::{classify_receipt, classify_warranty, parse_warranty_date, EXPIRING_SOON_WINDOW_DAYS};
