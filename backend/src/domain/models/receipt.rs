use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{ReceiptFormData, UserNotice};

use crate::domain::warranty::parse_warranty_date;
use crate::storage::StoreError;

/// Add-receipt form input that passed validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedReceiptForm {
    pub name: String,
    pub category_id: String,
    pub warranty_date: NaiveDate,
    pub photo: Option<String>,
}

impl ValidatedReceiptForm {
    /// Check the form fields in the order the form shows them
    pub fn validate(form: &ReceiptFormData) -> Result<Self, ReceiptValidationError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(ReceiptValidationError::EmptyName);
        }

        let category_id = form.category_id.trim();
        if category_id.is_empty() {
            return Err(ReceiptValidationError::MissingCategory);
        }

        let warranty_date = form.warranty_date.trim();
        if warranty_date.is_empty() {
            return Err(ReceiptValidationError::MissingWarrantyDate);
        }
        let warranty_date = parse_warranty_date(warranty_date)
            .ok_or_else(|| ReceiptValidationError::InvalidWarrantyDate(warranty_date.to_string()))?;

        let photo = form
            .photo
            .as_ref()
            .filter(|photo| !photo.is_empty())
            .cloned();

        Ok(Self {
            name: name.to_string(),
            category_id: category_id.to_string(),
            warranty_date,
            photo,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReceiptValidationError {
    #[error("Please enter a receipt name.")]
    EmptyName,
    #[error("Please select a category.")]
    MissingCategory,
    #[error("Please select a warranty date.")]
    MissingWarrantyDate,
    #[error("Warranty date '{0}' is not a valid date.")]
    InvalidWarrantyDate(String),
}

/// Why adding a receipt failed. No variant leaves a partial change behind.
#[derive(Debug, thiserror::Error)]
pub enum AddReceiptError {
    #[error(transparent)]
    Validation(#[from] ReceiptValidationError),
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Failed to store receipt photo: {0}")]
    PhotoStorage(#[source] anyhow::Error),
    /// Only raised when writes must be acknowledged before they become visible
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl AddReceiptError {
    /// Toast shown to the user for this failure
    pub fn notice(&self) -> UserNotice {
        match self {
            AddReceiptError::Validation(e) => UserNotice::error("Missing information", &e.to_string()),
            AddReceiptError::CategoryNotFound(_)
            | AddReceiptError::PhotoStorage(_)
            | AddReceiptError::Persistence(_) => {
                UserNotice::error("Save error", "Failed to save receipt. Please try again.")
            }
        }
    }
}
