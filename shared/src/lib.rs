use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Display color of a category. The set is fixed; each value maps onto a
/// theme color in the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryColor {
    Electronics,
    Home,
    Automotive,
    Clothing,
    Food,
    Medical,
    Other,
}

/// A fixed classification tag. Receipts embed a copy of the category they
/// were created with, so later catalog changes never reach old receipts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: CategoryColor,
}

impl Category {
    pub fn new(id: &str, name: &str, color: CategoryColor) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color,
        }
    }
}

/// Categories seeded into the store on first run
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("1", "Electronics", CategoryColor::Electronics),
        Category::new("2", "Home & Garden", CategoryColor::Home),
        Category::new("3", "Automotive", CategoryColor::Automotive),
        Category::new("4", "Clothing", CategoryColor::Clothing),
        Category::new("5", "Food & Groceries", CategoryColor::Food),
        Category::new("6", "Medical", CategoryColor::Medical),
        Category::new("7", "Other", CategoryColor::Other),
    ]
}

/// Receipt ID in format: "receipt::epoch_millis"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: String,
    /// Name of the purchased item
    pub name: String,
    /// Snapshot of the category at creation time
    pub category: Category,
    /// Warranty end date (ISO 8601, date only)
    pub warranty_date: String,
    /// URI of the stored photo, empty when the receipt has no photo
    pub photo_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339
    pub updated_at: String,
}

impl Receipt {
    /// Generate a receipt ID from its creation timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("receipt::{}", epoch_millis)
    }

    pub fn has_photo(&self) -> bool {
        !self.photo_path.is_empty()
    }
}

/// Raw input of the add-receipt form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptFormData {
    pub name: String,
    pub category_id: String,
    pub warranty_date: String,
    /// Encoded image payload returned by the photo provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Warranty status of a receipt relative to a reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarrantyStatus {
    /// More than 30 days remaining
    Valid,
    /// Between 0 and 30 days remaining, both inclusive
    ExpiringSoon,
    /// Past the warranty date
    Expired,
}

impl WarrantyStatus {
    pub fn label(&self) -> &'static str {
        match self {
            WarrantyStatus::Valid => "Valid",
            WarrantyStatus::ExpiringSoon => "Expiring Soon",
            WarrantyStatus::Expired => "Expired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyClassification {
    pub status: WarrantyStatus,
    /// Whole calendar days until the warranty date; `None` when the stored
    /// date could not be parsed
    pub days_remaining: Option<i64>,
}

/// Search and filter state of the receipt list. Every field is permissive
/// by default and all active predicates are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReceiptQuery {
    /// Case-insensitive substring of the receipt name
    pub search_text: String,
    /// Allowed category ids; empty means no category restriction
    pub category_ids: BTreeSet<String>,
    pub show_expired_only: bool,
    pub show_expiring_only: bool,
}

impl ReceiptQuery {
    pub fn with_search(search_text: &str) -> Self {
        Self {
            search_text: search_text.to_string(),
            ..Self::default()
        }
    }

    /// Select the category if it is not selected yet, deselect it otherwise
    pub fn toggle_category(&mut self, category_id: &str) {
        if !self.category_ids.remove(category_id) {
            self.category_ids.insert(category_id.to_string());
        }
    }

    /// Number of active filters, as shown on the filter button badge.
    /// Search text is not counted.
    pub fn active_filter_count(&self) -> usize {
        self.category_ids.len()
            + usize::from(self.show_expired_only)
            + usize::from(self.show_expiring_only)
    }

    /// Reset category and status filters, keeping the search text
    pub fn clear_filters(&mut self) {
        self.category_ids.clear();
        self.show_expired_only = false;
        self.show_expiring_only = false;
    }

    pub fn clear_search(&mut self) {
        self.search_text.clear();
    }

    pub fn is_default(&self) -> bool {
        self.search_text.is_empty() && self.active_filter_count() == 0
    }
}

/// Why the receipt list renders no rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyState {
    /// The collection itself is empty
    NoReceipts,
    /// Receipts exist but none match the current query
    NoMatches,
}

impl EmptyState {
    pub fn title(&self) -> &'static str {
        match self {
            EmptyState::NoReceipts => "No receipts yet",
            EmptyState::NoMatches => "No receipts found",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EmptyState::NoReceipts => {
                "Start building your receipt collection by adding your first receipt."
            }
            EmptyState::NoMatches => "Try adjusting your search or filter criteria.",
        }
    }
}

/// Filtered receipt list ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptListResponse {
    pub receipts: Vec<Receipt>,
    /// Size of the unfiltered collection
    pub total_count: usize,
    pub empty_state: Option<EmptyState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReceiptResponse {
    pub receipt: Receipt,
    pub success_message: String,
    /// Set when the receipt is visible in this session but could not be
    /// written to the preference store
    pub persistence_warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
}

/// Receipt counts per warranty status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarrantySummary {
    pub valid: usize,
    pub expiring_soon: usize,
    pub expired: usize,
}

impl WarrantySummary {
    pub fn record(&mut self, status: WarrantyStatus) {
        match status {
            WarrantyStatus::Valid => self.valid += 1,
            WarrantyStatus::ExpiringSoon => self.expiring_soon += 1,
            WarrantyStatus::Expired => self.expired += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.expiring_soon + self.expired
    }
}

/// Where a photo comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhotoSource {
    Camera,
    Photos,
}

/// Short message shown to the user as a toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotice {
    pub title: String,
    pub description: String,
    pub destructive: bool,
}

impl UserNotice {
    pub fn info(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            destructive: false,
        }
    }

    pub fn error(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            destructive: true,
        }
    }
}
