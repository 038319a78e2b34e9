use chrono::{NaiveDate, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::category_service::CategoryService;
use crate::domain::models::{AddReceiptError, ValidatedReceiptForm};
use crate::domain::receipt_filter::{empty_state, filter_receipts, summarize};
use crate::storage::{CollectionStore, FileStorage, KeyValueStorage, WriteMode, RECEIPTS_KEY};
use shared::{
    AddReceiptResponse, Receipt, ReceiptFormData, ReceiptListResponse, ReceiptQuery, WarrantySummary,
};

/// Service for managing the receipt collection
#[derive(Clone)]
pub struct ReceiptService {
    store: CollectionStore<Vec<Receipt>>,
    category_service: CategoryService,
    file_storage: Arc<dyn FileStorage>,
    /// Last stamp handed out by [`reserve_stamp`](Self::reserve_stamp)
    last_stamp: Arc<AtomicU64>,
}

impl ReceiptService {
    pub fn new(
        provider: Arc<dyn KeyValueStorage>,
        category_service: CategoryService,
        file_storage: Arc<dyn FileStorage>,
        write_mode: WriteMode,
    ) -> Self {
        let store = CollectionStore::new(RECEIPTS_KEY, Vec::new(), provider).with_write_mode(write_mode);
        Self {
            store,
            category_service,
            file_storage,
            last_stamp: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Load the receipt collection from the preference store
    pub async fn load(&self) -> Vec<Receipt> {
        let receipts = self.store.load().await;
        info!("Loaded {} receipts", receipts.len());
        receipts
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// All receipts, newest first
    pub fn list_receipts(&self) -> Vec<Receipt> {
        self.store.get()
    }

    pub fn get_receipt(&self, receipt_id: &str) -> Option<Receipt> {
        self.store
            .with_value(|receipts| receipts.iter().find(|r| r.id == receipt_id).cloned())
    }

    /// Receipts matching `query` as seen on `today`
    pub fn filtered_receipts(&self, query: &ReceiptQuery, today: NaiveDate) -> Vec<Receipt> {
        self.store
            .with_value(|receipts| filter_receipts(receipts, query, today))
    }

    /// Filtered list together with what to show when it is empty
    pub fn list_view(&self, query: &ReceiptQuery, today: NaiveDate) -> ReceiptListResponse {
        let (receipts, total_count) = self.store.with_value(|all| {
            (filter_receipts(all, query, today), all.len())
        });

        ReceiptListResponse {
            empty_state: empty_state(total_count, receipts.len()),
            receipts,
            total_count,
        }
    }

    pub fn summary(&self, today: NaiveDate) -> WarrantySummary {
        self.store.with_value(|receipts| summarize(receipts, today))
    }

    /// Create a receipt from the add form and put it at the top of the list.
    ///
    /// Validation, category lookup and photo storage happen before anything
    /// changes. With optimistic writes a failed save still returns the
    /// receipt, flagged with a persistence warning.
    pub async fn add_receipt(&self, form: ReceiptFormData) -> Result<AddReceiptResponse, AddReceiptError> {
        info!(
            "Adding receipt: name={}, category_id={}, warranty_date={}",
            form.name, form.category_id, form.warranty_date
        );

        let validated = ValidatedReceiptForm::validate(&form).map_err(|e| {
            warn!("Rejected receipt form: {}", e);
            e
        })?;

        let category = self
            .category_service
            .find_category(&validated.category_id)
            .ok_or_else(|| AddReceiptError::CategoryNotFound(validated.category_id.clone()))?;

        let now = Utc::now();
        let now_millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let stamp = self.reserve_stamp(now_millis);

        let photo_file = validated.photo.as_ref().map(|_| format!("receipt_{}.jpg", stamp));
        let photo_path = match (&photo_file, &validated.photo) {
            (Some(file_name), Some(data)) => self
                .file_storage
                .write_file(file_name, data)
                .await
                .map_err(AddReceiptError::PhotoStorage)?,
            _ => String::new(),
        };

        let timestamp = now.to_rfc3339();
        let receipt = Receipt {
            id: Receipt::generate_id(stamp),
            name: validated.name,
            category,
            warranty_date: validated.warranty_date.format("%Y-%m-%d").to_string(),
            photo_path,
            thumbnail_path: None,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        };

        let new_receipt = receipt.clone();
        let saved = self
            .store
            .update(move |receipts| {
                let mut next = Vec::with_capacity(receipts.len() + 1);
                next.push(new_receipt);
                next.extend(receipts.iter().cloned());
                next
            })
            .await;

        let persistence_warning = match saved {
            Ok(()) => None,
            Err(e) if self.store.write_mode() == WriteMode::Optimistic => {
                warn!("Receipt {} is only kept in memory: {}", receipt.id, e);
                Some(e.to_string())
            }
            Err(e) => {
                if let Some(file_name) = &photo_file {
                    self.discard_photo(file_name).await;
                }
                return Err(e.into());
            }
        };

        info!("Created receipt: {} with ID: {}", receipt.name, receipt.id);

        Ok(AddReceiptResponse {
            receipt,
            success_message: "Your receipt has been saved successfully.".to_string(),
            persistence_warning,
        })
    }

    /// Claim a stamp for a new receipt before anything is awaited.
    ///
    /// Stamps strictly increase across calls on this service and skip IDs
    /// already present in the collection.
    fn reserve_stamp(&self, now_millis: u64) -> u64 {
        let mut last = self.last_stamp.load(Ordering::SeqCst);
        loop {
            let candidate = self.store.with_value(|receipts| {
                Self::unique_stamp(receipts, now_millis.max(last.saturating_add(1)))
            });
            match self
                .last_stamp
                .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return candidate,
                Err(current) => last = current,
            }
        }
    }

    async fn discard_photo(&self, file_name: &str) {
        if let Err(e) = self.file_storage.delete_file(file_name).await {
            error!("Error removing photo {} of unsaved receipt: {}", file_name, e);
        }
    }

    /// First timestamp at or after `now_millis` not used by an existing receipt ID
    fn unique_stamp(receipts: &[Receipt], now_millis: u64) -> u64 {
        let mut stamp = now_millis;
        while receipts.iter().any(|r| r.id == Receipt::generate_id(stamp)) {
            stamp += 1;
        }
        stamp
    }
}
