//! Receipt list filtering.
//!
//! Pure functions over a receipt slice and a [`ReceiptQuery`]. Every
//! predicate of the query is applied independently and a receipt has to
//! pass all of them. In particular "expired only" together with "expiring
//! only" yields nothing, since the two statuses never overlap.

use chrono::NaiveDate;
use shared::{EmptyState, Receipt, ReceiptQuery, WarrantyStatus, WarrantySummary};

use super::warranty::classify_receipt;

/// Receipts matching `query`, in input order
pub fn filter_receipts(receipts: &[Receipt], query: &ReceiptQuery, today: NaiveDate) -> Vec<Receipt> {
    let needle = query.search_text.to_lowercase();

    receipts
        .iter()
        .filter(|receipt| matches_query(receipt, query, &needle, today))
        .cloned()
        .collect()
}

/// `needle` is the lowercased search text of `query`
fn matches_query(receipt: &Receipt, query: &ReceiptQuery, needle: &str, today: NaiveDate) -> bool {
    if !needle.is_empty() && !receipt.name.to_lowercase().contains(needle) {
        return false;
    }

    if !query.category_ids.is_empty() && !query.category_ids.contains(&receipt.category.id) {
        return false;
    }

    if query.show_expired_only || query.show_expiring_only {
        let status = classify_receipt(receipt, today).status;
        if query.show_expired_only && status != WarrantyStatus::Expired {
            return false;
        }
        if query.show_expiring_only && status != WarrantyStatus::ExpiringSoon {
            return false;
        }
    }

    true
}

/// Receipt counts per warranty status
pub fn summarize(receipts: &[Receipt], today: NaiveDate) -> WarrantySummary {
    receipts.iter().fold(WarrantySummary::default(), |mut summary, receipt| {
        summary.record(classify_receipt(receipt, today).status);
        summary
    })
}

/// Which empty-list message to show, if any
pub fn empty_state(total_count: usize, visible_count: usize) -> Option<EmptyState> {
    match (total_count, visible_count) {
        (0, _) => Some(EmptyState::NoReceipts),
        (_, 0) => Some(EmptyState::NoMatches),
        _ => None,
    }
}
