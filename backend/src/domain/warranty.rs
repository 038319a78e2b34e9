//! Warranty status classification.
//!
//! All arithmetic happens on calendar dates, never on timestamps, so a
//! warranty that ends today is "expiring soon" for the whole day regardless
//! of the time of the check.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use shared::{Receipt, WarrantyClassification, WarrantyStatus};

/// Days before the warranty date during which a receipt counts as expiring soon
pub const EXPIRING_SOON_WINDOW_DAYS: i64 = 30;

/// Current local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Status for a given number of whole days remaining
pub fn status_for_days(days_remaining: i64) -> WarrantyStatus {
    if days_remaining < 0 {
        WarrantyStatus::Expired
    } else if days_remaining <= EXPIRING_SOON_WINDOW_DAYS {
        WarrantyStatus::ExpiringSoon
    } else {
        WarrantyStatus::Valid
    }
}

/// Classify a warranty ending on `warranty_date` as seen on `reference_date`
pub fn classify_warranty(warranty_date: NaiveDate, reference_date: NaiveDate) -> WarrantyClassification {
    let days_remaining = (warranty_date - reference_date).num_days();
    WarrantyClassification {
        status: status_for_days(days_remaining),
        days_remaining: Some(days_remaining),
    }
}

/// Parse a stored warranty date.
///
/// Accepts `YYYY-MM-DD` and, for records written by older clients, full
/// timestamps (RFC 3339 or naive ISO 8601) of which only the date is kept.
pub fn parse_warranty_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|datetime| datetime.date())
}

/// Classify a stored receipt. An unreadable warranty date counts as expired.
pub fn classify_receipt(receipt: &Receipt, today: NaiveDate) -> WarrantyClassification {
    match parse_warranty_date(&receipt.warranty_date) {
        Some(warranty_date) => classify_warranty(warranty_date, today),
        None => {
            tracing::debug!(
                "Receipt {} has unreadable warranty date '{}', treating as expired",
                receipt.id,
                receipt.warranty_date
            );
            WarrantyClassification {
                status: WarrantyStatus::Expired,
                days_remaining: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shared::default_categories;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn receipt_with_date(warranty_date: &str) -> Receipt {
        Receipt {
            id: Receipt::generate_id(1),
            name: "Toaster".to_string(),
            category: default_categories()[1].clone(),
            warranty_date: warranty_date.to_string(),
            photo_path: String::new(),
            thumbnail_path: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_same_day_is_expiring_soon() {
        for reference in [date(2024, 2, 29), date(2025, 1, 1), date(2025, 12, 31)] {
            let result = classify_warranty(reference, reference);
            assert_eq!(result.days_remaining, Some(0));
            assert_eq!(result.status, WarrantyStatus::ExpiringSoon);
        }
    }

    #[test]
    fn test_window_boundaries() {
        let today = date(2025, 6, 15);

        let at_30 = classify_warranty(today + Duration::days(30), today);
        assert_eq!(at_30.status, WarrantyStatus::ExpiringSoon);
        assert_eq!(at_30.days_remaining, Some(30));

        let at_31 = classify_warranty(today + Duration::days(31), today);
        assert_eq!(at_31.status, WarrantyStatus::Valid);

        let yesterday = classify_warranty(today - Duration::days(1), today);
        assert_eq!(yesterday.status, WarrantyStatus::Expired);
        assert_eq!(yesterday.days_remaining, Some(-1));
    }

    #[test]
    fn test_window_across_month_and_year_ends() {
        assert_eq!(
            classify_warranty(date(2026, 1, 30), date(2025, 12, 31)).days_remaining,
            Some(30)
        );
        assert_eq!(
            classify_warranty(date(2024, 3, 1), date(2024, 2, 28)).days_remaining,
            Some(2)
        );
    }

    #[test]
    fn test_status_for_days() {
        assert_eq!(status_for_days(-365), WarrantyStatus::Expired);
        assert_eq!(status_for_days(0), WarrantyStatus::ExpiringSoon);
        assert_eq!(status_for_days(EXPIRING_SOON_WINDOW_DAYS), WarrantyStatus::ExpiringSoon);
        assert_eq!(status_for_days(EXPIRING_SOON_WINDOW_DAYS + 1), WarrantyStatus::Valid);
    }

    #[test]
    fn test_parse_warranty_date_formats() {
        assert_eq!(parse_warranty_date("2025-06-15"), Some(date(2025, 6, 15)));
        assert_eq!(parse_warranty_date(" 2025-06-15 "), Some(date(2025, 6, 15)));
        assert_eq!(parse_warranty_date("2025-06-15T23:30:00+02:00"), Some(date(2025, 6, 15)));
        assert_eq!(parse_warranty_date("2025-06-15T08:00:00.000Z"), Some(date(2025, 6, 15)));
        assert_eq!(parse_warranty_date("2025-06-15T08:00:00"), Some(date(2025, 6, 15)));

        assert_eq!(parse_warranty_date(""), None);
        assert_eq!(parse_warranty_date("next tuesday"), None);
        assert_eq!(parse_warranty_date("2025-02-30"), None);
    }

    #[test]
    fn test_time_of_day_does_not_flip_status() {
        let today = date(2025, 6, 15);
        let receipt = receipt_with_date("2025-06-15T00:00:01Z");

        let result = classify_receipt(&receipt, today);
        assert_eq!(result.days_remaining, Some(0));
        assert_eq!(result.status, WarrantyStatus::ExpiringSoon);
    }

    #[test]
    fn test_malformed_receipt_date_is_expired() {
        let result = classify_receipt(&receipt_with_date("not-a-date"), date(2025, 6, 15));
        assert_eq!(result.status, WarrantyStatus::Expired);
        assert_eq!(result.days_remaining, None);
    }
}
