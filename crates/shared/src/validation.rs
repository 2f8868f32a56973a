//! Common validation utilities.

use chrono::{DateTime, Utc};
use validator::ValidationError;

/// Validates that a timestamp lies in the future.
///
/// Used for link expiries and room validity dates; a cutoff in the past would
/// create a link that can never be redeemed.
pub fn validate_future_timestamp(ts: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *ts > Utc::now() {
        Ok(())
    } else {
        let mut err = ValidationError::new("timestamp_not_future");
        err.message = Some("Timestamp must be in the future".into());
        Err(err)
    }
}

/// Validates an ISO 3166-1 alpha-2 country code (two uppercase ASCII letters).
pub fn validate_country_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("country_code");
        err.message = Some("Country must be a two-letter uppercase ISO code".into());
        Err(err)
    }
}

/// Validates an object-storage key: non-empty, no traversal segments, and no
/// leading slash.
pub fn validate_storage_key(key: &str) -> Result<(), ValidationError> {
    let valid = !key.is_empty()
        && !key.starts_with('/')
        && !key.split('/').any(|segment| segment == ".." || segment.is_empty());

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("storage_key");
        err.message = Some("Storage key must be a relative path without empty or '..' segments".into());
        Err(err)
    }
}
