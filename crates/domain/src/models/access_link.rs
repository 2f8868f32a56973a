//! Access link domain model: the quota-limited, optionally email-restricted
//! credential a guest redeems to enter a data room.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Link token prefix.
pub const TOKEN_PREFIX: &str = "drl_";

/// Length of random bytes for token generation (240 bits).
const TOKEN_RANDOM_BYTES: usize = 30;

lazy_static! {
    /// Shape of a well-formed link token: prefix plus 40 base64url characters.
    /// Lookups for anything else can be rejected without touching storage.
    static ref TOKEN_REGEX: Regex = Regex::new(r"^drl_[A-Za-z0-9_-]{40}$").expect("valid regex");
}

/// Access link domain model.
///
/// `usage_limit` is the remaining-uses counter: it counts down on each
/// redemption and a value of NULL or below 1 means no uses remain. It is
/// never mutated outside the conditional decrement in the redemption flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AccessLink {
    pub id: Uuid,
    pub room_id: Uuid,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derived link state for owner-facing listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Active,
    Revoked,
    Expired,
    Exhausted,
}

impl AccessLink {
    /// Check if the link can currently be redeemed.
    pub fn is_valid(&self) -> bool {
        !self.is_revoked() && !self.is_expired() && self.has_uses_remaining()
    }

    /// Check if the link is expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() > exp)
    }

    /// Check if the link is revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Check if at least one use remains. An absent counter means none do.
    pub fn has_uses_remaining(&self) -> bool {
        matches!(self.usage_limit, Some(n) if n >= 1)
    }

    /// Remaining uses, floored at zero.
    pub fn remaining_uses(&self) -> i32 {
        self.usage_limit.unwrap_or(0).max(0)
    }

    /// Whether redemption requires the guest to supply a matching email.
    pub fn email_required(&self) -> bool {
        self.email.is_some()
    }

    /// Check a supplied email against the allowlist.
    ///
    /// An open link (no allowlisted address) accepts any email. Comparison is
    /// trimmed and case-insensitive on both sides.
    pub fn email_matches(&self, supplied: &str) -> bool {
        match &self.email {
            None => true,
            Some(allowed) => {
                allowed.trim().to_lowercase() == supplied.trim().to_lowercase()
            }
        }
    }

    /// Derived status. Revocation wins over expiry, expiry over exhaustion.
    pub fn status(&self) -> LinkStatus {
        if self.is_revoked() {
            LinkStatus::Revoked
        } else if self.is_expired() {
            LinkStatus::Expired
        } else if !self.has_uses_remaining() {
            LinkStatus::Exhausted
        } else {
            LinkStatus::Active
        }
    }
}

/// Owner-facing representation of an access link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AccessLinkResponse {
    pub id: Uuid,
    pub room_id: Uuid,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<i32>,
    pub remaining_uses: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
    pub status: LinkStatus,
    pub created_at: DateTime<Utc>,
}

impl From<AccessLink> for AccessLinkResponse {
    fn from(link: AccessLink) -> Self {
        let status = link.status();
        let remaining_uses = link.remaining_uses();

        Self {
            id: link.id,
            room_id: link.room_id,
            token: link.token,
            email: link.email,
            usage_limit: link.usage_limit,
            remaining_uses,
            expires_at: link.expires_at,
            country: link.country,
            guest_first_name: link.guest_first_name,
            guest_last_name: link.guest_last_name,
            used_at: link.used_at,
            revoked_at: link.revoked_at,
            status,
            created_at: link.created_at,
        }
    }
}

/// Request to issue a new access link for a room.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateAccessLinkRequest {
    /// Allowlisted guest email; omit for an open link.
    #[validate(email(message = "Invalid email format"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Number of redemptions the link starts with.
    #[validate(range(min = 1, max = 10000, message = "usage_limit must be between 1 and 10000"))]
    pub usage_limit: i32,
    #[validate(range(
        min = 1,
        max = 8760,
        message = "expires_in_hours must be between 1 and 8760"
    ))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_hours: Option<i32>,
    #[validate(custom(function = "shared::validation::validate_country_code"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[validate(length(max = 100, message = "guest_first_name must be at most 100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_first_name: Option<String>,
    #[validate(length(max = 100, message = "guest_last_name must be at most 100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_last_name: Option<String>,
}

/// Response for link creation: the link plus the share URL to hand out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateAccessLinkResponse {
    pub link: AccessLinkResponse,
    pub share_url: String,
}

/// Query parameters for listing a room's access links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListAccessLinksQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub include_revoked: Option<bool>,
}

/// Response for listing access links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListAccessLinksResponse {
    pub data: Vec<AccessLinkResponse>,
    pub pagination: AccessLinkPagination,
}

/// Pagination metadata for access link listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AccessLinkPagination {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Public payload returned when a guest resolves a token.
///
/// Deliberately excludes the allowlisted address itself: the guest only
/// learns whether an email is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResolveLinkResponse {
    pub room_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_last_name: Option<String>,
    pub email_required: bool,
    pub remaining_uses: i32,
}

/// Request body for redeeming a resolved link.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RedeemRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Response for a granted redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RedeemResponse {
    pub guest_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub room_id: Uuid,
    pub legal_notice: String,
}

/// Generate a new link token.
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..TOKEN_RANDOM_BYTES).map(|_| rng.gen()).collect();
    let encoded = URL_SAFE_NO_PAD.encode(&random_bytes);
    format!("{}{}", TOKEN_PREFIX, encoded)
}

/// Check whether a path segment has the shape of a link token.
pub fn is_token_format(candidate: &str) -> bool {
    TOKEN_REGEX.is_match(candidate)
}

/// Calculate an expiry timestamp from an hour offset.
pub fn calculate_expiry(hours: i32) -> DateTime<Utc> {
    Utc::now() + Duration::hours(hours as i64)
}

/// Build the guest-facing share URL for a token.
pub fn share_url(base_url: &str, token: &str) -> String {
    format!("{}/access/{}", base_url.trim_end_matches('/'), token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_link() -> AccessLink {
        AccessLink {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            token: generate_token(),
            email: None,
            usage_limit: Some(2),
            expires_at: None,
            country: None,
            guest_first_name: None,
            guest_last_name: None,
            used_at: None,
            revoked_at: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert!(token.starts_with(TOKEN_PREFIX));
        assert_eq!(token.len(), 44); // "drl_" + 40 base64url chars
        assert!(is_token_format(&token));
    }

    #[test]
    fn test_generate_token_uniqueness() {
        let token1 = generate_token();
        let token2 = generate_token();
        assert_ne!(token1, token2);
    }

    #[test]
    fn test_is_token_format_rejects_junk() {
        assert!(!is_token_format(""));
        assert!(!is_token_format("abc123"));
        assert!(!is_token_format("drl_tooshort"));
        assert!(!is_token_format("enroll_AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"));
        // Right length, illegal character
        assert!(!is_token_format("drl_AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA!"));
    }

    #[test]
    fn test_calculate_expiry() {
        let expiry = calculate_expiry(24);
        let now = Utc::now();
        assert!(expiry > now);
        assert!(expiry < now + Duration::hours(25));
    }

    #[test]
    fn test_share_url() {
        assert_eq!(
            share_url("https://rooms.example.com", "drl_abc"),
            "https://rooms.example.com/access/drl_abc"
        );
        assert_eq!(
            share_url("https://rooms.example.com/", "drl_abc"),
            "https://rooms.example.com/access/drl_abc"
        );
    }

    #[test]
    fn test_link_is_valid() {
        let link = test_link();
        assert!(link.is_valid());
        assert_eq!(link.status(), LinkStatus::Active);
    }

    #[test]
    fn test_link_expired() {
        let mut link = test_link();
        link.expires_at = Some(Utc::now() - Duration::days(1));
        assert!(!link.is_valid());
        assert!(link.is_expired());
        assert_eq!(link.status(), LinkStatus::Expired);
    }

    #[test]
    fn test_link_revoked() {
        let mut link = test_link();
        link.revoked_at = Some(Utc::now());
        assert!(!link.is_valid());
        assert!(link.is_revoked());
        assert_eq!(link.status(), LinkStatus::Revoked);
    }

    #[test]
    fn test_link_exhausted_at_zero() {
        let mut link = test_link();
        link.usage_limit = Some(0);
        assert!(!link.is_valid());
        assert!(!link.has_uses_remaining());
        assert_eq!(link.status(), LinkStatus::Exhausted);
    }

    #[test]
    fn test_link_missing_limit_counts_as_exhausted() {
        let mut link = test_link();
        link.usage_limit = None;
        assert!(!link.is_valid());
        assert!(!link.has_uses_remaining());
        assert_eq!(link.remaining_uses(), 0);
        assert_eq!(link.status(), LinkStatus::Exhausted);
    }

    #[test]
    fn test_link_negative_limit_floors_remaining() {
        let mut link = test_link();
        link.usage_limit = Some(-3);
        assert!(!link.has_uses_remaining());
        assert_eq!(link.remaining_uses(), 0);
    }

    #[test]
    fn test_revoked_wins_over_exhausted() {
        let mut link = test_link();
        link.usage_limit = Some(0);
        link.revoked_at = Some(Utc::now());
        assert_eq!(link.status(), LinkStatus::Revoked);
    }

    #[test]
    fn test_email_matches_case_insensitive() {
        let mut link = test_link();
        link.email = Some("Guest@Example.com".to_string());

        assert!(link.email_matches("guest@example.com"));
        assert!(link.email_matches("GUEST@EXAMPLE.COM"));
        assert!(link.email_matches("  guest@example.com  "));
        assert!(!link.email_matches("other@example.com"));
    }

    #[test]
    fn test_email_matches_trims_stored_address() {
        let mut link = test_link();
        link.email = Some(" guest@example.com ".to_string());
        assert!(link.email_matches("guest@example.com"));
    }

    #[test]
    fn test_open_link_accepts_any_email() {
        let link = test_link();
        assert!(!link.email_required());
        assert!(link.email_matches("anyone@example.com"));
        assert!(link.email_matches("someone.else@example.org"));
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateAccessLinkRequest {
            email: Some("guest@example.com".to_string()),
            usage_limit: 5,
            expires_in_hours: Some(72),
            country: Some("DE".to_string()),
            guest_first_name: Some("Ada".to_string()),
            guest_last_name: Some("Lovelace".to_string()),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_zero_usage_limit() {
        let request = CreateAccessLinkRequest {
            email: None,
            usage_limit: 0,
            expires_in_hours: None,
            country: None,
            guest_first_name: None,
            guest_last_name: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_invalid_expiry() {
        let request = CreateAccessLinkRequest {
            email: None,
            usage_limit: 1,
            expires_in_hours: Some(9000),
            country: None,
            guest_first_name: None,
            guest_last_name: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_invalid_country() {
        let request = CreateAccessLinkRequest {
            email: None,
            usage_limit: 1,
            expires_in_hours: None,
            country: Some("germany".to_string()),
            guest_first_name: None,
            guest_last_name: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_redeem_request_validation() {
        let ok = RedeemRequest {
            email: "a@b.com".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = RedeemRequest {
            email: "not-an-email".to_string(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_link_status_serialization() {
        assert_eq!(
            serde_json::to_string(&LinkStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&LinkStatus::Exhausted).unwrap(),
            "\"exhausted\""
        );
    }
}
