//! Access audit trail domain models.
//!
//! Every redemption attempt against an access link leaves an append-only
//! event row. Granted events carry the exact `used_at` timestamp written by
//! the quota decrement; denied events record why the attempt was turned away.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use uuid::Uuid;

/// Outcome of a redemption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
    /// The guest was admitted and a use was consumed.
    Granted,
    /// The attempt was rejected without consuming a use.
    Denied,
}

impl AccessOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessOutcome::Granted => "granted",
            AccessOutcome::Denied => "denied",
        }
    }
}

impl FromStr for AccessOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "granted" => Ok(AccessOutcome::Granted),
            "denied" => Ok(AccessOutcome::Denied),
            _ => Err(format!("Unknown access outcome: {}", s)),
        }
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reason code recorded alongside a denied event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The link had no remaining uses at redemption time.
    QuotaExhausted,
    /// The supplied email did not match the link's allowlisted address.
    EmailNotAuthorized,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::QuotaExhausted => "quota_exhausted",
            DenialReason::EmailNotAuthorized => "email_not_authorized",
        }
    }
}

impl FromStr for DenialReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quota_exhausted" => Ok(DenialReason::QuotaExhausted),
            "email_not_authorized" => Ok(DenialReason::EmailNotAuthorized),
            _ => Err(format!("Unknown denial reason: {}", s)),
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One append-only audit record for an access link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AccessEvent {
    pub id: Uuid,
    pub link_id: Uuid,
    pub room_id: Uuid,
    pub outcome: AccessOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Input for appending a new access event.
///
/// `occurred_at` is `None` for denied events (the database stamps them) and
/// carries the decrement's `used_at` for granted events so the audit row and
/// the link agree on when the use was consumed.
#[derive(Debug, Clone)]
pub struct NewAccessEvent {
    pub link_id: Uuid,
    pub room_id: Uuid,
    pub outcome: AccessOutcome,
    pub reason: Option<DenialReason>,
    pub email: Option<String>,
    pub ip_address: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewAccessEvent {
    /// Build a granted event stamped with the decrement's `used_at`.
    pub fn granted(link_id: Uuid, room_id: Uuid, used_at: DateTime<Utc>) -> Self {
        Self {
            link_id,
            room_id,
            outcome: AccessOutcome::Granted,
            reason: None,
            email: None,
            ip_address: None,
            user_agent: None,
            occurred_at: Some(used_at),
        }
    }

    /// Build a denied event with its reason code.
    pub fn denied(link_id: Uuid, room_id: Uuid, reason: DenialReason) -> Self {
        Self {
            link_id,
            room_id,
            outcome: AccessOutcome::Denied,
            reason: Some(reason),
            email: None,
            ip_address: None,
            user_agent: None,
            occurred_at: None,
        }
    }

    /// Attach the email the guest supplied.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach request context captured by the handler.
    pub fn with_request_context(mut self, ip_address: Option<IpAddr>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}

/// Query parameters for listing a room's access events.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ListAccessEventsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub link_id: Option<Uuid>,
    pub outcome: Option<AccessOutcome>,
}

/// Pagination info for the event listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AccessEventPagination {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Response for the event listing, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListAccessEventsResponse {
    pub data: Vec<AccessEvent>,
    pub pagination: AccessEventPagination,
}
