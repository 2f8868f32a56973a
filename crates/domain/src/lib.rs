//! Domain layer for the data room backend.
//!
//! This crate contains:
//! - Domain models (DataRoom, RoomFile, AccessLink, AccessEvent)
//! - Access link token generation and validity rules
//! - Request/response DTOs with validation

pub mod models;
