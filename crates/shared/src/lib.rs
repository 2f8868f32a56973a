//! Shared utilities and common types for the Dataroom backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (hashing, log-safe token prefixes)
//! - Password hashing with Argon2id
//! - JWT generation and validation
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
