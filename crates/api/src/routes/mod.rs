//! HTTP route handlers.

pub mod access;
pub mod auth;
pub mod events;
pub mod files;
pub mod guest;
pub mod health;
pub mod links;
pub mod rooms;
