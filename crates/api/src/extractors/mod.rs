//! Request extractors.

pub mod client_info;
pub mod guest_auth;
pub mod user_auth;

pub use client_info::ClientInfo;
pub use guest_auth::GuestAccess;
pub use user_auth::UserAuth;
