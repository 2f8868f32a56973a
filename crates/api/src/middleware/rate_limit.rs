//! Rate limiting middleware.
//!
//! Provides per-client-IP rate limiting for the public guest endpoints.
//! Resolve and redeem take unauthenticated traffic keyed only by a token,
//! so the client address is the only stable identity to throttle on.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use serde_json::json;
use std::{
    collections::HashMap,
    net::IpAddr,
    num::NonZeroU32,
    sync::{Arc, RwLock},
};

use crate::app::AppState;
use crate::extractors::client_info::client_ip;

/// Type alias for the rate limiter used per client IP.
type IpRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter state shared across all requests.
/// Uses a HashMap keyed by client IP with individual rate limiters.
pub struct RateLimiterState {
    limiters: RwLock<HashMap<IpAddr, Arc<IpRateLimiter>>>,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Create a new rate limiter state with the specified limit per minute.
    pub fn new(rate_limit_per_minute: u32) -> Self {
        Self {
            limiters: RwLock::new(HashMap::new()),
            rate_limit_per_minute,
        }
    }

    /// Get or create a rate limiter for the given client IP.
    fn get_or_create_limiter(&self, ip: IpAddr) -> Arc<IpRateLimiter> {
        // First try to get existing limiter with read lock
        {
            let limiters = self.limiters.read().unwrap();
            if let Some(limiter) = limiters.get(&ip) {
                return limiter.clone();
            }
        }

        // Create new limiter with write lock
        let mut limiters = self.limiters.write().unwrap();

        // Double-check in case another thread created it
        if let Some(limiter) = limiters.get(&ip) {
            return limiter.clone();
        }

        let quota = Quota::per_minute(
            NonZeroU32::new(self.rate_limit_per_minute).unwrap_or(NonZeroU32::new(60).unwrap()),
        );
        let limiter = Arc::new(GovRateLimiter::direct(quota));
        limiters.insert(ip, limiter.clone());
        limiter
    }

    /// Check if a request from the given client IP should be allowed.
    /// Returns Ok(()) if allowed, or Err with retry_after seconds if rate limited.
    pub fn check(&self, ip: IpAddr) -> Result<(), u64> {
        let limiter = self.get_or_create_limiter(ip);

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(governor::clock::Clock::now(
                    &governor::clock::DefaultClock::default(),
                ));
                // Retry after in seconds, minimum 1 second
                Err(wait_time.as_secs().max(1))
            }
        }
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("active_limiters", &self.limiters.read().unwrap().len())
            .finish()
    }
}

/// Middleware that applies rate limiting per client IP.
///
/// Applied as a route layer on the guest endpoints only; owner routes are
/// already gated by authentication. Requests whose client address cannot be
/// determined are passed through unthrottled.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = match client_ip(req.headers(), req.extensions()) {
        Some(ip) => ip,
        None => return next.run(req).await,
    };

    if let Some(ref rate_limiter) = state.rate_limiter {
        if let Err(retry_after) = rate_limiter.check(ip) {
            tracing::warn!(client_ip = %ip, retry_after, "Guest rate limit exceeded");
            return rate_limited_response(
                state.config.security.guest_rate_limit_per_minute,
                retry_after,
            );
        }
    }

    next.run(req).await
}

/// Create a rate limited response with proper headers and body.
fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "error": "rate_limited",
        "message": format!("Rate limit of {} requests/minute exceeded", limit),
        "retry_after": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

    response.headers_mut().insert(
        header::RETRY_AFTER,
        retry_after.to_string().parse().unwrap(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn ipv4(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(198, 51, 100, last))
    }

    // ===========================================
    // RateLimiterState Creation Tests
    // ===========================================

    #[test]
    fn test_rate_limiter_state_creation() {
        let state = RateLimiterState::new(60);
        assert_eq!(state.rate_limit_per_minute, 60);
    }

    #[test]
    fn test_rate_limiter_state_creation_with_various_limits() {
        let limits = vec![1, 10, 60, 1000, 10000];
        for limit in limits {
            let state = RateLimiterState::new(limit);
            assert_eq!(state.rate_limit_per_minute, limit);
        }
    }

    // ===========================================
    // Rate Limiting Logic Tests
    // ===========================================

    #[test]
    fn test_rate_limiter_allows_requests() {
        let state = RateLimiterState::new(60);
        assert!(state.check(ipv4(1)).is_ok());
    }

    #[test]
    fn test_rate_limiter_exhaustion() {
        // Very low limit to test exhaustion
        let state = RateLimiterState::new(1);
        let ip = ipv4(2);

        assert!(state.check(ip).is_ok());

        let result = state.check(ip);
        assert!(result.is_err());
        // Retry-after should be at least 1 second
        assert!(result.unwrap_err() >= 1);
    }

    #[test]
    fn test_rate_limiter_different_ips_independent() {
        let state = RateLimiterState::new(1);
        let ip1 = ipv4(1);
        let ip2 = ipv4(2);
        let ip3 = ipv4(3);

        // Each address should have an independent limit
        assert!(state.check(ip1).is_ok());
        assert!(state.check(ip2).is_ok());
        assert!(state.check(ip3).is_ok());

        assert!(state.check(ip1).is_err());
        assert!(state.check(ip2).is_err());
        assert!(state.check(ip3).is_err());
    }

    #[test]
    fn test_rate_limiter_same_ip_multiple_checks() {
        let state = RateLimiterState::new(5);
        let ip = ipv4(42);

        for i in 0..5 {
            let result = state.check(ip);
            assert!(result.is_ok(), "Request {} should be allowed", i);
        }

        // 6th request should be rate limited
        assert!(state.check(ip).is_err());
    }

    #[test]
    fn test_rate_limiter_ipv6_addresses() {
        let state = RateLimiterState::new(1);
        let v6 = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1));

        assert!(state.check(v6).is_ok());
        assert!(state.check(v6).is_err());

        // A v4 address is a different key
        assert!(state.check(ipv4(1)).is_ok());
    }

    #[test]
    fn test_rate_limiter_many_ips() {
        let state = RateLimiterState::new(10);

        for last in 0..=255u8 {
            assert!(state.check(ipv4(last)).is_ok());
        }
    }

    // ===========================================
    // Debug Tests
    // ===========================================

    #[test]
    fn test_rate_limiter_state_debug() {
        let state = RateLimiterState::new(60);
        state.check(ipv4(1)).unwrap();

        let debug = format!("{:?}", state);
        assert!(debug.contains("RateLimiterState"));
        assert!(debug.contains("rate_limit_per_minute"));
        assert!(debug.contains("60"));
        assert!(debug.contains("active_limiters"));
    }

    // ===========================================
    // Response Building Tests
    // ===========================================

    #[test]
    fn test_rate_limited_response_format() {
        let response = rate_limited_response(60, 30);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "30");
    }

    #[test]
    fn test_rate_limited_response_various_retry_after() {
        let retry_values = vec![1, 5, 30, 60, 120, 3600];
        for retry_after in retry_values {
            let response = rate_limited_response(60, retry_after);
            assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
            assert_eq!(
                response.headers().get(header::RETRY_AFTER).unwrap(),
                &retry_after.to_string()
            );
        }
    }

    // ===========================================
    // Concurrent Access Tests
    // ===========================================

    #[test]
    fn test_rate_limiter_get_or_create_idempotent() {
        let state = RateLimiterState::new(60);
        let ip = ipv4(1);

        let limiter1 = state.get_or_create_limiter(ip);
        let limiter2 = state.get_or_create_limiter(ip);

        // Should be the same Arc (same underlying object)
        assert!(Arc::ptr_eq(&limiter1, &limiter2));
    }

    #[test]
    fn test_rate_limiter_different_ips_different_limiters() {
        let state = RateLimiterState::new(60);

        let limiter1 = state.get_or_create_limiter(ipv4(1));
        let limiter2 = state.get_or_create_limiter(ipv4(2));

        assert!(!Arc::ptr_eq(&limiter1, &limiter2));
    }
}
