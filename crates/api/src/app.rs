use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, security_headers_middleware,
    trace_id, RateLimiterState,
};
use crate::routes::{access, auth, events, files, guest, health, links, rooms};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    // Rate limiting is enabled when the configured limit is non-zero
    let rate_limiter = if config.security.guest_rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.guest_rate_limit_per_minute,
        )))
    } else {
        None
    };

    let state = AppState {
        pool,
        config: config.clone(),
        rate_limiter,
    };

    // Build CORS layer based on configuration
    let cors = if config.server.cors_allowed_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .server
            .cors_allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Guest-facing routes. Unauthenticated or guest-token traffic, throttled
    // per client IP.
    let guest_routes = Router::new()
        .route("/api/v1/access/:token", get(access::resolve_link))
        .route("/api/v1/access/:token/redeem", post(access::redeem_link))
        .route("/api/v1/guest/room", get(guest::view_room))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Account routes (no session required)
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout));

    // Owner routes. Authentication happens in the UserAuth extractor.
    let owner_routes = Router::new()
        .route("/api/v1/rooms", post(rooms::create_room))
        .route("/api/v1/rooms", get(rooms::list_rooms))
        .route("/api/v1/rooms/:room_id", get(rooms::get_room))
        .route("/api/v1/rooms/:room_id", patch(rooms::update_room))
        .route("/api/v1/rooms/:room_id", delete(rooms::delete_room))
        .route("/api/v1/rooms/:room_id/files", post(files::register_file))
        .route("/api/v1/rooms/:room_id/files", get(files::list_files))
        .route("/api/v1/files/:file_id", delete(files::delete_file))
        .route("/api/v1/rooms/:room_id/links", post(links::create_link))
        .route("/api/v1/rooms/:room_id/links", get(links::list_links))
        .route("/api/v1/links/:link_id", get(links::get_link))
        .route("/api/v1/links/:link_id/revoke", post(links::revoke_link))
        .route("/api/v1/rooms/:room_id/events", get(events::list_events));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(guest_routes)
        .merge(auth_routes)
        .merge(owner_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware)) // Security headers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
