//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record connection pool gauges. Called periodically by the pool metrics job.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times a database operation and records it as a histogram sample.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new("find_link_by_token");
/// let result = sqlx::query_as::<_, AccessLinkEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: String,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to the query histogram.
    pub fn record(self) {
        histogram!(
            "database_query_duration_seconds",
            "query" => self.query_name
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_tracks_name() {
        let timer = QueryTimer::new("consume_link_use");
        assert_eq!(timer.query_name, "consume_link_use");
    }

    #[test]
    fn test_query_timer_from_string() {
        let name = String::from("list_room_links");
        let timer = QueryTimer::new(name);
        assert_eq!(timer.query_name, "list_room_links");
    }
}
