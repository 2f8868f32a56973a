//! Access event repository for database operations.

use domain::models::access_event::{AccessEvent, ListAccessEventsQuery, NewAccessEvent};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::access_event::AccessEventEntity;

/// Repository for the append-only access audit trail.
#[derive(Clone)]
pub struct AccessEventRepository {
    pool: PgPool,
}

impl AccessEventRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an access event. When the input carries no timestamp the
    /// database stamps the row.
    pub async fn insert(&self, event: NewAccessEvent) -> Result<AccessEvent, sqlx::Error> {
        let entity = sqlx::query_as::<_, AccessEventEntity>(
            r#"
            INSERT INTO access_events (id, link_id, room_id, outcome, reason, email, ip_address, user_agent, occurred_at)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, COALESCE($8, NOW()))
            RETURNING id, link_id, room_id, outcome, reason, email, ip_address, user_agent, occurred_at
            "#,
        )
        .bind(event.link_id)
        .bind(event.room_id)
        .bind(event.outcome.as_str())
        .bind(event.reason.map(|r| r.as_str()))
        .bind(&event.email)
        .bind(event.ip_address.map(|ip| ip.to_string()))
        .bind(&event.user_agent)
        .bind(event.occurred_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Append an access event asynchronously (fire and forget).
    /// Uses tokio::spawn to avoid blocking the request.
    pub fn insert_async(&self, event: NewAccessEvent) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            let repo = AccessEventRepository::new(pool);
            if let Err(e) = repo.insert(event).await {
                tracing::error!("Failed to record access event: {}", e);
            }
        });
    }

    /// List a room's events with pagination and filtering, newest first.
    pub async fn list_by_room(
        &self,
        room_id: Uuid,
        query: &ListAccessEventsQuery,
    ) -> Result<(Vec<AccessEvent>, i64), sqlx::Error> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
        let offset = ((page - 1) * per_page) as i64;

        let mut conditions = vec!["room_id = $1".to_string()];
        let mut param_count = 1;

        if query.link_id.is_some() {
            param_count += 1;
            conditions.push(format!("link_id = ${}", param_count));
        }

        if query.outcome.is_some() {
            param_count += 1;
            conditions.push(format!("outcome = ${}", param_count));
        }

        let where_clause = conditions.join(" AND ");

        let count_query = format!("SELECT COUNT(*) FROM access_events WHERE {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query).bind(room_id);
        if let Some(link_id) = query.link_id {
            count_builder = count_builder.bind(link_id);
        }
        if let Some(outcome) = query.outcome {
            count_builder = count_builder.bind(outcome.as_str());
        }
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            r#"
            SELECT id, link_id, room_id, outcome, reason, email, ip_address, user_agent, occurred_at
            FROM access_events
            WHERE {}
            ORDER BY occurred_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            where_clause,
            param_count + 1,
            param_count + 2
        );

        let mut list_builder = sqlx::query_as::<_, AccessEventEntity>(&list_query).bind(room_id);
        if let Some(link_id) = query.link_id {
            list_builder = list_builder.bind(link_id);
        }
        if let Some(outcome) = query.outcome {
            list_builder = list_builder.bind(outcome.as_str());
        }
        let entities = list_builder
            .bind(per_page as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((entities.into_iter().map(Into::into).collect(), total))
    }
}
