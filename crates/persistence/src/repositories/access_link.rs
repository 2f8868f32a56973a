//! Access link repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::access_link::{AccessLink, ListAccessLinksQuery};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::access_link::AccessLinkEntity;
use crate::metrics::QueryTimer;

/// Repository for access link database operations.
#[derive(Clone)]
pub struct AccessLinkRepository {
    pool: PgPool,
}

impl AccessLinkRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Issue a new access link for a room.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        room_id: Uuid,
        token: &str,
        email: Option<&str>,
        usage_limit: i32,
        expires_at: Option<DateTime<Utc>>,
        country: Option<&str>,
        guest_first_name: Option<&str>,
        guest_last_name: Option<&str>,
        created_by: Uuid,
    ) -> Result<AccessLink, sqlx::Error> {
        let entity = sqlx::query_as::<_, AccessLinkEntity>(
            r#"
            INSERT INTO access_links (id, room_id, token, email, usage_limit, expires_at, country, guest_first_name, guest_last_name, created_by)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, room_id, token, email, usage_limit, expires_at, country, guest_first_name, guest_last_name, used_at, revoked_at, created_by, created_at, updated_at
            "#,
        )
        .bind(room_id)
        .bind(token)
        .bind(email)
        .bind(usage_limit)
        .bind(expires_at)
        .bind(country)
        .bind(guest_first_name)
        .bind(guest_last_name)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a link by its token string. Validity checks (revocation, expiry,
    /// quota) are the caller's concern so that outcomes can be told apart.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<AccessLink>, sqlx::Error> {
        let timer = QueryTimer::new("find_link_by_token");

        let result = sqlx::query_as::<_, AccessLinkEntity>(
            r#"
            SELECT id, room_id, token, email, usage_limit, expires_at, country, guest_first_name, guest_last_name, used_at, revoked_at, created_by, created_at, updated_at
            FROM access_links
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Find a link by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AccessLink>, sqlx::Error> {
        let entity = sqlx::query_as::<_, AccessLinkEntity>(
            r#"
            SELECT id, room_id, token, email, usage_limit, expires_at, country, guest_first_name, guest_last_name, used_at, revoked_at, created_by, created_at, updated_at
            FROM access_links
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Find a link by ID, scoped to the owner of its room.
    pub async fn find_by_id_for_owner(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<AccessLink>, sqlx::Error> {
        let entity = sqlx::query_as::<_, AccessLinkEntity>(
            r#"
            SELECT l.id, l.room_id, l.token, l.email, l.usage_limit, l.expires_at, l.country, l.guest_first_name, l.guest_last_name, l.used_at, l.revoked_at, l.created_by, l.created_at, l.updated_at
            FROM access_links l
            JOIN data_rooms r ON r.id = l.room_id
            WHERE l.id = $1 AND r.owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Consume one use: decrement the limit and stamp `used_at`, guarded on
    /// the link still being redeemable. Guard and decrement execute as a
    /// single statement, so concurrent redemptions of the last remaining use
    /// can match at most once.
    ///
    /// Returns the stamped `used_at`, or `None` when no use remained.
    pub async fn consume_use(&self, id: Uuid) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        let timer = QueryTimer::new("consume_link_use");

        let result = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            UPDATE access_links
            SET usage_limit = usage_limit - 1, used_at = NOW(), updated_at = NOW()
            WHERE id = $1
              AND revoked_at IS NULL
              AND (expires_at IS NULL OR expires_at > NOW())
              AND usage_limit IS NOT NULL
              AND usage_limit > 0
            RETURNING used_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Revoke a link (soft delete). Returns false if it was already revoked.
    pub async fn revoke(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE access_links
            SET revoked_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List a room's links with pagination, newest first. Revoked links are
    /// excluded unless requested; expired and exhausted links always appear
    /// since their status is derived, not stored.
    pub async fn list_by_room(
        &self,
        room_id: Uuid,
        query: &ListAccessLinksQuery,
    ) -> Result<(Vec<AccessLink>, i64), sqlx::Error> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
        let offset = ((page - 1) * per_page) as i64;
        let include_revoked = query.include_revoked.unwrap_or(false);

        let where_clause = if include_revoked {
            "WHERE room_id = $1"
        } else {
            "WHERE room_id = $1 AND revoked_at IS NULL"
        };

        let count_query = format!("SELECT COUNT(*) FROM access_links {}", where_clause);
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(room_id)
            .fetch_one(&self.pool)
            .await?;

        let select_query = format!(
            r#"
            SELECT id, room_id, token, email, usage_limit, expires_at, country, guest_first_name, guest_last_name, used_at, revoked_at, created_by, created_at, updated_at
            FROM access_links
            {}
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            where_clause
        );

        let entities = sqlx::query_as::<_, AccessLinkEntity>(&select_query)
            .bind(room_id)
            .bind(per_page as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((entities.into_iter().map(Into::into).collect(), total))
    }
}
