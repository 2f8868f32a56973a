//! Data room repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::data_room::{DataRoom, ListDataRoomsQuery};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::data_room::DataRoomEntity;
use crate::metrics::QueryTimer;

/// Repository for data room database operations.
#[derive(Clone)]
pub struct DataRoomRepository {
    pool: PgPool,
}

impl DataRoomRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new data room owned by the given user.
    pub async fn create(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
        valid_until: Option<DateTime<Utc>>,
    ) -> Result<DataRoom, sqlx::Error> {
        let entity = sqlx::query_as::<_, DataRoomEntity>(
            r#"
            INSERT INTO data_rooms (id, owner_id, name, description, valid_until)
            VALUES (gen_random_uuid(), $1, $2, $3, $4)
            RETURNING id, owner_id, name, description, valid_until, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .bind(valid_until)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a room by ID without ownership scoping. Used by the guest flow,
    /// which reaches rooms through a redeemed link rather than a session.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DataRoom>, sqlx::Error> {
        let entity = sqlx::query_as::<_, DataRoomEntity>(
            r#"
            SELECT id, owner_id, name, description, valid_until, created_at, updated_at
            FROM data_rooms
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Find a room by ID, scoped to its owner.
    pub async fn find_by_id_for_owner(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<DataRoom>, sqlx::Error> {
        let entity = sqlx::query_as::<_, DataRoomEntity>(
            r#"
            SELECT id, owner_id, name, description, valid_until, created_at, updated_at
            FROM data_rooms
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List rooms for an owner with pagination, newest first.
    pub async fn list(
        &self,
        owner_id: Uuid,
        query: &ListDataRoomsQuery,
    ) -> Result<(Vec<DataRoom>, i64), sqlx::Error> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
        let offset = ((page - 1) * per_page) as i64;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM data_rooms WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        let entities = sqlx::query_as::<_, DataRoomEntity>(
            r#"
            SELECT id, owner_id, name, description, valid_until, created_at, updated_at
            FROM data_rooms
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((entities.into_iter().map(Into::into).collect(), total))
    }

    /// Update a room's mutable fields. Absent fields keep their value.
    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        valid_until: Option<DateTime<Utc>>,
    ) -> Result<Option<DataRoom>, sqlx::Error> {
        let timer = QueryTimer::new("update_data_room");

        let result = sqlx::query_as::<_, DataRoomEntity>(
            r#"
            UPDATE data_rooms
            SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                valid_until = COALESCE($5, valid_until),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, name, description, valid_until, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .bind(valid_until)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Hard delete a room. Files, links, and events cascade.
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM data_rooms WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
