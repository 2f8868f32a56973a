//! Room file repository for database operations.

use domain::models::room_file::RoomFile;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::room_file::RoomFileEntity;

/// Repository for file metadata database operations.
#[derive(Clone)]
pub struct RoomFileRepository {
    pool: PgPool,
}

impl RoomFileRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register file metadata for a room.
    pub async fn create(
        &self,
        room_id: Uuid,
        name: &str,
        storage_key: &str,
        content_type: Option<&str>,
        size_bytes: Option<i64>,
    ) -> Result<RoomFile, sqlx::Error> {
        let entity = sqlx::query_as::<_, RoomFileEntity>(
            r#"
            INSERT INTO room_files (id, room_id, name, storage_key, content_type, size_bytes)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5)
            RETURNING id, room_id, name, storage_key, content_type, size_bytes, created_at
            "#,
        )
        .bind(room_id)
        .bind(name)
        .bind(storage_key)
        .bind(content_type)
        .bind(size_bytes)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a file by ID, scoped to the owner of its room.
    pub async fn find_by_id_for_owner(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<RoomFile>, sqlx::Error> {
        let entity = sqlx::query_as::<_, RoomFileEntity>(
            r#"
            SELECT f.id, f.room_id, f.name, f.storage_key, f.content_type, f.size_bytes, f.created_at
            FROM room_files f
            JOIN data_rooms r ON r.id = f.room_id
            WHERE f.id = $1 AND r.owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List a room's files, newest first.
    pub async fn list_by_room(&self, room_id: Uuid) -> Result<Vec<RoomFile>, sqlx::Error> {
        let entities = sqlx::query_as::<_, RoomFileEntity>(
            r#"
            SELECT id, room_id, name, storage_key, content_type, size_bytes, created_at
            FROM room_files
            WHERE room_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Remove file metadata.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM room_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
