//! Owner routes for the access audit trail.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use domain::models::access_event::{
    AccessEventPagination, ListAccessEventsQuery, ListAccessEventsResponse,
};
use persistence::repositories::{AccessEventRepository, DataRoomRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// List a room's access events, newest first.
///
/// GET /api/v1/rooms/{room_id}/events
///
/// Supports filtering by `link_id` and `outcome`.
pub async fn list_events(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(room_id): Path<Uuid>,
    Query(query): Query<ListAccessEventsQuery>,
) -> Result<Json<ListAccessEventsResponse>, ApiError> {
    let room = DataRoomRepository::new(state.pool.clone())
        .find_by_id_for_owner(auth.user_id, room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);

    let (events, total) = AccessEventRepository::new(state.pool.clone())
        .list_by_room(room.id, &query)
        .await?;

    Ok(Json(ListAccessEventsResponse {
        data: events,
        pagination: AccessEventPagination {
            page,
            per_page,
            total,
        },
    }))
}

#[cfg(test)]
mod tests {
    use domain::models::access_event::ListAccessEventsQuery;
    use domain::models::AccessOutcome;
    use serde_json::json;

    #[test]
    fn test_query_deserializes_filters() {
        let query: ListAccessEventsQuery =
            serde_json::from_value(json!({"outcome": "denied", "per_page": 10})).unwrap();

        assert_eq!(query.per_page, Some(10));
        assert!(matches!(query.outcome, Some(AccessOutcome::Denied)));
        assert!(query.link_id.is_none());
    }

    #[test]
    fn test_query_defaults_empty() {
        let query: ListAccessEventsQuery = serde_json::from_value(json!({})).unwrap();

        assert!(query.page.is_none());
        assert!(query.outcome.is_none());
    }
}
