use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::dtos::{NotificationResponseDto, UnreadCountDto};
use crate::features::notifications::services::NotificationService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// List the caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Notifications retrieved successfully", body = ApiResponse<Vec<NotificationResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<NotificationResponseDto>>>> {
    let (notifications, total) = service
        .list(user.id, pagination.offset(), pagination.limit())
        .await?;

    let data = notifications
        .into_iter()
        .map(NotificationResponseDto::from)
        .collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta { total }),
    )))
}

/// Count the caller's unread notifications
#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses(
        (status = 200, description = "Unread count retrieved successfully", body = ApiResponse<UnreadCountDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn unread_count(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
) -> Result<Json<ApiResponse<UnreadCountDto>>> {
    let unread = service.unread_count(user.id).await?;
    Ok(Json(ApiResponse::success(
        Some(UnreadCountDto { unread }),
        None,
        None,
    )))
}

/// Mark one notification as read
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked as read", body = ApiResponse<NotificationResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Notification not found")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn mark_notification_read(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationResponseDto>>> {
    let notification = service.mark_read(user.id, id).await?;
    Ok(Json(ApiResponse::success(
        Some(notification.into()),
        None,
        None,
    )))
}

/// Mark every notification of the caller as read
#[utoipa::path(
    patch,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "All notifications marked as read", body = ApiResponse<UnreadCountDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn mark_all_notifications_read(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
) -> Result<Json<ApiResponse<UnreadCountDto>>> {
    let updated = service.mark_all_read(user.id).await?;
    Ok(Json(ApiResponse::success(
        Some(UnreadCountDto { unread: 0 }),
        Some(format!("{updated} notifications marked as read")),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{citizen_user, lazy_pool, with_auth};
    use axum::routing::{get, patch};
    use axum::Router;
    use axum_test::TestServer;

    fn router() -> Router {
        let service = Arc::new(NotificationService::new(lazy_pool()));
        Router::new()
            .route("/api/notifications", get(list_notifications))
            .route("/api/notifications/unread-count", get(unread_count))
            .route(
                "/api/notifications/{id}/read",
                patch(mark_notification_read),
            )
            .with_state(service)
    }

    #[tokio::test]
    async fn inbox_requires_authentication() {
        let server = TestServer::new(router()).unwrap();

        let response = server.get("/api/notifications").await;
        response.assert_status_unauthorized();

        let response = server.get("/api/notifications/unread-count").await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn mark_read_rejects_malformed_id() {
        let server = TestServer::new(with_auth(router(), citizen_user())).unwrap();

        let response = server.patch("/api/notifications/not-a-uuid/read").await;

        response.assert_status_bad_request();
    }
}
