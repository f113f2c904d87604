use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::guards::{
    RequireCitizen, RequireExternalMaintainer, RequirePublicRelations, RequireTechnicalStaff,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{CreateReportDto, ReportResponseDto};
use crate::features::reports::models::CreateReport;
use crate::features::reports::services::{
    AssignmentService, ConversationService, GeocodingService, ReportService, WorkflowService,
};
use crate::modules::storage::PhotoStorage;
use crate::shared::constants::{
    ALLOWED_PHOTO_CONTENT_TYPES, MAX_PHOTO_SIZE_BYTES, MAX_REPORT_PHOTOS, MIN_REPORT_PHOTOS,
};
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// State shared by the reports feature handlers
#[derive(Clone)]
pub struct ReportsState {
    pub reports: Arc<ReportService>,
    pub workflow: Arc<WorkflowService>,
    pub assignments: Arc<AssignmentService>,
    pub conversations: Arc<ConversationService>,
    pub geocoding: Arc<GeocodingService>,
    pub storage: Arc<PhotoStorage>,
}

/// One photo part as it came off the wire
struct PhotoPart {
    content_type: String,
    data: Vec<u8>,
}

/// File a report
///
/// Accepts multipart/form-data with the report fields as text parts and
/// 1-3 repeated `photos` file parts. When no `address` field is sent the
/// coordinates are reverse-geocoded best-effort.
#[utoipa::path(
    post,
    path = "/api/reports",
    tag = "reports",
    request_body(
        content = CreateReportDto,
        content_type = "multipart/form-data",
        description = "Report form fields plus 1-3 `photos` file parts (JPEG, PNG or WebP, max 8 MB each)",
    ),
    responses(
        (status = 201, description = "Report filed", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Missing fields, bad coordinates or photo set"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Citizen access required"),
        (status = 422, description = "Photo too large")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_report(
    RequireCitizen(user): RequireCitizen,
    State(state): State<ReportsState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut category: Option<String> = None;
    let mut latitude: Option<String> = None;
    let mut longitude: Option<String> = None;
    let mut address: Option<String> = None;
    let mut is_anonymous = false;
    let mut photos: Vec<PhotoPart> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "title" => title = Some(read_text_field(field, "title").await?),
            "description" => description = Some(read_text_field(field, "description").await?),
            "category" => category = Some(read_text_field(field, "category").await?),
            "latitude" => latitude = Some(read_text_field(field, "latitude").await?),
            "longitude" => longitude = Some(read_text_field(field, "longitude").await?),
            "address" => {
                let text = read_text_field(field, "address").await?;
                if !text.trim().is_empty() {
                    address = Some(text);
                }
            }
            "is_anonymous" => {
                let text = read_text_field(field, "is_anonymous").await?;
                is_anonymous = matches!(text.to_lowercase().as_str(), "true" | "1");
            }
            "photos" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read photo bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read photo data: {}", e))
                })?;
                photos.push(PhotoPart {
                    content_type,
                    data: data.to_vec(),
                });
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let dto = CreateReportDto {
        title: title.ok_or_else(|| AppError::BadRequest("Title is required".to_string()))?,
        description: description
            .ok_or_else(|| AppError::BadRequest("Description is required".to_string()))?,
        category: category
            .ok_or_else(|| AppError::BadRequest("Category is required".to_string()))?
            .trim()
            .parse()
            .map_err(AppError::BadRequest)?,
        latitude: parse_coordinate_field(latitude, "Latitude")?,
        longitude: parse_coordinate_field(longitude, "Longitude")?,
        address,
        is_anonymous,
    };

    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    ReportService::validate_coordinates(dto.latitude, dto.longitude)?;
    validate_photo_batch(&photos)?;

    let mut uploaded = Vec::with_capacity(photos.len());
    for photo in photos {
        uploaded.push(
            state
                .storage
                .upload_photo(photo.data, &photo.content_type)
                .await?,
        );
    }

    // The form may omit the address; fill it from the coordinates when the
    // geocoder cooperates, leave it empty when it does not.
    let resolved_address = match dto.address {
        Some(addr) => Some(addr),
        None => state.geocoding.reverse(dto.latitude, dto.longitude).await,
    };

    let (report, stored_photos) = state
        .reports
        .create(
            CreateReport {
                title: dto.title,
                description: dto.description,
                category: dto.category,
                latitude: dto.latitude,
                longitude: dto.longitude,
                address: resolved_address,
                is_anonymous: dto.is_anonymous,
                reporter_id: user.id,
            },
            uploaded,
        )
        .await?;

    let response = ReportResponseDto::from_parts(
        report,
        &user.first_name,
        &user.last_name,
        stored_photos,
        user.id,
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read {} field: {}", name, e)))
}

fn parse_coordinate_field(value: Option<String>, name: &str) -> Result<f64> {
    let text = value.ok_or_else(|| AppError::BadRequest(format!("{} is required", name)))?;
    text.trim()
        .parse::<f64>()
        .map_err(|_| AppError::BadRequest(format!("{} must be a number", name)))
}

/// Count, type and size checks for the photo set. Count and type problems
/// are malformed requests; an oversize photo is a domain-rule violation.
fn validate_photo_batch(photos: &[PhotoPart]) -> Result<()> {
    if photos.len() < MIN_REPORT_PHOTOS || photos.len() > MAX_REPORT_PHOTOS {
        return Err(AppError::BadRequest(format!(
            "A report carries between {} and {} photos",
            MIN_REPORT_PHOTOS, MAX_REPORT_PHOTOS
        )));
    }

    for photo in photos {
        if !ALLOWED_PHOTO_CONTENT_TYPES.contains(&photo.content_type.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Photo type '{}' is not allowed. Allowed types: {}",
                photo.content_type,
                ALLOWED_PHOTO_CONTENT_TYPES.join(", ")
            )));
        }
        if photo.data.is_empty() {
            return Err(AppError::BadRequest("Empty photo upload".to_string()));
        }
        if photo.data.len() > MAX_PHOTO_SIZE_BYTES {
            return Err(AppError::UnprocessableEntity(format!(
                "Photo too large. Maximum size is {} MB",
                MAX_PHOTO_SIZE_BYTES / 1024 / 1024
            )));
        }
    }

    Ok(())
}

/// List approved reports
///
/// Shared city-wide view; pending and rejected reports are excluded.
#[utoipa::path(
    get,
    path = "/api/reports",
    tag = "reports",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Reports visible to everyone", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_shared_reports(
    user: AuthenticatedUser,
    State(state): State<ReportsState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let (reports, total) = state
        .reports
        .list_shared(user.id, pagination.offset(), pagination.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(reports),
        None,
        Some(Meta { total }),
    )))
}

/// List the authenticated citizen's own reports
#[utoipa::path(
    get,
    path = "/api/reports/mine",
    tag = "reports",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Reports filed by the caller", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Citizen access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_reports(
    RequireCitizen(user): RequireCitizen,
    State(state): State<ReportsState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let (reports, total) = state
        .reports
        .list_mine(user.id, pagination.offset(), pagination.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(reports),
        None,
        Some(Meta { total }),
    )))
}

/// List reports waiting for triage, oldest first
#[utoipa::path(
    get,
    path = "/api/reports/pending",
    tag = "reports",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Pending reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Public relations access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_pending_reports(
    RequirePublicRelations(user): RequirePublicRelations,
    State(state): State<ReportsState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let (reports, total) = state
        .reports
        .list_pending(user.id, pagination.offset(), pagination.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(reports),
        None,
        Some(Meta { total }),
    )))
}

/// List reports assigned to the authenticated technical officer
#[utoipa::path(
    get,
    path = "/api/reports/assigned",
    tag = "reports",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Reports owned by the caller", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Technical staff access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_assigned_reports(
    RequireTechnicalStaff(user): RequireTechnicalStaff,
    State(state): State<ReportsState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let (reports, total) = state
        .reports
        .list_assigned(user.id, pagination.offset(), pagination.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(reports),
        None,
        Some(Meta { total }),
    )))
}

/// List reports delegated to the authenticated external maintainer
#[utoipa::path(
    get,
    path = "/api/reports/external",
    tag = "reports",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Reports delegated to the caller", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "External maintainer access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_external_reports(
    RequireExternalMaintainer(user): RequireExternalMaintainer,
    State(state): State<ReportsState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let (reports, total) = state
        .reports
        .list_external(user.id, pagination.offset(), pagination.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(reports),
        None,
        Some(Meta { total }),
    )))
}

/// Get one report
///
/// Visible to the reporter, municipal staff and the assigned maintainer.
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    tag = "reports",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not allowed to view this report"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_report(
    user: AuthenticatedUser,
    State(state): State<ReportsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.reports.get_for_viewer(id, &user).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::Router;
    use axum_test::TestServer;

    use crate::shared::test_helpers::{
        citizen_user, offline_reports_state, public_relations_user, with_auth,
    };

    fn photo(content_type: &str, size: usize) -> PhotoPart {
        PhotoPart {
            content_type: content_type.to_string(),
            data: vec![0u8; size],
        }
    }

    #[test]
    fn photo_batch_bounds_are_enforced() {
        assert!(validate_photo_batch(&[]).is_err());
        assert!(validate_photo_batch(&[
            photo("image/jpeg", 10),
            photo("image/png", 10),
            photo("image/webp", 10),
            photo("image/jpeg", 10),
        ])
        .is_err());

        assert!(validate_photo_batch(&[photo("image/jpeg", 10)]).is_ok());
        assert!(validate_photo_batch(&[
            photo("image/jpeg", 10),
            photo("image/png", 10),
            photo("image/webp", 10),
        ])
        .is_ok());
    }

    #[test]
    fn photo_batch_rejects_foreign_types_and_oversize() {
        let err = validate_photo_batch(&[photo("application/pdf", 10)]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err =
            validate_photo_batch(&[photo("image/jpeg", MAX_PHOTO_SIZE_BYTES + 1)]).unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));

        let err = validate_photo_batch(&[photo("image/jpeg", 0)]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn coordinate_fields_must_be_numeric() {
        assert!(parse_coordinate_field(Some("45.07".to_string()), "Latitude").is_ok());
        assert!(parse_coordinate_field(Some(" 7.68 ".to_string()), "Longitude").is_ok());
        assert!(parse_coordinate_field(Some("north".to_string()), "Latitude").is_err());
        assert!(parse_coordinate_field(None, "Latitude").is_err());
    }

    #[tokio::test]
    async fn create_report_requires_citizen_role() {
        let app = Router::new()
            .route("/api/reports", post(create_report))
            .with_state(offline_reports_state());
        let server = TestServer::new(with_auth(app, public_relations_user())).unwrap();

        let response = server.post("/api/reports").await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn create_report_requires_authentication() {
        let app = Router::new()
            .route("/api/reports", post(create_report))
            .with_state(offline_reports_state());
        let server = TestServer::new(app).unwrap();

        let response = server.post("/api/reports").await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn pending_queue_is_staff_only() {
        let app = Router::new()
            .route("/api/reports/pending", get(list_pending_reports))
            .with_state(offline_reports_state());
        let server = TestServer::new(with_auth(app, citizen_user())).unwrap();

        let response = server.get("/api/reports/pending").await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn detail_rejects_malformed_id() {
        let app = Router::new()
            .route("/api/reports/{id}", get(get_report))
            .with_state(offline_reports_state());
        let server = TestServer::new(with_auth(app, citizen_user())).unwrap();

        let response = server.get("/api/reports/not-a-uuid").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
