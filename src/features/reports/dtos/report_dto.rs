use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::reports::models::{Report, ReportCategory, ReportPhoto, ReportStatus};

/// Form fields accepted when filing a report.
///
/// Arrives as multipart/form-data together with 1-3 `photos` file parts; the
/// handler assembles this struct from the text fields.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReportDto {
    #[validate(length(min = 1, max = 120, message = "Title must be 1-120 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: String,

    pub category: ReportCategory,

    /// WGS84 latitude of the issue
    pub latitude: f64,

    /// WGS84 longitude of the issue
    pub longitude: f64,

    /// Optional human-readable address; filled by reverse geocoding on the
    /// client when present
    pub address: Option<String>,

    /// Hide the reporter's identity from other users
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Reporter identity as exposed to a given viewer. Anonymous reports show a
/// placeholder to everyone but the reporter themself.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReporterDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
}

impl ReporterDto {
    pub fn for_viewer(
        reporter_id: Uuid,
        first_name: &str,
        last_name: &str,
        is_anonymous: bool,
        viewer_id: Uuid,
    ) -> Self {
        if is_anonymous && viewer_id != reporter_id {
            return Self {
                id: None,
                first_name: "anonymous".to_string(),
                last_name: String::new(),
            };
        }
        Self {
            id: Some(reporter_id),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }
}

/// Response DTO for one report photo
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PhotoDto {
    pub id: Uuid,
    pub url: String,
    pub content_type: String,
}

impl From<ReportPhoto> for PhotoDto {
    fn from(photo: ReportPhoto) -> Self {
        Self {
            id: photo.id,
            url: photo.url,
            content_type: photo.content_type,
        }
    }
}

/// Response DTO for a report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub status: ReportStatus,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub is_anonymous: bool,
    pub reporter: ReporterDto,
    pub assigned_officer_id: Option<Uuid>,
    pub external_maintainer_id: Option<Uuid>,
    pub external_company_id: Option<Uuid>,
    pub rejected_reason: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub photos: Vec<PhotoDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReportResponseDto {
    pub fn from_parts(
        report: Report,
        reporter_first_name: &str,
        reporter_last_name: &str,
        photos: Vec<ReportPhoto>,
        viewer_id: Uuid,
    ) -> Self {
        let reporter = ReporterDto::for_viewer(
            report.reporter_id,
            reporter_first_name,
            reporter_last_name,
            report.is_anonymous,
            viewer_id,
        );

        Self {
            id: report.id,
            title: report.title,
            description: report.description,
            category: report.category,
            status: report.status,
            latitude: report.latitude,
            longitude: report.longitude,
            address: report.address,
            is_anonymous: report.is_anonymous,
            reporter,
            assigned_officer_id: report.assigned_officer_id,
            external_maintainer_id: report.external_maintainer_id,
            external_company_id: report.external_company_id,
            rejected_reason: report.rejected_reason,
            resolved_at: report.resolved_at,
            photos: photos.into_iter().map(PhotoDto::from).collect(),
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_reporter_is_masked_for_other_viewers() {
        let reporter = Uuid::now_v7();
        let viewer = Uuid::now_v7();

        let dto = ReporterDto::for_viewer(reporter, "Carla", "Verdi", true, viewer);

        assert_eq!(dto.id, None);
        assert_eq!(dto.first_name, "anonymous");
        assert_eq!(dto.last_name, "");
    }

    #[test]
    fn anonymous_reporter_sees_their_own_identity() {
        let reporter = Uuid::now_v7();

        let dto = ReporterDto::for_viewer(reporter, "Carla", "Verdi", true, reporter);

        assert_eq!(dto.id, Some(reporter));
        assert_eq!(dto.first_name, "Carla");
    }

    #[test]
    fn named_reporter_is_visible_to_everyone() {
        let reporter = Uuid::now_v7();
        let viewer = Uuid::now_v7();

        let dto = ReporterDto::for_viewer(reporter, "Carla", "Verdi", false, viewer);

        assert_eq!(dto.id, Some(reporter));
        assert_eq!(dto.last_name, "Verdi");
    }
}
