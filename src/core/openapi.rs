use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::companies::{dtos as companies_dtos, handlers as companies_handlers};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
    models as notifications_models,
};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::telegram::{dtos as telegram_dtos, handlers as telegram_handlers};
use crate::features::users::{
    dtos as users_dtos, handlers as users_handlers, models as users_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Session
        users_handlers::signup,
        auth_handlers::login,
        auth_handlers::current_session,
        auth_handlers::logout,
        // Reports
        reports_handlers::create_report,
        reports_handlers::list_shared_reports,
        reports_handlers::list_my_reports,
        reports_handlers::list_pending_reports,
        reports_handlers::list_assigned_reports,
        reports_handlers::list_external_reports,
        reports_handlers::get_report,
        // Workflow
        reports_handlers::approve_report,
        reports_handlers::reject_report,
        reports_handlers::update_report_status,
        reports_handlers::assign_external,
        reports_handlers::list_assignable_technicals,
        reports_handlers::list_assignable_externals,
        // Conversation
        reports_handlers::list_report_messages,
        reports_handlers::create_report_message,
        reports_handlers::list_report_notes,
        reports_handlers::create_report_note,
        // Geocoding
        reports_handlers::search_addresses,
        // Notifications
        notifications_handlers::list_notifications,
        notifications_handlers::unread_count,
        notifications_handlers::mark_notification_read,
        notifications_handlers::mark_all_notifications_read,
        // Telegram
        telegram_handlers::create_link_token,
        telegram_handlers::link_chat,
        telegram_handlers::check_linked,
        telegram_handlers::chat_reports,
        // Admin
        admin_handlers::create_user,
        admin_handlers::list_users,
        admin_handlers::get_user,
        companies_handlers::create_company,
        companies_handlers::list_companies,
        companies_handlers::get_company,
        companies_handlers::update_platform_access,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Session
            auth_dtos::LoginRequestDto,
            auth_dtos::SessionResponseDto,
            auth_dtos::SessionUserDto,
            ApiResponse<auth_dtos::SessionResponseDto>,
            ApiResponse<auth_dtos::SessionUserDto>,
            // Accounts
            users_models::UserRole,
            users_dtos::SignupRequestDto,
            users_dtos::UserResponseDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            // Reports
            reports_models::ReportStatus,
            reports_models::ReportCategory,
            reports_dtos::CreateReportDto,
            reports_dtos::ReporterDto,
            reports_dtos::PhotoDto,
            reports_dtos::ReportResponseDto,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            // Workflow
            reports_dtos::ApproveReportDto,
            reports_dtos::RejectReportDto,
            reports_dtos::UpdateReportStatusDto,
            reports_dtos::AssignExternalDto,
            reports_dtos::AssignableTechnicalDto,
            reports_dtos::AssignableExternalDto,
            ApiResponse<Vec<reports_dtos::AssignableTechnicalDto>>,
            ApiResponse<Vec<reports_dtos::AssignableExternalDto>>,
            // Conversation
            reports_dtos::CreateMessageDto,
            reports_dtos::MessageResponseDto,
            reports_dtos::NoteResponseDto,
            ApiResponse<reports_dtos::MessageResponseDto>,
            ApiResponse<Vec<reports_dtos::MessageResponseDto>>,
            ApiResponse<reports_dtos::NoteResponseDto>,
            ApiResponse<Vec<reports_dtos::NoteResponseDto>>,
            // Geocoding
            reports_dtos::GeocodingResultDto,
            ApiResponse<Vec<reports_dtos::GeocodingResultDto>>,
            // Notifications
            notifications_models::NotificationKind,
            notifications_dtos::NotificationResponseDto,
            notifications_dtos::UnreadCountDto,
            ApiResponse<notifications_dtos::NotificationResponseDto>,
            ApiResponse<Vec<notifications_dtos::NotificationResponseDto>>,
            ApiResponse<notifications_dtos::UnreadCountDto>,
            // Telegram
            telegram_dtos::LinkTokenResponseDto,
            telegram_dtos::LinkChatDto,
            telegram_dtos::LinkStatusDto,
            ApiResponse<telegram_dtos::LinkTokenResponseDto>,
            ApiResponse<telegram_dtos::LinkStatusDto>,
            // Companies
            companies_dtos::CreateExternalCompanyDto,
            companies_dtos::UpdatePlatformAccessDto,
            companies_dtos::ExternalCompanyResponseDto,
            ApiResponse<companies_dtos::ExternalCompanyResponseDto>,
            ApiResponse<Vec<companies_dtos::ExternalCompanyResponseDto>>,
            // Admin
            admin_dtos::CreateStaffUserDto,
        )
    ),
    tags(
        (name = "session", description = "Signup and session lifecycle"),
        (name = "reports", description = "Filing and browsing civic issue reports"),
        (name = "workflow", description = "Triage, assignment and status transitions"),
        (name = "conversation", description = "Public report messages and internal staff notes"),
        (name = "geocoding", description = "Address search proxy"),
        (name = "notifications", description = "Per-user notification feed"),
        (name = "telegram", description = "Telegram account linkage, consumed by the bot"),
        (name = "admin", description = "Account and company management (administrator only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Participium API",
        version = "0.1.0",
        description = "API documentation for Participium",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
