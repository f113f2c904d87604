use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::UserRole;

/// Administrator-provisioned account (municipal staff or external maintainer).
///
/// Citizens never arrive through this payload; they register themselves via
/// the public signup endpoint.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStaffUserDto {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 60, message = "first name must be 1-60 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 60, message = "last name must be 1-60 characters"))]
    pub last_name: String,

    #[validate(length(min = 1, message = "at least one role is required"))]
    pub roles: Vec<UserRole>,

    /// Required for external maintainers, forbidden for everyone else.
    pub external_company_id: Option<Uuid>,
}
