//! Role-based authorization guards.
//!
//! Each guard extracts the authenticated user from request extensions and
//! verifies the role the endpoint demands. Roles are flat, not hierarchical:
//! an administrator does not implicitly gain public-relations or technical
//! powers, and citizens never gain staff surfaces.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn authenticated(parts: &Parts) -> Result<AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for citizen-only endpoints (filing reports, "mine" listings,
/// telegram link minting).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireCitizen(user): RequireCitizen) { ... }
/// ```
pub struct RequireCitizen(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireCitizen
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_citizen() {
            return Err(AppError::Forbidden("Citizen access required".to_string()));
        }

        Ok(RequireCitizen(user))
    }
}

/// Guard for public-relations triage endpoints (approve/reject, pending
/// queue, assignable-technicals lookup).
pub struct RequirePublicRelations(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequirePublicRelations
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_public_relations() {
            return Err(AppError::Forbidden(
                "Public relations access required".to_string(),
            ));
        }

        Ok(RequirePublicRelations(user))
    }
}

/// Guard for technical-office endpoints (assigned queue, external
/// delegation).
pub struct RequireTechnicalStaff(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireTechnicalStaff
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_technical_staff() {
            return Err(AppError::Forbidden(
                "Technical staff access required".to_string(),
            ));
        }

        Ok(RequireTechnicalStaff(user))
    }
}

/// Guard for external-maintainer endpoints (delegated queue).
pub struct RequireExternalMaintainer(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireExternalMaintainer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_external_maintainer() {
            return Err(AppError::Forbidden(
                "External maintainer access required".to_string(),
            ));
        }

        Ok(RequireExternalMaintainer(user))
    }
}

/// Guard for account/company administration endpoints.
pub struct RequireAdministrator(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdministrator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_administrator() {
            return Err(AppError::Forbidden(
                "Administrator access required".to_string(),
            ));
        }

        Ok(RequireAdministrator(user))
    }
}
