use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::CreateStaffUserDto;
use crate::features::auth::services::hash_password;
use crate::features::companies::services::CompanyService;
use crate::features::users::models::{CreateUser, User, UserRole};
use crate::features::users::services::UserService;
use crate::shared::validation::PERSON_NAME_REGEX;

/// Account provisioning for municipal staff and external maintainers.
///
/// Enforces the role composition rules before any row is written: citizens
/// come only through public signup, and a company link is exclusive to the
/// external maintainer role.
pub struct AdminService {
    users: Arc<UserService>,
    companies: Arc<CompanyService>,
}

impl AdminService {
    pub fn new(users: Arc<UserService>, companies: Arc<CompanyService>) -> Self {
        Self { users, companies }
    }

    /// Create a staff or maintainer account with an explicit role set.
    pub async fn create_user(&self, dto: CreateStaffUserDto) -> Result<User> {
        if !PERSON_NAME_REGEX.is_match(dto.first_name.trim()) {
            return Err(AppError::Validation(
                "first name contains invalid characters".to_string(),
            ));
        }
        if !PERSON_NAME_REGEX.is_match(dto.last_name.trim()) {
            return Err(AppError::Validation(
                "last name contains invalid characters".to_string(),
            ));
        }

        Self::validate_role_assignment(&dto.roles, dto.external_company_id)?;

        if let Some(company_id) = dto.external_company_id {
            let company = self
                .companies
                .find_by_id(company_id)
                .await?
                .ok_or_else(|| {
                    AppError::UnprocessableEntity(
                        "External company does not exist".to_string(),
                    )
                })?;

            if !company.platform_access {
                return Err(AppError::UnprocessableEntity(
                    "External company does not have platform access".to_string(),
                ));
            }
        }

        let password_hash = hash_password(&dto.password)?;

        self.users
            .create_with_roles(CreateUser {
                email: dto.email.trim().to_lowercase(),
                password_hash,
                first_name: dto.first_name.trim().to_string(),
                last_name: dto.last_name.trim().to_string(),
                roles: dto.roles,
                external_company_id: dto.external_company_id,
            })
            .await
    }

    pub async fn list_users(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64)> {
        self.users.list(offset, limit).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Role composition rules, checked before the database is touched.
    fn validate_role_assignment(
        roles: &[UserRole],
        external_company_id: Option<Uuid>,
    ) -> Result<()> {
        if roles.contains(&UserRole::Citizen) {
            return Err(AppError::UnprocessableEntity(
                "Citizen accounts are created through public signup".to_string(),
            ));
        }

        if roles.contains(&UserRole::ExternalMaintainer) {
            if roles.len() > 1 {
                return Err(AppError::UnprocessableEntity(
                    "External maintainer cannot hold additional roles".to_string(),
                ));
            }
            if external_company_id.is_none() {
                return Err(AppError::UnprocessableEntity(
                    "External maintainer requires an external company".to_string(),
                ));
            }
        } else if external_company_id.is_some() {
            return Err(AppError::UnprocessableEntity(
                "Only external maintainer accounts belong to a company".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unprocessable(result: Result<()>) {
        match result {
            Err(AppError::UnprocessableEntity(_)) => {}
            other => panic!("expected UnprocessableEntity, got {other:?}"),
        }
    }

    #[test]
    fn citizen_role_is_never_admin_created() {
        assert_unprocessable(AdminService::validate_role_assignment(
            &[UserRole::Citizen],
            None,
        ));
        assert_unprocessable(AdminService::validate_role_assignment(
            &[UserRole::PublicRelations, UserRole::Citizen],
            None,
        ));
    }

    #[test]
    fn maintainer_must_be_the_sole_role() {
        assert_unprocessable(AdminService::validate_role_assignment(
            &[UserRole::ExternalMaintainer, UserRole::Infrastructures],
            Some(Uuid::now_v7()),
        ));
    }

    #[test]
    fn maintainer_requires_a_company() {
        assert_unprocessable(AdminService::validate_role_assignment(
            &[UserRole::ExternalMaintainer],
            None,
        ));
    }

    #[test]
    fn company_link_is_exclusive_to_maintainers() {
        assert_unprocessable(AdminService::validate_role_assignment(
            &[UserRole::LocalPublicServices],
            Some(Uuid::now_v7()),
        ));
    }

    #[test]
    fn staff_role_combinations_pass() {
        assert!(AdminService::validate_role_assignment(&[UserRole::PublicRelations], None).is_ok());
        assert!(AdminService::validate_role_assignment(
            &[UserRole::LocalPublicServices, UserRole::Infrastructures],
            None,
        )
        .is_ok());
        assert!(AdminService::validate_role_assignment(
            &[UserRole::ExternalMaintainer],
            Some(Uuid::now_v7()),
        )
        .is_ok());
    }
}
