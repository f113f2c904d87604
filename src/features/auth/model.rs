use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::users::models::UserRole;

/// Identity attached to every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_company_id: Option<Uuid>,
}

impl AuthenticatedUser {
    /// Check if user holds a specific role
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_citizen(&self) -> bool {
        self.has_role(UserRole::Citizen)
    }

    pub fn is_administrator(&self) -> bool {
        self.has_role(UserRole::Administrator)
    }

    pub fn is_public_relations(&self) -> bool {
        self.has_role(UserRole::PublicRelations)
    }

    /// Check if user holds any technical-office role
    pub fn is_technical_staff(&self) -> bool {
        self.roles.iter().any(|r| r.is_technical())
    }

    pub fn is_external_maintainer(&self) -> bool {
        self.has_role(UserRole::ExternalMaintainer)
    }

    /// Municipality-side staff: administrator, public relations or a
    /// technical office. External maintainers are not municipal staff.
    pub fn is_municipal_staff(&self) -> bool {
        self.is_administrator() || self.is_public_relations() || self.is_technical_staff()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Claims carried inside the session JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
}

impl From<SessionClaims> for AuthenticatedUser {
    fn from(claims: SessionClaims) -> Self {
        AuthenticatedUser {
            id: claims.sub,
            email: claims.email,
            first_name: claims.first_name,
            last_name: claims.last_name,
            roles: claims.roles,
            external_company_id: claims.company,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        citizen_user, maintainer_user, public_relations_user, technical_user,
    };

    #[test]
    fn technical_staff_covers_every_technical_office() {
        for role in UserRole::TECHNICAL {
            assert!(technical_user(role).is_technical_staff(), "{role:?}");
        }
        assert!(!citizen_user().is_technical_staff());
        assert!(!public_relations_user().is_technical_staff());
    }

    #[test]
    fn maintainer_is_not_municipal_staff() {
        let maintainer = maintainer_user(Uuid::now_v7());
        assert!(maintainer.is_external_maintainer());
        assert!(!maintainer.is_municipal_staff());
        assert!(public_relations_user().is_municipal_staff());
        assert!(technical_user(UserRole::WaterNetwork).is_municipal_staff());
    }

    #[test]
    fn user_with_two_offices_holds_both() {
        let mut user = technical_user(UserRole::Infrastructures);
        user.roles.push(UserRole::RoadMaintenance);
        assert!(user.has_role(UserRole::Infrastructures));
        assert!(user.has_role(UserRole::RoadMaintenance));
        assert!(!user.has_role(UserRole::GreenSpaces));
    }
}
