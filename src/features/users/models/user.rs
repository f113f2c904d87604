use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgHasArrayType, PgTypeInfo};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Account role enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case", no_pg_array)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Citizen,
    Administrator,
    PublicRelations,
    LocalPublicServices,
    Infrastructures,
    RoadMaintenance,
    GreenSpaces,
    WasteManagement,
    WaterNetwork,
    ExternalMaintainer,
}

// Lets role sets travel as `user_role[]` binds and `array_agg` results.
impl PgHasArrayType for UserRole {
    fn array_type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("_user_role")
    }
}

impl UserRole {
    /// Technical offices that resolve reports on the internal path.
    pub const TECHNICAL: [UserRole; 6] = [
        UserRole::LocalPublicServices,
        UserRole::Infrastructures,
        UserRole::RoadMaintenance,
        UserRole::GreenSpaces,
        UserRole::WasteManagement,
        UserRole::WaterNetwork,
    ];

    pub fn is_technical(self) -> bool {
        Self::TECHNICAL.contains(&self)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Citizen => write!(f, "citizen"),
            UserRole::Administrator => write!(f, "administrator"),
            UserRole::PublicRelations => write!(f, "public_relations"),
            UserRole::LocalPublicServices => write!(f, "local_public_services"),
            UserRole::Infrastructures => write!(f, "infrastructures"),
            UserRole::RoadMaintenance => write!(f, "road_maintenance"),
            UserRole::GreenSpaces => write!(f, "green_spaces"),
            UserRole::WasteManagement => write!(f, "waste_management"),
            UserRole::WaterNetwork => write!(f, "water_network"),
            UserRole::ExternalMaintainer => write!(f, "external_maintainer"),
        }
    }
}

/// Database model for a user account, role set hydrated from `user_roles`
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub external_company_id: Option<Uuid>,
    pub telegram_chat_id: Option<i64>,
    pub roles: Vec<UserRole>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    /// True when the user's role set intersects the given set.
    pub fn holds_any(&self, roles: &[UserRole]) -> bool {
        self.roles.iter().any(|r| roles.contains(r))
    }
}

/// Data for creating a new account
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<UserRole>,
    pub external_company_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn technical_set_excludes_non_office_roles() {
        assert!(!UserRole::Citizen.is_technical());
        assert!(!UserRole::Administrator.is_technical());
        assert!(!UserRole::PublicRelations.is_technical());
        assert!(!UserRole::ExternalMaintainer.is_technical());
        assert!(UserRole::RoadMaintenance.is_technical());
        assert_eq!(UserRole::TECHNICAL.len(), 6);
    }

    #[test]
    fn holds_any_is_set_intersection() {
        let user = User {
            id: Uuid::now_v7(),
            email: "x@example.org".into(),
            password_hash: String::new(),
            first_name: "X".into(),
            last_name: "Y".into(),
            external_company_id: None,
            telegram_chat_id: None,
            roles: vec![UserRole::RoadMaintenance, UserRole::Infrastructures],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(user.holds_any(&[UserRole::Infrastructures]));
        assert!(user.holds_any(&[UserRole::GreenSpaces, UserRole::RoadMaintenance]));
        assert!(!user.holds_any(&[UserRole::WasteManagement, UserRole::WaterNetwork]));
        assert!(!user.holds_any(&[]));
    }
}
