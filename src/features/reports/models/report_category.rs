use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgHasArrayType, PgTypeInfo};
use sqlx::Type;
use utoipa::ToSchema;

use crate::features::users::models::UserRole;

/// Report category enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_category", rename_all = "snake_case", no_pg_array)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    ArchitecturalBarriers,
    ParksAndGreenery,
    PublicLighting,
    RoadsAndSidewalks,
    Waste,
    WaterAndSewage,
    StreetFurniture,
    Other,
}

impl PgHasArrayType for ReportCategory {
    fn array_type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("_report_category")
    }
}

impl ReportCategory {
    /// Technical roles allowed to take ownership of reports in this category.
    ///
    /// The matrix is deliberately narrow: each category maps to the offices
    /// that actually operate on it, and `Other` falls back to every office.
    pub fn eligible_roles(&self) -> &'static [UserRole] {
        match self {
            ReportCategory::ArchitecturalBarriers => {
                &[UserRole::Infrastructures, UserRole::RoadMaintenance]
            }
            ReportCategory::ParksAndGreenery => {
                &[UserRole::GreenSpaces, UserRole::LocalPublicServices]
            }
            ReportCategory::PublicLighting => {
                &[UserRole::LocalPublicServices, UserRole::Infrastructures]
            }
            ReportCategory::RoadsAndSidewalks => {
                &[UserRole::RoadMaintenance, UserRole::Infrastructures]
            }
            ReportCategory::Waste => &[UserRole::WasteManagement, UserRole::LocalPublicServices],
            ReportCategory::WaterAndSewage => &[UserRole::WaterNetwork, UserRole::Infrastructures],
            ReportCategory::StreetFurniture => {
                &[UserRole::LocalPublicServices, UserRole::RoadMaintenance]
            }
            ReportCategory::Other => &UserRole::TECHNICAL,
        }
    }
}

impl std::fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportCategory::ArchitecturalBarriers => write!(f, "architectural_barriers"),
            ReportCategory::ParksAndGreenery => write!(f, "parks_and_greenery"),
            ReportCategory::PublicLighting => write!(f, "public_lighting"),
            ReportCategory::RoadsAndSidewalks => write!(f, "roads_and_sidewalks"),
            ReportCategory::Waste => write!(f, "waste"),
            ReportCategory::WaterAndSewage => write!(f, "water_and_sewage"),
            ReportCategory::StreetFurniture => write!(f, "street_furniture"),
            ReportCategory::Other => write!(f, "other"),
        }
    }
}

/// Inverse of `Display`; used where the category arrives as a form field
/// rather than JSON.
impl std::str::FromStr for ReportCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "architectural_barriers" => Ok(ReportCategory::ArchitecturalBarriers),
            "parks_and_greenery" => Ok(ReportCategory::ParksAndGreenery),
            "public_lighting" => Ok(ReportCategory::PublicLighting),
            "roads_and_sidewalks" => Ok(ReportCategory::RoadsAndSidewalks),
            "waste" => Ok(ReportCategory::Waste),
            "water_and_sewage" => Ok(ReportCategory::WaterAndSewage),
            "street_furniture" => Ok(ReportCategory::StreetFurniture),
            "other" => Ok(ReportCategory::Other),
            other => Err(format!("unknown report category '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ReportCategory; 8] = [
        ReportCategory::ArchitecturalBarriers,
        ReportCategory::ParksAndGreenery,
        ReportCategory::PublicLighting,
        ReportCategory::RoadsAndSidewalks,
        ReportCategory::Waste,
        ReportCategory::WaterAndSewage,
        ReportCategory::StreetFurniture,
        ReportCategory::Other,
    ];

    #[test]
    fn every_category_has_at_least_two_eligible_roles() {
        for category in ALL {
            assert!(
                category.eligible_roles().len() >= 2,
                "{category} has too few eligible roles"
            );
        }
    }

    #[test]
    fn eligible_roles_are_always_technical() {
        for category in ALL {
            for role in category.eligible_roles() {
                assert!(role.is_technical(), "{category} lists non-technical {role}");
            }
        }
    }

    #[test]
    fn waste_excludes_road_maintenance() {
        let eligible = ReportCategory::Waste.eligible_roles();
        assert!(!eligible.contains(&UserRole::RoadMaintenance));
        assert!(eligible.contains(&UserRole::WasteManagement));
        assert!(eligible.contains(&UserRole::LocalPublicServices));
    }

    #[test]
    fn other_accepts_every_technical_role() {
        let eligible = ReportCategory::Other.eligible_roles();
        for role in UserRole::TECHNICAL {
            assert!(eligible.contains(&role));
        }
        assert!(!eligible.contains(&UserRole::Citizen));
        assert!(!eligible.contains(&UserRole::ExternalMaintainer));
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&ReportCategory::RoadsAndSidewalks).unwrap();
        assert_eq!(json, "\"roads_and_sidewalks\"");
    }

    #[test]
    fn from_str_inverts_display() {
        for category in ALL {
            let parsed: ReportCategory = category.to_string().parse().unwrap();
            assert_eq!(parsed, category);
        }
        assert!("potholes".parse::<ReportCategory>().is_err());
    }
}
