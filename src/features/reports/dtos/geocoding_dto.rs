use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for the forward-geocoding proxy
#[derive(Debug, Deserialize, IntoParams)]
pub struct GeocodingQuery {
    /// Free-form address query
    pub q: String,
}

/// One forward-geocoding candidate
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GeocodingResultDto {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}
