use crate::core::config::GeocodingConfig;
use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::GeocodingResultDto;
use serde::Deserialize;

/// One entry of a Nominatim search response
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

/// Nominatim reverse response; only the label is used
#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
}

/// Thin proxy over Nominatim for address autocompletion and best-effort
/// reverse geocoding of filed reports.
pub struct GeocodingService {
    client: reqwest::Client,
    base_url: String,
    country_codes: String,
}

impl GeocodingService {
    pub fn new(config: &GeocodingConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(config.user_agent.clone())
                .build()
                .expect("Failed to build HTTP client"),
            base_url: config.base_url.clone(),
            country_codes: config.country_codes.clone(),
        }
    }

    /// Forward-geocode a free-form query, bounded to the configured country.
    pub async fn search(&self, query: &str) -> Result<Vec<GeocodingResultDto>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(AppError::BadRequest(
                "Query parameter q is required".to_string(),
            ));
        }

        let url = format!(
            "{}/search?q={}&format=json&addressdetails=0&limit=5&countrycodes={}",
            self.base_url,
            urlencoding::encode(trimmed),
            self.country_codes
        );

        tracing::debug!("Geocoding search: {} -> {}", trimmed, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("Nominatim request failed: {:?}", e);
            AppError::ExternalServiceError(format!("Nominatim request failed: {e}"))
        })?;

        if !response.status().is_success() {
            tracing::warn!("Nominatim returned status: {}", response.status());
            return Ok(Vec::new());
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Nominatim response: {:?}", e);
            AppError::ExternalServiceError(format!("Failed to parse Nominatim response: {e}"))
        })?;

        Ok(Self::to_results(places))
    }

    /// Reverse-geocode coordinates to an address label. Never fails: any
    /// transport or parse problem is logged and swallowed, because report
    /// creation must not depend on the geocoder being up.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Option<String> {
        let url = format!(
            "{}/reverse?lat={latitude}&lon={longitude}&format=json",
            self.base_url
        );

        let response = match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!("Nominatim reverse returned status: {}", response.status());
                return None;
            }
            Err(e) => {
                tracing::warn!("Nominatim reverse request failed: {:?}", e);
                return None;
            }
        };

        match response.json::<NominatimReverse>().await {
            Ok(reverse) => reverse.display_name,
            Err(e) => {
                tracing::warn!("Failed to parse Nominatim reverse response: {:?}", e);
                None
            }
        }
    }

    /// Entries whose coordinates do not parse are dropped rather than
    /// surfaced as errors.
    fn to_results(places: Vec<NominatimPlace>) -> Vec<GeocodingResultDto> {
        places
            .into_iter()
            .filter_map(|place| {
                let latitude = place.lat.parse().ok()?;
                let longitude = place.lon.parse().ok()?;
                Some(GeocodingResultDto {
                    display_name: place.display_name,
                    latitude,
                    longitude,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_coordinates_are_dropped() {
        let places = vec![
            NominatimPlace {
                lat: "45.0703".to_string(),
                lon: "7.6869".to_string(),
                display_name: "Via Roma, Torino".to_string(),
            },
            NominatimPlace {
                lat: "not-a-number".to_string(),
                lon: "7.6869".to_string(),
                display_name: "Broken entry".to_string(),
            },
        ];

        let results = GeocodingService::to_results(places);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].display_name, "Via Roma, Torino");
        assert!((results[0].latitude - 45.0703).abs() < 1e-9);
    }
}
