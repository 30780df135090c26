//! Reverse geocoding: coordinate → human-readable place description.

use crate::core::{config::GeocoderConfig, geo::LatLng};
use async_trait::async_trait;
use serde::Deserialize;

/// The part of a Nominatim `/reverse` response the widget uses.
/// Places Nominatim cannot resolve come back without `display_name`; every
/// other field is ignored, since compatible hosts disagree on their types.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReversePlace {
    #[serde(default)]
    pub display_name: Option<String>,
    /// Nominatim reports "Unable to geocode" here. Kept untyped, it is only logged.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ReversePlace {
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can describe a coordinate
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, position: LatLng) -> Result<ReversePlace, GeocodeError>;
}

/// Client for Nominatim's `/reverse` endpoint.
///
/// One GET per lookup; no timeout, retry or rate limiting.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: reqwest::Client,
    endpoint: String,
    accept_language: Option<String>,
}

impl NominatimClient {
    pub fn new(config: &GeocoderConfig) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            accept_language: config.accept_language.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn query(&self, position: LatLng) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("format", "json".to_string()),
            ("lon", position.lng.to_string()),
            ("lat", position.lat.to_string()),
        ];
        if let Some(language) = &self.accept_language {
            query.push(("accept-language", language.clone()));
        }
        query
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    async fn reverse(&self, position: LatLng) -> Result<ReversePlace, GeocodeError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(position))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Placeholders substituted for a missing or failed description
#[derive(Debug, Clone, Copy)]
pub struct Placeholders<'a> {
    /// The response had no `display_name`
    pub no_data: &'a str,
    /// The lookup failed
    pub not_found: &'a str,
}

/// Collapses a lookup result into popup text. Failures are logged and
/// replaced, never propagated.
pub fn describe(
    result: &Result<ReversePlace, GeocodeError>,
    placeholders: Placeholders<'_>,
) -> String {
    match result {
        Ok(ReversePlace {
            display_name: Some(name),
            ..
        }) if !name.is_empty() => name.clone(),
        Ok(place) => {
            if let Some(error) = &place.error {
                log::debug!("geocoder returned no place: {}", error);
            }
            placeholders.no_data.to_string()
        }
        Err(e) => {
            log::warn!("reverse geocoding failed: {}", e);
            placeholders.not_found.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDERS: Placeholders<'static> = Placeholders {
        no_data: "no data",
        not_found: "not found",
    };

    #[test]
    fn test_parse_nominatim_body() {
        let body = r#"{"place_id":123,"licence":"ODbL","lat":"-6.87","lon":"107.57","display_name":"Jalan Braga, Bandung","address":{"city":"Bandung"}}"#;
        let place: ReversePlace = serde_json::from_str(body).unwrap();
        assert_eq!(place.display_name.as_deref(), Some("Jalan Braga, Bandung"));
    }

    #[test]
    fn test_parse_ignores_foreign_field_types() {
        // LocationIQ and other Nominatim-compatible hosts send ids as strings
        let body = r#"{"place_id":"333946437","osm_id":"1","display_name":"Jalan Braga"}"#;
        let place: ReversePlace = serde_json::from_str(body).unwrap();
        assert_eq!(describe(&Ok(place), PLACEHOLDERS), "Jalan Braga");

        let body = r#"{"error":{"code":404,"message":"Unable to geocode"}}"#;
        let place: ReversePlace = serde_json::from_str(body).unwrap();
        assert!(place.display_name.is_none());
        assert_eq!(describe(&Ok(place), PLACEHOLDERS), "no data");
    }

    #[test]
    fn test_parse_empty_object() {
        let place: ReversePlace = serde_json::from_str("{}").unwrap();
        assert_eq!(place, ReversePlace::default());
    }

    #[test]
    fn test_describe_variants() {
        assert_eq!(describe(&Ok(ReversePlace::named("X")), PLACEHOLDERS), "X");
        assert_eq!(describe(&Ok(ReversePlace::default()), PLACEHOLDERS), "no data");
        assert_eq!(describe(&Ok(ReversePlace::named("")), PLACEHOLDERS), "no data");

        let unable = ReversePlace {
            error: Some(serde_json::Value::from("Unable to geocode")),
            ..ReversePlace::default()
        };
        assert_eq!(describe(&Ok(unable), PLACEHOLDERS), "no data");

        let decode_error = serde_json::from_str::<ReversePlace>("<html>").unwrap_err();
        assert_eq!(
            describe(&Err(GeocodeError::Decode(decode_error)), PLACEHOLDERS),
            "not found"
        );
        assert_eq!(
            describe(
                &Err(GeocodeError::Status(reqwest::StatusCode::TOO_MANY_REQUESTS)),
                PLACEHOLDERS
            ),
            "not found"
        );
    }

    #[test]
    fn test_query_parameters() {
        let config = GeocoderConfig {
            accept_language: Some("id".to_string()),
            ..GeocoderConfig::default()
        };
        let client = NominatimClient::new(&config).unwrap();
        let query = client.query(LatLng::from_lon_lat(107.5, -6.25));
        assert_eq!(
            query,
            vec![
                ("format", "json".to_string()),
                ("lon", "107.5".to_string()),
                ("lat", "-6.25".to_string()),
                ("accept-language", "id".to_string()),
            ]
        );
    }
}
