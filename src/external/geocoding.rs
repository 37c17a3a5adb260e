// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;

/// Fallback shown whenever a coordinate cannot be resolved.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("No geocoding provider configured")]
    Disabled,

    #[error("Geocoding failed: {0}")]
    Provider(String),
}

/// Reverse geocoding collaborator: coordinate pair to display address.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, lat: f64, lng: f64) -> Result<String, GeocodeError>;
}

/// Resolve a photo's location for display. Best-effort: any failure
/// degrades to `UNKNOWN_LOCATION`, never an error to the caller.
pub async fn describe_location(
    geocoder: &dyn ReverseGeocoder,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Option<String> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some(
            geocoder
                .reverse(lat, lng)
                .await
                .unwrap_or_else(|_| UNKNOWN_LOCATION.to_string()),
        ),
        _ => None,
    }
}

/// Used when no provider is configured; every lookup degrades to the
/// fallback string.
pub struct NullGeocoder;

#[async_trait]
impl ReverseGeocoder for NullGeocoder {
    async fn reverse(&self, _lat: f64, _lng: f64) -> Result<String, GeocodeError> {
        Err(GeocodeError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGeocoder(&'static str);

    #[async_trait]
    impl ReverseGeocoder for FixedGeocoder {
        async fn reverse(&self, _lat: f64, _lng: f64) -> Result<String, GeocodeError> {
            Ok(self.0.to_string())
        }
    }

    #[test_log::test(tokio::test)]
    async fn resolves_through_the_provider() {
        let location = describe_location(&FixedGeocoder("Central Park"), Some(40.78), Some(-73.97)).await;
        assert_eq!(location.as_deref(), Some("Central Park"));
    }

    #[test_log::test(tokio::test)]
    async fn failure_degrades_to_unknown_location() {
        let location = describe_location(&NullGeocoder, Some(40.78), Some(-73.97)).await;
        assert_eq!(location.as_deref(), Some(UNKNOWN_LOCATION));
    }

    #[tokio::test]
    async fn missing_coordinates_yield_no_location() {
        assert_eq!(describe_location(&NullGeocoder, Some(40.78), None).await, None);
        assert_eq!(describe_location(&NullGeocoder, None, None).await, None);
    }
}
