use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::Coordinate,
    error::LookupError,
    protocol::{ReverseGeocodeQuery, ReverseGeocodeResponse},
};
use tracing::debug;
use url::Url;

use crate::{endpoint_url, transport_error, ReverseGeocoder};

/// Client for a Nominatim-compatible `/reverse` endpoint.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: Client,
    base_url: Url,
}

impl GeocodeClient {
    pub fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl ReverseGeocoder for GeocodeClient {
    async fn resolve_country_name(&self, coordinate: Coordinate) -> Result<String, LookupError> {
        let url = endpoint_url(&self.base_url, &["reverse"])?;
        let response = self
            .http
            .get(url)
            .query(&ReverseGeocodeQuery::from(coordinate))
            .send()
            .await
            .map_err(|err| transport_error("reverse geocoding request failed", err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::network(format!(
                "reverse geocoding returned {status}"
            )));
        }

        let body: ReverseGeocodeResponse = response
            .json()
            .await
            .map_err(|err| transport_error("malformed reverse geocoding response", err))?;

        match body.country() {
            Some(country) => {
                debug!(
                    latitude = coordinate.latitude,
                    longitude = coordinate.longitude,
                    country,
                    "reverse geocoded coordinate"
                );
                Ok(country.to_string())
            }
            None => {
                debug!(
                    latitude = coordinate.latitude,
                    longitude = coordinate.longitude,
                    service_error = body.error.as_deref().unwrap_or_default(),
                    "no country at coordinate"
                );
                Err(LookupError::not_found(format!(
                    "country at ({}, {})",
                    coordinate.latitude, coordinate.longitude
                )))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/geocode_tests.rs"]
mod tests;
