//! Wire shapes of the reverse-geocoding and country-data services.

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, CountryRecord};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReverseGeocodeQuery {
    pub format: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl From<Coordinate> for ReverseGeocodeQuery {
    fn from(value: Coordinate) -> Self {
        Self {
            format: "json",
            lat: value.latitude,
            lon: value.longitude,
        }
    }
}

/// Nominatim answers `{"error": "Unable to geocode"}` for points at sea,
/// otherwise an object carrying an `address` block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReverseGeocodeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<GeocodeAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodeAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl ReverseGeocodeResponse {
    pub fn country(&self) -> Option<&str> {
        self.address
            .as_ref()
            .and_then(|address| address.country.as_deref())
            .filter(|country| !country.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountryLookupResponse {
    Records(Vec<CountryPayload>),
    Status(StatusPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryPayload {
    pub name: CountryNamePayload,
    #[serde(default)]
    pub capital: Vec<String>,
    pub population: u64,
    pub region: String,
    pub flags: FlagsPayload,
    #[serde(default)]
    pub borders: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cca3: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryNamePayload {
    pub common: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagsPayload {
    pub png: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl From<CountryPayload> for CountryRecord {
    fn from(value: CountryPayload) -> Self {
        Self {
            common_name: value.name.common,
            capital: value.capital.into_iter().next(),
            population: value.population,
            region: value.region,
            flag_url: value.flags.png,
            border_codes: value.borders,
        }
    }
}
