use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Coordinate, CountryRecord},
    error::LookupError,
};
use thiserror::Error;
use url::Url;

mod borders;
mod countries;
mod geocode;

pub use borders::{BorderFanOut, BorderResolver, BorderSink};
pub use countries::CountryDataClient;
pub use geocode::GeocodeClient;

pub const DEFAULT_GEOCODE_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_COUNTRIES_BASE_URL: &str = "https://restcountries.com/v3.1";
pub const DEFAULT_USER_AGENT: &str = concat!("country-atlas/", env!("CARGO_PKG_VERSION"));

/// Resolves a map coordinate to the name of the country containing it.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn resolve_country_name(&self, coordinate: Coordinate) -> Result<String, LookupError>;
}

/// Looks up country records by common name or alpha code.
#[async_trait]
pub trait CountryDirectory: Send + Sync {
    async fn fetch_by_name(&self, name: &str) -> Result<CountryRecord, LookupError>;
    async fn fetch_by_code(&self, code: &str) -> Result<CountryRecord, LookupError>;
}

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid {service} base url '{url}': {source}")]
    InvalidBaseUrl {
        service: &'static str,
        url: String,
        source: url::ParseError,
    },
    #[error("{service} base url '{url}' cannot carry path segments")]
    CannotBeABase { service: &'static str, url: String },
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub geocode_base_url: String,
    pub countries_base_url: String,
    pub user_agent: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            geocode_base_url: DEFAULT_GEOCODE_BASE_URL.into(),
            countries_base_url: DEFAULT_COUNTRIES_BASE_URL.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

impl ServiceEndpoints {
    /// Builds both service clients over one shared connection pool.
    pub fn connect(&self) -> Result<(GeocodeClient, CountryDataClient), EndpointError> {
        let http = Client::builder().user_agent(&self.user_agent).build()?;
        let geocode_base = parse_base_url("reverse geocoding", &self.geocode_base_url)?;
        let countries_base = parse_base_url("country data", &self.countries_base_url)?;
        Ok((
            GeocodeClient::new(http.clone(), geocode_base),
            CountryDataClient::new(http, countries_base),
        ))
    }
}

fn parse_base_url(service: &'static str, raw: &str) -> Result<Url, EndpointError> {
    let url = Url::parse(raw.trim()).map_err(|source| EndpointError::InvalidBaseUrl {
        service,
        url: raw.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(EndpointError::CannotBeABase {
            service,
            url: raw.to_string(),
        });
    }
    Ok(url)
}

/// Appends percent-encoded path segments to `base`, keeping any path prefix
/// such as `/v3.1`.
fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, LookupError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| LookupError::network(format!("base url {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn transport_error(context: &str, err: reqwest::Error) -> LookupError {
    LookupError::network(format!("{context}: {err}"))
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
