use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{domain::CountryRecord, error::LookupError, protocol::CountryLookupResponse};
use tracing::{debug, warn};
use url::Url;

use crate::{endpoint_url, transport_error, CountryDirectory};

/// Client for a REST Countries v3.1-compatible service.
#[derive(Debug, Clone)]
pub struct CountryDataClient {
    http: Client,
    base_url: Url,
}

#[derive(Debug, Clone, Copy)]
enum LookupKind {
    Name,
    Alpha,
}

impl LookupKind {
    fn segment(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Alpha => "alpha",
        }
    }
}

impl CountryDataClient {
    pub fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn lookup(&self, kind: LookupKind, key: &str) -> Result<CountryRecord, LookupError> {
        let url = endpoint_url(&self.base_url, &[kind.segment(), key])?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| transport_error("country lookup request failed", err))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::not_found(key));
        }
        if !status.is_success() {
            return Err(LookupError::network(format!(
                "country lookup for '{key}' returned {status}"
            )));
        }

        let body: CountryLookupResponse = response
            .json()
            .await
            .map_err(|err| transport_error("malformed country lookup response", err))?;

        match body {
            CountryLookupResponse::Records(records) => {
                let matches = records.len();
                // First match wins; the service orders results, we do not rank them.
                let record = records
                    .into_iter()
                    .next()
                    .map(CountryRecord::from)
                    .ok_or_else(|| LookupError::not_found(key))?;
                if matches > 1 {
                    debug!(
                        key,
                        matches,
                        chosen = %record.common_name,
                        "country lookup returned several matches"
                    );
                }
                Ok(record)
            }
            CountryLookupResponse::Status(payload)
                if payload.status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Err(LookupError::not_found(key))
            }
            CountryLookupResponse::Status(payload) => {
                warn!(
                    key,
                    status = payload.status,
                    message = payload.message.as_deref().unwrap_or_default(),
                    "country lookup returned an error payload"
                );
                Err(LookupError::network(format!(
                    "country lookup for '{key}' reported status {}",
                    payload.status
                )))
            }
        }
    }
}

#[async_trait]
impl CountryDirectory for CountryDataClient {
    async fn fetch_by_name(&self, name: &str) -> Result<CountryRecord, LookupError> {
        self.lookup(LookupKind::Name, name).await
    }

    async fn fetch_by_code(&self, code: &str) -> Result<CountryRecord, LookupError> {
        self.lookup(LookupKind::Alpha, code).await
    }
}

#[cfg(test)]
#[path = "tests/countries_tests.rs"]
mod tests;
