use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const COUNTRY_NOT_FOUND_MESSAGE: &str = "Country not found.";
pub const FETCH_FAILED_MESSAGE: &str = "An error occurred while fetching the data.";
pub const BORDER_FETCH_FAILED_MESSAGE: &str =
    "An error occurred while fetching bordering countries.";
pub const NO_BORDERING_COUNTRIES_MESSAGE: &str = "No bordering countries found.";
pub const EMPTY_COUNTRY_NAME_PROMPT: &str = "Please enter a country name.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Network,
}

/// Failure of a single upstream lookup. Every failure is terminal for the
/// request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no match for {subject}")]
    NotFound { subject: String },
    #[error("network error: {detail}")]
    Network { detail: String },
}

impl LookupError {
    pub fn not_found(subject: impl Into<String>) -> Self {
        Self::NotFound {
            subject: subject.into(),
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network {
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Network { .. } => ErrorCode::Network,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == ErrorCode::NotFound
    }

    /// Text shown in the country-info panel when a pipeline stops on this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => COUNTRY_NOT_FOUND_MESSAGE,
            Self::Network { .. } => FETCH_FAILED_MESSAGE,
        }
    }
}

/// Rejected user input; surfaced as a prompt, never through the error panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UserInputError {
    #[error("Please enter a country name.")]
    EmptyCountryName,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}
