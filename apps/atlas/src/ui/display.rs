//! Display state for the three output regions and the writes pipelines make to it.

use std::{
    fmt,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use clap::ValueEnum;
use client_core::BorderSink;
use serde::Deserialize;
use shared::{
    domain::CountryRecord,
    error::{LookupError, BORDER_FETCH_FAILED_MESSAGE},
};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

const DISPLAY_EVENT_CAPACITY: usize = 256;

/// Stable identifiers of the page elements the controllers address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    LoadingIndicator,
    CountryInfo,
    BorderingCountries,
    CountryNameInput,
    SubmitControl,
}

impl ElementId {
    pub fn dom_id(self) -> &'static str {
        match self {
            Self::LoadingIndicator => "loading",
            Self::CountryInfo => "country-info",
            Self::BorderingCountries => "bordering-countries",
            Self::CountryNameInput => "country-name",
            Self::SubmitControl => "submit-button",
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_id())
    }
}

/// How overlapping pipelines share the loading indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LoadingPolicy {
    /// Every hide turns the indicator off, even while other pipelines are
    /// still in flight.
    Unconditional,
    /// The indicator stays on until every pipeline that showed it has hidden it.
    #[default]
    Counted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown loading policy '{0}', expected 'unconditional' or 'counted'")]
pub struct UnknownLoadingPolicy(String);

impl FromStr for LoadingPolicy {
    type Err = UnknownLoadingPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unconditional" => Ok(Self::Unconditional),
            "counted" => Ok(Self::Counted),
            other => Err(UnknownLoadingPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CountryInfoPanel {
    #[default]
    Empty,
    Country(CountryRecord),
    Error(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorderListing {
    /// In arrival order.
    pub entries: Vec<CountryRecord>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BorderingPanel {
    #[default]
    Empty,
    NoBorders,
    Listing(BorderListing),
}

#[cfg(test)]
impl BorderingPanel {
    pub fn entries(&self) -> &[CountryRecord] {
        match self {
            Self::Listing(listing) => &listing.entries,
            Self::Empty | Self::NoBorders => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub loading_visible: bool,
    pub loading_in_flight: usize,
    pub country_info: CountryInfoPanel,
    pub bordering: BorderingPanel,
    /// Bumped on every write.
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayChange {
    Loading { visible: bool },
    CountryInfo(CountryRecord),
    Error(String),
    BorderingHeader,
    BorderingEntry(CountryRecord),
    NoBorderingCountries,
    BorderingError(String),
}

impl DisplayChange {
    pub fn element(&self) -> ElementId {
        match self {
            Self::Loading { .. } => ElementId::LoadingIndicator,
            Self::CountryInfo(_) | Self::Error(_) => ElementId::CountryInfo,
            Self::BorderingHeader
            | Self::BorderingEntry(_)
            | Self::NoBorderingCountries
            | Self::BorderingError(_) => ElementId::BorderingCountries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUpdate {
    pub revision: u64,
    pub change: DisplayChange,
}

/// Shared handle to the display surface. Clones write to the same state.
#[derive(Clone)]
pub struct DisplayController {
    policy: LoadingPolicy,
    state: Arc<Mutex<DisplayState>>,
    events: broadcast::Sender<DisplayUpdate>,
}

impl DisplayController {
    pub fn new(policy: LoadingPolicy) -> Self {
        let (events, _) = broadcast::channel(DISPLAY_EVENT_CAPACITY);
        Self {
            policy,
            state: Arc::new(Mutex::new(DisplayState::default())),
            events,
        }
    }

    pub fn snapshot(&self) -> DisplayState {
        self.lock().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DisplayUpdate> {
        self.events.subscribe()
    }

    /// Shows the indicator until the returned guard drops.
    #[must_use = "dropping the guard hides the loading indicator immediately"]
    pub fn begin_loading(&self) -> LoadingGuard {
        self.show_loading();
        LoadingGuard {
            display: self.clone(),
        }
    }

    pub fn show_loading(&self) {
        self.write(|state| {
            state.loading_in_flight += 1;
            let was_visible = std::mem::replace(&mut state.loading_visible, true);
            (!was_visible).then_some(DisplayChange::Loading { visible: true })
        });
    }

    pub fn hide_loading(&self) {
        let policy = self.policy;
        self.write(|state| {
            state.loading_in_flight = state.loading_in_flight.saturating_sub(1);
            let visible = match policy {
                LoadingPolicy::Unconditional => false,
                LoadingPolicy::Counted => state.loading_in_flight > 0,
            };
            let was_visible = std::mem::replace(&mut state.loading_visible, visible);
            (was_visible != visible).then_some(DisplayChange::Loading { visible })
        });
    }

    /// Replaces both panels with a single message.
    pub fn show_error(&self, message: &str) {
        self.write(|state| {
            state.country_info = CountryInfoPanel::Error(message.to_string());
            state.bordering = BorderingPanel::Empty;
            Some(DisplayChange::Error(message.to_string()))
        });
    }

    pub fn show_country_info(&self, record: &CountryRecord) {
        self.write(|state| {
            state.country_info = CountryInfoPanel::Country(record.clone());
            Some(DisplayChange::CountryInfo(record.clone()))
        });
    }

    /// Header write; clears whatever the bordering panel held.
    pub fn begin_bordering_countries(&self) {
        self.write(|state| {
            state.bordering = BorderingPanel::Listing(BorderListing::default());
            Some(DisplayChange::BorderingHeader)
        });
    }

    pub fn append_bordering_country(&self, record: CountryRecord) {
        self.write(|state| {
            if !matches!(state.bordering, BorderingPanel::Listing(_)) {
                // Another pipeline replaced the panel after our header; the
                // entry still lands, appended onto whatever is there.
                debug!(country = %record.common_name, "appending without a header");
                state.bordering = BorderingPanel::Listing(BorderListing::default());
            }
            if let BorderingPanel::Listing(listing) = &mut state.bordering {
                listing.entries.push(record.clone());
            }
            Some(DisplayChange::BorderingEntry(record))
        });
    }

    /// Writes the no-neighbours message into the bordering panel only; the
    /// country-info panel keeps the record that was just shown.
    pub fn show_no_bordering_countries(&self) {
        self.write(|state| {
            state.bordering = BorderingPanel::NoBorders;
            Some(DisplayChange::NoBorderingCountries)
        });
    }

    /// One neighbour failed; siblings and the info panel are left alone.
    pub fn show_bordering_error(&self, message: &str) {
        self.write(|state| {
            match &mut state.bordering {
                BorderingPanel::Listing(listing) => listing.errors.push(message.to_string()),
                panel => {
                    *panel = BorderingPanel::Listing(BorderListing {
                        entries: Vec::new(),
                        errors: vec![message.to_string()],
                    })
                }
            }
            Some(DisplayChange::BorderingError(message.to_string()))
        });
    }

    fn lock(&self) -> MutexGuard<'_, DisplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, apply: impl FnOnce(&mut DisplayState) -> Option<DisplayChange>) {
        let update = {
            let mut state = self.lock();
            state.revision += 1;
            let revision = state.revision;
            apply(&mut *state).map(|change| DisplayUpdate { revision, change })
        };
        if let Some(update) = update {
            // No subscriber is fine; the state itself is the source of truth.
            let _ = self.events.send(update);
        }
    }
}

/// Hides the loading indicator when dropped, on success and failure alike.
pub struct LoadingGuard {
    display: DisplayController,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.display.hide_loading();
    }
}

impl BorderSink for DisplayController {
    fn no_bordering_countries(&self) {
        self.show_no_bordering_countries();
    }

    fn begin_bordering_countries(&self) {
        self.begin_bordering_countries();
    }

    fn bordering_country_resolved(&self, _code: &str, record: CountryRecord) {
        self.append_bordering_country(record);
    }

    fn bordering_country_failed(&self, code: &str, error: &LookupError) {
        debug!(code, %error, "bordering country failed");
        self.show_bordering_error(BORDER_FETCH_FAILED_MESSAGE);
    }
}

#[cfg(test)]
#[path = "../tests/display_tests.rs"]
mod tests;
