use std::sync::Arc;

use futures::future::join_all;
use shared::{domain::CountryRecord, error::LookupError};
use tokio::task::JoinHandle;
use tracing::{debug, info_span, warn, Instrument};

use crate::CountryDirectory;

/// Receives the outcome of each neighbour lookup as it settles.
///
/// Calls arrive from independent tasks in whatever order the network
/// answers; implementations must not assume `border_codes` order.
pub trait BorderSink: Send + Sync + 'static {
    fn no_bordering_countries(&self);
    /// Called once before any neighbour lookup is issued.
    fn begin_bordering_countries(&self);
    fn bordering_country_resolved(&self, code: &str, record: CountryRecord);
    fn bordering_country_failed(&self, code: &str, error: &LookupError);
}

/// Handles of the lookups spawned for one country's neighbours.
///
/// Dropping it detaches the tasks; they still run to completion.
#[derive(Debug)]
pub enum BorderFanOut {
    NoBorders,
    Spawned(Vec<JoinHandle<()>>),
}

impl BorderFanOut {
    pub fn len(&self) -> usize {
        match self {
            Self::NoBorders => 0,
            Self::Spawned(handles) => handles.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waits for every spawned lookup. The pipeline itself never does this;
    /// it is for callers that must not exit before the panel fills in.
    pub async fn settle(self) {
        let Self::Spawned(handles) = self else {
            return;
        };
        for result in join_all(handles).await {
            if let Err(err) = result {
                warn!(%err, "border lookup task did not complete");
            }
        }
    }
}

#[derive(Clone)]
pub struct BorderResolver {
    directory: Arc<dyn CountryDirectory>,
}

impl BorderResolver {
    pub fn new(directory: Arc<dyn CountryDirectory>) -> Self {
        Self { directory }
    }

    /// Fires one independent `fetch_by_code` per neighbour. Failures are
    /// reported per code and never cancel sibling lookups.
    pub fn resolve_borders<S>(&self, border_codes: &[String], sink: S) -> BorderFanOut
    where
        S: BorderSink + Clone,
    {
        if border_codes.is_empty() {
            debug!("country has no bordering countries");
            sink.no_bordering_countries();
            return BorderFanOut::NoBorders;
        }

        sink.begin_bordering_countries();
        let handles = border_codes
            .iter()
            .cloned()
            .map(|code| {
                let directory = Arc::clone(&self.directory);
                let sink = sink.clone();
                let span = info_span!("border_lookup", code = %code);
                tokio::spawn(
                    async move {
                        match directory.fetch_by_code(&code).await {
                            Ok(record) => {
                                debug!(country = %record.common_name, "bordering country resolved");
                                sink.bordering_country_resolved(&code, record);
                            }
                            Err(err) => {
                                warn!(%err, "bordering country lookup failed");
                                sink.bordering_country_failed(&code, &err);
                            }
                        }
                    }
                    .instrument(span),
                )
            })
            .collect();

        BorderFanOut::Spawned(handles)
    }
}

#[cfg(test)]
#[path = "tests/borders_tests.rs"]
mod tests;
