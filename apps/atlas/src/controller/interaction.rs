//! Map-click and text-submit pipelines.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

use client_core::{BorderFanOut, BorderResolver, CountryDirectory, ReverseGeocoder};
use shared::{
    domain::{Coordinate, MarkerId, PipelineId},
    error::{LookupError, UserInputError},
};
use tokio::task::JoinHandle;
use tracing::{debug, field, info, info_span, warn, Instrument, Span};

use crate::ui::{
    display::{ElementId, LoadingGuard},
    DisplayController, MapWidget,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Geocoding,
    LookingUpCountry,
    ResolvingBorders,
    Displayed,
    Failed,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Geocoding => "geocoding",
            Self::LookingUpCountry => "looking_up_country",
            Self::ResolvingBorders => "resolving_borders",
            Self::Displayed => "displayed",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug)]
pub enum PipelineOutcome {
    Displayed {
        country: String,
        borders: BorderFanOut,
    },
    Failed {
        stage: PipelineStage,
        error: LookupError,
    },
}

impl PipelineOutcome {
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Displayed { .. } => PipelineStage::Displayed,
            Self::Failed { .. } => PipelineStage::Failed,
        }
    }

    /// Waits for the neighbour lookups this pipeline fired, if any.
    pub async fn settle(self) {
        if let Self::Displayed { borders, .. } = self {
            borders.settle().await;
        }
    }
}

/// Owns the map marker and starts one independent pipeline per user action.
///
/// Pipelines are never cancelled; overlapping ones all write to the same
/// display and the last write wins.
pub struct InteractionController {
    geocoder: Arc<dyn ReverseGeocoder>,
    directory: Arc<dyn CountryDirectory>,
    borders: BorderResolver,
    display: DisplayController,
    map: Arc<dyn MapWidget>,
    marker: Mutex<Option<MarkerId>>,
    next_pipeline: AtomicU64,
}

impl InteractionController {
    pub fn new(
        geocoder: Arc<dyn ReverseGeocoder>,
        directory: Arc<dyn CountryDirectory>,
        display: DisplayController,
        map: Arc<dyn MapWidget>,
    ) -> Arc<Self> {
        Arc::new(Self {
            geocoder,
            borders: BorderResolver::new(Arc::clone(&directory)),
            directory,
            display,
            map,
            marker: Mutex::new(None),
            next_pipeline: AtomicU64::new(1),
        })
    }

    pub fn current_marker(&self) -> Option<MarkerId> {
        *self.marker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn on_map_click(self: &Arc<Self>, coordinate: Coordinate) -> JoinHandle<PipelineOutcome> {
        self.replace_marker(coordinate);
        let span = self.pipeline_span("map_click");
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run_map_pipeline(coordinate).await }.instrument(span))
    }

    /// Reads the country-name input. Blank input is rejected before any
    /// request is made and leaves both panels untouched.
    pub fn on_submit(
        self: &Arc<Self>,
        input: &str,
    ) -> Result<JoinHandle<PipelineOutcome>, UserInputError> {
        let name = input.trim();
        if name.is_empty() {
            info!(
                element = %ElementId::CountryNameInput,
                "empty country name submitted"
            );
            return Err(UserInputError::EmptyCountryName);
        }

        let name = name.to_string();
        let span = self.pipeline_span("text_submit");
        let this = Arc::clone(self);
        Ok(tokio::spawn(
            async move { this.run_lookup_pipeline(name).await }.instrument(span),
        ))
    }

    fn pipeline_span(&self, trigger: &'static str) -> Span {
        let id = PipelineId(self.next_pipeline.fetch_add(1, Ordering::Relaxed));
        info_span!("pipeline", id = id.0, trigger, stage = field::Empty)
    }

    fn replace_marker(&self, coordinate: Coordinate) {
        let mut marker = self.marker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = marker.take() {
            self.map.remove_marker(previous);
        }
        *marker = Some(self.map.place_marker(coordinate));
    }

    async fn run_map_pipeline(&self, coordinate: Coordinate) -> PipelineOutcome {
        let geocoding = self.display.begin_loading();
        enter_stage(PipelineStage::Geocoding);
        let name = match self.geocoder.resolve_country_name(coordinate).await {
            Ok(name) => name,
            Err(error) => return self.fail(PipelineStage::Geocoding, error),
        };
        // Lookup hold first, then release the geocoding one.
        let lookup = self.display.begin_loading();
        drop(geocoding);
        self.lookup_country(name, lookup).await
    }

    async fn run_lookup_pipeline(&self, name: String) -> PipelineOutcome {
        let loading = self.display.begin_loading();
        self.lookup_country(name, loading).await
    }

    async fn lookup_country(&self, name: String, _loading: LoadingGuard) -> PipelineOutcome {
        enter_stage(PipelineStage::LookingUpCountry);
        let record = match self.directory.fetch_by_name(&name).await {
            Ok(record) => record,
            Err(error) => return self.fail(PipelineStage::LookingUpCountry, error),
        };

        self.display.show_country_info(&record);
        enter_stage(PipelineStage::ResolvingBorders);
        let borders = self
            .borders
            .resolve_borders(&record.border_codes, self.display.clone());

        enter_stage(PipelineStage::Displayed);
        info!(
            country = %record.common_name,
            neighbours = borders.len(),
            "country displayed"
        );
        PipelineOutcome::Displayed {
            country: record.common_name,
            borders,
        }
    }

    fn fail(&self, stage: PipelineStage, error: LookupError) -> PipelineOutcome {
        warn!(stage = stage.as_str(), %error, "pipeline stopped");
        enter_stage(PipelineStage::Failed);
        self.display.show_error(error.user_message());
        PipelineOutcome::Failed { stage, error }
    }
}

fn enter_stage(stage: PipelineStage) {
    Span::current().record("stage", stage.as_str());
    debug!(stage = stage.as_str(), "pipeline stage");
}

#[cfg(test)]
#[path = "../tests/interaction_tests.rs"]
mod tests;
