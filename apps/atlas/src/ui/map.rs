//! Map widget seam: the interaction controller only places and removes markers.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, PoisonError,
    },
};

use shared::domain::{Coordinate, MarkerId};
use tracing::{debug, info};

pub trait MapWidget: Send + Sync {
    fn place_marker(&self, at: Coordinate) -> MarkerId;
    fn remove_marker(&self, marker: MarkerId);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
}

/// Headless map for the terminal front end; it only tracks live markers.
pub struct TerminalMap {
    next_marker: AtomicU64,
    markers: Mutex<BTreeMap<MarkerId, Coordinate>>,
}

impl TerminalMap {
    pub fn new(view: MapView) -> Self {
        info!(
            latitude = view.center.latitude,
            longitude = view.center.longitude,
            zoom = view.zoom,
            "map view ready"
        );
        Self {
            next_marker: AtomicU64::new(1),
            markers: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn live_markers(&self) -> Vec<(MarkerId, Coordinate)> {
        self.markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, at)| (*id, *at))
            .collect()
    }
}

impl MapWidget for TerminalMap {
    fn place_marker(&self, at: Coordinate) -> MarkerId {
        let marker = MarkerId(self.next_marker.fetch_add(1, Ordering::Relaxed));
        self.markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(marker, at);
        debug!(
            marker = marker.0,
            latitude = at.latitude,
            longitude = at.longitude,
            "marker placed"
        );
        marker
    }

    fn remove_marker(&self, marker: MarkerId) {
        let removed = self
            .markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&marker);
        debug!(marker = marker.0, found = removed.is_some(), "marker removed");
    }
}
