use serde::{Deserialize, Serialize};

use crate::error::CoordinateError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);
    };
}

id_newtype!(MarkerId);
id_newtype!(PipelineId);

/// A point on the world map, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const MAX_LATITUDE: f64 = 90.0;
    pub const MAX_LONGITUDE: f64 = 180.0;

    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || latitude.abs() > Self::MAX_LATITUDE {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || longitude.abs() > Self::MAX_LONGITUDE {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Builds a coordinate from a raw map click.
    ///
    /// Tile maps keep counting longitude past the antimeridian once the view
    /// has been panned horizontally, so the longitude is wrapped back into
    /// `[-180, 180]` and the latitude clamped to the poles.
    pub fn from_map_click(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }

        let latitude = latitude.clamp(-Self::MAX_LATITUDE, Self::MAX_LATITUDE);
        let longitude = if longitude.abs() <= Self::MAX_LONGITUDE {
            longitude
        } else {
            (longitude + Self::MAX_LONGITUDE).rem_euclid(360.0) - Self::MAX_LONGITUDE
        };
        Self::new(latitude, longitude)
    }
}

/// Basic facts about one country, as displayed in the info panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub common_name: String,
    /// First listed capital; territories such as Antarctica have none.
    pub capital: Option<String>,
    pub population: u64,
    pub region: String,
    pub flag_url: String,
    /// Alpha-3 codes of neighbouring countries, in service order.
    pub border_codes: Vec<String>,
}

impl CountryRecord {
    pub fn has_borders(&self) -> bool {
        !self.border_codes.is_empty()
    }
}
