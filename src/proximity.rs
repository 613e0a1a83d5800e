//! "Near home" check used to gate the gentler nudges.
//!
//! A missing or unreadable location always counts as *not* near home.

use crate::config::{HomeConfig, LocationConfig};
use crate::constants::EARTH_RADIUS_METERS;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Great-circle distance in meters (haversine).
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().min(1.0).asin()
    }
}

pub trait ProximityCheck: Send + Sync {
    fn is_near_home(&self) -> bool;
}

impl<T: ProximityCheck + ?Sized> ProximityCheck for Arc<T> {
    fn is_near_home(&self) -> bool {
        (**self).is_near_home()
    }
}

/// Last known device position, if any.
pub trait LocationSource: Send + Sync {
    fn last_known(&self) -> Option<GeoPoint>;
}

pub struct FixedLocation(pub Option<GeoPoint>);

impl LocationSource for FixedLocation {
    fn last_known(&self) -> Option<GeoPoint> {
        self.0
    }
}

/// Reads `{"latitude": .., "longitude": ..}` from a file on every query.
pub struct LocationFile {
    path: PathBuf,
}

impl LocationFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl LocationSource for LocationFile {
    fn last_known(&self) -> Option<GeoPoint> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                debug!("Location file {} unavailable: {e}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(point) => Some(point),
            Err(e) => {
                debug!("Location file {} unparseable: {e}", self.path.display());
                None
            }
        }
    }
}

pub struct HomeProximity {
    home: GeoPoint,
    radius_m: f64,
    source: Box<dyn LocationSource>,
}

impl HomeProximity {
    pub fn new(home: &HomeConfig, source: Box<dyn LocationSource>) -> Self {
        Self {
            home: GeoPoint {
                latitude: home.latitude,
                longitude: home.longitude,
            },
            radius_m: home.radius_m,
            source,
        }
    }

    /// Build from config: a location file wins over a fixed point.
    pub fn from_config(home: &HomeConfig, location: &LocationConfig) -> Self {
        let source: Box<dyn LocationSource> = match &location.file {
            Some(path) => Box::new(LocationFile::new(path.clone())),
            None => Box::new(FixedLocation(location.fixed)),
        };
        Self::new(home, source)
    }

    /// Distance to home, `None` when no location is known.
    pub fn distance_from_home(&self) -> Option<f64> {
        let Some(location) = self.source.last_known() else {
            debug!("Location not found");
            return None;
        };
        let distance = location.distance_to(&self.home);
        debug!("Current distance to home: {distance:.1}m");
        Some(distance)
    }
}

impl ProximityCheck for HomeProximity {
    fn is_near_home(&self) -> bool {
        self.distance_from_home()
            .is_some_and(|distance| distance <= self.radius_m)
    }
}
