use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::geo::{self, Coordinate};

/// The camera the rendering surface should show.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ViewState {
    pub center: Coordinate,
    // always within [5, 13]
    pub zoom: f64,
}

/// Circular boundary around the ground station; recreated, never
/// mutated, when either input changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GeoFence {
    pub center: Coordinate,
    pub radius_m: u32,
}

impl GeoFence {
    pub fn new(center: Coordinate, radius_m: u32) -> Self {
        Self { center, radius_m }
    }

    pub fn ring(&self) -> Vec<Coordinate> {
        geo::circle_polygon(self.center, self.radius_m, geo::DEFAULT_RING_POINTS)
    }
}

/// Marker metadata for the rendering surface; hover and popup behavior
/// is the surface's concern.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Marker {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub position: Coordinate,
}

impl Marker {
    pub fn ground_station(position: Coordinate) -> Self {
        Self {
            id: "ground-station".to_string(),
            label: "Ground Station".to_string(),
            icon: "ground-station.png".to_string(),
            position,
        }
    }

    pub fn satellite(position: Coordinate) -> Self {
        Self {
            id: "satellite".to_string(),
            label: "Satellite".to_string(),
            icon: "satellite.png".to_string(),
            position,
        }
    }
}

/// Consolidated output of one refresh cycle; `track` is empty until the
/// polyline has at least two points.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Scene {
    pub view: ViewState,
    pub fence: GeoFence,
    pub track: Vec<Coordinate>,
    pub markers: Vec<Marker>,
    pub generated_at: DateTime<Utc>,
}
