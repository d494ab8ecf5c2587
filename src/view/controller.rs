use chrono::Utc;

use super::scene::{GeoFence, Marker, Scene, ViewState};
use crate::feed::{Entity, FeedEvent};
use crate::geo::{self, Coordinate};
use crate::render::{LayerGeometry, LayerStyle, RenderError, RenderSurface};
use crate::track::TrackAccumulator;

pub const FENCE_LAYER_ID: &str = "geofence";
pub const TRACK_LAYER_ID: &str = "ground-track";

const FENCE_FILL_COLOR: &str = "#FF0000";
const FENCE_FILL_OPACITY: f64 = 0.35;
const TRACK_LINE_COLOR: &str = "#0000FF";
const TRACK_LINE_WIDTH: f64 = 3.0;

/// Turns feed events and radius requests into scenes on the rendering
/// surface. Loading (no scene) until both entity positions are known.
pub struct ViewController<R> {
    surface: R,
    radius_m: u32,
    station: Option<Coordinate>,
    satellite: Option<Coordinate>,
    track: TrackAccumulator,
    scene: Option<Scene>,
}

impl<R: RenderSurface> ViewController<R> {
    pub fn new(surface: R, default_radius_m: u32) -> Self {
        Self {
            surface,
            radius_m: geo::clamp_radius(i64::from(default_radius_m)),
            station: None,
            satellite: None,
            track: TrackAccumulator::new(),
            scene: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.station.is_some() && self.satellite.is_some()
    }

    pub fn radius_m(&self) -> u32 {
        self.radius_m
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn observe(&mut self, event: FeedEvent) -> Result<Option<Scene>, RenderError> {
        let FeedEvent::Moved { entity, position } = event;
        match entity {
            Entity::GroundStation => self.station = Some(position),
            Entity::Satellite => self.satellite = Some(position),
        }
        match (self.station, self.satellite) {
            (Some(station), Some(satellite)) => self.refresh(station, satellite).map(Some),
            _ => Ok(None),
        }
    }

    /// Radius changes rebuild only the fence; the camera and track are
    /// left untouched.
    pub fn set_radius(&mut self, requested_m: i64) -> Result<Option<Scene>, RenderError> {
        self.radius_m = geo::clamp_radius(requested_m);
        let Some(station) = self.station else {
            return Ok(None);
        };
        let Some(scene) = self.scene.as_mut() else {
            return Ok(None);
        };

        let fence = GeoFence::new(station, self.radius_m);
        scene.fence = fence;
        scene.generated_at = Utc::now();

        self.surface.upsert_layer(
            FENCE_LAYER_ID,
            LayerGeometry::Polygon(fence.ring()),
            &LayerStyle::fill(FENCE_FILL_COLOR, FENCE_FILL_OPACITY),
        )?;
        Ok(self.scene.clone())
    }

    // Full refresh cycle: state is committed before any surface write, so a
    // failed write can be retried without recomputation.
    fn refresh(
        &mut self,
        station: Coordinate,
        satellite: Coordinate,
    ) -> Result<Scene, RenderError> {
        let fence = GeoFence::new(station, self.radius_m);
        self.track.ingest(satellite);
        let view = ViewState {
            center: station,
            zoom: geo::zoom_for_distance(geo::distance_km(station, satellite)),
        };
        let markers = vec![Marker::ground_station(station), Marker::satellite(satellite)];
        let scene = Scene {
            view,
            fence,
            track: self
                .track
                .polyline()
                .map(<[Coordinate]>::to_vec)
                .unwrap_or_default(),
            markers: markers.clone(),
            generated_at: Utc::now(),
        };
        self.scene = Some(scene.clone());
        log::debug!(
            "refreshed scene: zoom {:.2}, track {} points",
            view.zoom,
            self.track.len()
        );

        self.surface.set_view_state(&view)?;
        for marker in &markers {
            self.surface.upsert_marker(marker)?;
        }
        self.surface.upsert_layer(
            FENCE_LAYER_ID,
            LayerGeometry::Polygon(fence.ring()),
            &LayerStyle::fill(FENCE_FILL_COLOR, FENCE_FILL_OPACITY),
        )?;
        if let Some(points) = self.track.polyline() {
            self.surface.upsert_layer(
                TRACK_LAYER_ID,
                LayerGeometry::Line(points.to_vec()),
                &LayerStyle::line(TRACK_LINE_COLOR, TRACK_LINE_WIDTH),
            )?;
        }
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        views: Vec<ViewState>,
        markers: Vec<Marker>,
        layers: Vec<(String, LayerGeometry)>,
        fail_layers: Arc<AtomicBool>,
    }

    impl RenderSurface for RecordingSurface {
        fn set_view_state(&mut self, view: &ViewState) -> Result<(), RenderError> {
            self.views.push(*view);
            Ok(())
        }

        fn upsert_marker(&mut self, marker: &Marker) -> Result<(), RenderError> {
            self.markers.push(marker.clone());
            Ok(())
        }

        fn upsert_layer(
            &mut self,
            id: &str,
            geometry: LayerGeometry,
            _style: &LayerStyle,
        ) -> Result<(), RenderError> {
            if self.fail_layers.load(Ordering::SeqCst) {
                return Err(RenderError::Rejected {
                    kind: "layer",
                    id: id.to_string(),
                    reason: "injected failure".to_string(),
                });
            }
            self.layers.push((id.to_string(), geometry));
            Ok(())
        }
    }

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn moved(entity: Entity, lat: f64, lon: f64) -> FeedEvent {
        FeedEvent::Moved {
            entity,
            position: coord(lat, lon),
        }
    }

    fn controller() -> ViewController<RecordingSurface> {
        ViewController::new(RecordingSurface::default(), 1000)
    }

    #[test]
    fn no_scene_while_loading() {
        let mut c = controller();
        let scene = c
            .observe(moved(Entity::GroundStation, 10.0, 10.0))
            .unwrap();
        assert!(scene.is_none());
        assert!(!c.is_ready());
        assert!(c.surface().views.is_empty());
    }

    #[test]
    fn set_radius_while_loading_stores_but_emits_nothing() {
        let mut c = controller();
        assert!(c.set_radius(300).unwrap().is_none());
        assert_eq!(c.radius_m(), 300);
        assert!(c.scene().is_none());

        // clamped even while loading
        assert!(c.set_radius(50).unwrap().is_none());
        assert_eq!(c.radius_m(), 100);
        assert!(c.surface().layers.is_empty());
    }

    #[test]
    fn colocated_entities_give_zoom_13_and_fence_at_station() {
        let mut c = controller();
        c.observe(moved(Entity::GroundStation, 0.0, 0.0)).unwrap();
        let scene = c
            .observe(moved(Entity::Satellite, 0.0, 0.0))
            .unwrap()
            .unwrap();

        assert_eq!(scene.view.zoom, 13.0);
        assert_eq!(scene.view.center, coord(0.0, 0.0));
        assert_eq!(scene.fence.center, coord(0.0, 0.0));
        assert_eq!(scene.fence.radius_m, 1000);
        assert!(scene.track.is_empty(), "single point is not a polyline");
        assert_eq!(scene.markers.len(), 2);
    }

    #[test]
    fn distant_satellite_clamps_zoom_to_5() {
        let mut c = controller();
        c.observe(moved(Entity::GroundStation, 10.0, 10.0)).unwrap();
        let scene = c
            .observe(moved(Entity::Satellite, 10.0, 11.0))
            .unwrap()
            .unwrap();

        // ~110 km apart, so 13 - d/10 falls below the floor
        assert_eq!(scene.view.zoom, 5.0);
    }

    #[test]
    fn track_layer_appears_after_second_distinct_position() {
        let mut c = controller();
        c.observe(moved(Entity::GroundStation, 10.0, 10.0)).unwrap();
        c.observe(moved(Entity::Satellite, 10.0, 10.5)).unwrap();
        assert!(!c
            .surface()
            .layers
            .iter()
            .any(|(id, _)| id == TRACK_LAYER_ID));

        let scene = c
            .observe(moved(Entity::Satellite, 10.0, 10.6))
            .unwrap()
            .unwrap();
        assert_eq!(scene.track.len(), 2);
        assert!(c
            .surface()
            .layers
            .iter()
            .any(|(id, _)| id == TRACK_LAYER_ID));
    }

    #[test]
    fn reobserving_the_same_satellite_position_adds_no_track_point() {
        let mut c = controller();
        c.observe(moved(Entity::GroundStation, 10.0, 10.0)).unwrap();
        c.observe(moved(Entity::Satellite, 10.0, 10.5)).unwrap();
        c.observe(moved(Entity::Satellite, 10.0, 10.6)).unwrap();
        let scene = c
            .observe(moved(Entity::Satellite, 10.0, 10.6))
            .unwrap()
            .unwrap();
        assert_eq!(scene.track.len(), 2);
    }

    #[test]
    fn radius_change_rebuilds_only_the_fence() {
        let mut c = controller();
        c.observe(moved(Entity::GroundStation, 10.0, 10.0)).unwrap();
        c.observe(moved(Entity::Satellite, 10.0, 10.5)).unwrap();
        let views_before = c.surface().views.len();
        let track_before = c.scene().unwrap().track.len();

        let scene = c.set_radius(7000).unwrap().unwrap();
        assert_eq!(scene.fence.radius_m, 5000);
        assert_eq!(c.surface().views.len(), views_before, "camera untouched");
        assert_eq!(scene.track.len(), track_before, "track untouched");

        let scene = c.set_radius(50).unwrap().unwrap();
        assert_eq!(scene.fence.radius_m, 100);
    }

    #[test]
    fn fence_recenters_when_the_station_moves() {
        let mut c = controller();
        c.observe(moved(Entity::GroundStation, 10.0, 10.0)).unwrap();
        c.observe(moved(Entity::Satellite, 10.0, 10.5)).unwrap();
        let scene = c
            .observe(moved(Entity::GroundStation, 11.0, 10.0))
            .unwrap()
            .unwrap();
        assert_eq!(scene.fence.center, coord(11.0, 10.0));
        assert_eq!(scene.view.center, coord(11.0, 10.0));
    }

    #[test]
    fn surface_failure_keeps_computed_state_for_retry() {
        let fail = Arc::new(AtomicBool::new(true));
        let surface = RecordingSurface {
            fail_layers: fail.clone(),
            ..RecordingSurface::default()
        };
        let mut c = ViewController::new(surface, 1000);

        c.observe(moved(Entity::GroundStation, 0.0, 0.0)).unwrap();
        let result = c.observe(moved(Entity::Satellite, 0.0, 0.1));
        assert!(result.is_err());

        // the scene was computed and kept despite the failed write
        let scene = c.scene().unwrap();
        assert_eq!(scene.fence.center, coord(0.0, 0.0));

        // the render step alone can be retried
        fail.store(false, Ordering::SeqCst);
        let scene = c.set_radius(1000).unwrap().unwrap();
        assert_eq!(scene.fence.radius_m, 1000);
        assert!(c
            .surface()
            .layers
            .iter()
            .any(|(id, _)| id == FENCE_LAYER_ID));
    }
}
