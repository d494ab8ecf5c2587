use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::geo::Coordinate;
use crate::view::{Marker, ViewState};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface rejected {kind} '{id}': {reason}")]
    Rejected {
        kind: &'static str,
        id: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerGeometry {
    Polygon(Vec<Coordinate>),
    Line(Vec<Coordinate>),
}

/// Paint properties, serialized with Mapbox-style kebab-case keys.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayerStyle {
    #[serde(rename = "fill-color", skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(rename = "fill-opacity", skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    #[serde(rename = "line-color", skip_serializing_if = "Option::is_none")]
    pub line_color: Option<String>,
    #[serde(rename = "line-width", skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
}

impl LayerStyle {
    pub fn fill(color: &str, opacity: f64) -> Self {
        Self {
            fill_color: Some(color.to_string()),
            fill_opacity: Some(opacity),
            ..Self::default()
        }
    }

    pub fn line(color: &str, width: f64) -> Self {
        Self {
            line_color: Some(color.to_string()),
            line_width: Some(width),
            ..Self::default()
        }
    }
}

/// The map-drawing collaborator. Upserting an existing layer id replaces
/// its geometry in place.
pub trait RenderSurface {
    fn set_view_state(&mut self, view: &ViewState) -> Result<(), RenderError>;

    fn upsert_marker(&mut self, marker: &Marker) -> Result<(), RenderError>;

    fn upsert_layer(
        &mut self,
        id: &str,
        geometry: LayerGeometry,
        style: &LayerStyle,
    ) -> Result<(), RenderError>;

    // Current drawable document, if the surface materializes one.
    fn document(&self) -> Option<serde_json::Value> {
        None
    }
}

/// In-memory surface keeping the scene as a GeoJSON-flavored document.
#[derive(Debug, Default)]
pub struct GeoJsonSurface {
    camera: Option<serde_json::Value>,
    markers: BTreeMap<String, serde_json::Value>,
    layers: BTreeMap<String, serde_json::Value>,
}

impl GeoJsonSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

// GeoJSON positions are [longitude, latitude].
fn lon_lat(c: &Coordinate) -> serde_json::Value {
    json!([c.longitude, c.latitude])
}

impl RenderSurface for GeoJsonSurface {
    fn set_view_state(&mut self, view: &ViewState) -> Result<(), RenderError> {
        self.camera = Some(json!({
            "center": lon_lat(&view.center),
            "zoom": view.zoom,
        }));
        Ok(())
    }

    fn upsert_marker(&mut self, marker: &Marker) -> Result<(), RenderError> {
        self.markers.insert(
            marker.id.clone(),
            json!({
                "id": marker.id,
                "label": marker.label,
                "icon": marker.icon,
                "coordinates": lon_lat(&marker.position),
            }),
        );
        Ok(())
    }

    fn upsert_layer(
        &mut self,
        id: &str,
        geometry: LayerGeometry,
        style: &LayerStyle,
    ) -> Result<(), RenderError> {
        let geometry = match geometry {
            LayerGeometry::Polygon(ring) => json!({
                "type": "Polygon",
                "coordinates": [ring.iter().map(lon_lat).collect::<Vec<_>>()],
            }),
            LayerGeometry::Line(points) => json!({
                "type": "LineString",
                "coordinates": points.iter().map(lon_lat).collect::<Vec<_>>(),
            }),
        };
        self.layers.insert(
            id.to_string(),
            json!({
                "id": id,
                "type": "Feature",
                "geometry": geometry,
                "properties": { "paint": style },
            }),
        );
        Ok(())
    }

    fn document(&self) -> Option<serde_json::Value> {
        Some(json!({
            "camera": self.camera,
            "markers": self.markers.values().collect::<Vec<_>>(),
            "layers": self.layers.values().collect::<Vec<_>>(),
        }))
    }
}
