mod controller;
mod scene;

pub use controller::{ViewController, FENCE_LAYER_ID, TRACK_LAYER_ID};
pub use scene::{GeoFence, Marker, Scene, ViewState};
