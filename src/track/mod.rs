use crate::geo::Coordinate;

/// Ordered, deduplicated satellite ground track since engine start.
/// Append-only and unbounded; retention is an open question for long
/// deployments.
#[derive(Debug, Default)]
pub struct TrackAccumulator {
    points: Vec<Coordinate>,
}

impl TrackAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `position` unless it equals the last recorded point.
    /// Returns whether the track grew.
    pub fn ingest(&mut self, position: Coordinate) -> bool {
        if self.points.last() == Some(&position) {
            return false;
        }
        self.points.push(position);
        true
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The track as a renderable line; `None` below two points.
    pub fn polyline(&self) -> Option<&[Coordinate]> {
        (self.points.len() >= 2).then_some(self.points.as_slice())
    }
}
