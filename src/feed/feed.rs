use super::source::{FetchError, PositionSource};
use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    GroundStation,
    Satellite,
}

impl Entity {
    pub fn label(&self) -> &'static str {
        match self {
            Entity::GroundStation => "ground station",
            Entity::Satellite => "satellite",
        }
    }
}

/// Emitted when an entity's coordinate differs from the previously held
/// one; unchanged positions emit nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedEvent {
    Moved {
        entity: Entity,
        position: Coordinate,
    },
}

/// Latest known coordinate for each entity, written only by `poll`.
pub struct PositionFeed<G, S> {
    ground_station: G,
    satellite: S,
    station_slot: Option<Coordinate>,
    satellite_slot: Option<Coordinate>,
}

impl<G: PositionSource, S: PositionSource> PositionFeed<G, S> {
    pub fn new(ground_station: G, satellite: S) -> Self {
        Self {
            ground_station,
            satellite,
            station_slot: None,
            satellite_slot: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.station_slot.is_some() && self.satellite_slot.is_some()
    }

    /// Fetches both entities concurrently; a failed fetch leaves the
    /// prior slot untouched and never blocks the other entity.
    pub async fn poll(&mut self) -> Vec<FeedEvent> {
        let (station, satellite) =
            tokio::join!(self.ground_station.fetch(), self.satellite.fetch());

        let mut events = Vec::with_capacity(2);
        if let Some(event) = apply(Entity::GroundStation, &mut self.station_slot, station) {
            events.push(event);
        }
        if let Some(event) = apply(Entity::Satellite, &mut self.satellite_slot, satellite) {
            events.push(event);
        }
        events
    }
}

fn apply(
    entity: Entity,
    slot: &mut Option<Coordinate>,
    fetched: Result<Coordinate, FetchError>,
) -> Option<FeedEvent> {
    match fetched {
        Ok(position) => {
            let changed = *slot != Some(position);
            *slot = Some(position);
            changed.then_some(FeedEvent::Moved { entity, position })
        }
        Err(err) => {
            log::warn!("{} position fetch failed: {}", entity.label(), err);
            None
        }
    }
}
