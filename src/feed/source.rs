use std::future::Future;

use serde::Deserialize;
use thiserror::Error;

use crate::geo::{Coordinate, GeoError};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed position payload: {0}")]
    Payload(String),
    #[error("coordinate out of range: {0}")]
    OutOfRange(#[from] GeoError),
}

/// One query endpoint of the external position service.
pub trait PositionSource {
    fn fetch(&self) -> impl Future<Output = Result<Coordinate, FetchError>> + Send;
}

#[derive(Debug, Deserialize)]
struct PositionBody {
    latitude: f64,
    longitude: f64,
}

/// HTTP position source returning `{ "latitude": .., "longitude": .. }`.
#[derive(Debug, Clone)]
pub struct HttpPositionSource {
    client: reqwest::Client,
    url: String,
}

impl HttpPositionSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl PositionSource for HttpPositionSource {
    async fn fetch(&self) -> Result<Coordinate, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let body: PositionBody = response
            .json()
            .await
            .map_err(|e| FetchError::Payload(e.to_string()))?;
        Ok(Coordinate::new(body.latitude, body.longitude)?)
    }
}
