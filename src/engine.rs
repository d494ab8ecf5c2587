use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::feed::{PositionFeed, PositionSource};
use crate::geo;
use crate::render::RenderSurface;
use crate::view::{Scene, ViewController};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine already running")]
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    Loading,
    Ready,
}

#[derive(Debug, Clone)]
pub struct EngineStatus {
    pub mode: EngineMode,
    pub radius_m: u32,
    pub render_failures: u64,
    pub scene: Option<Scene>,
}

#[derive(Debug)]
struct Shared {
    status: EngineStatus,
    map: Option<serde_json::Value>,
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Worker task owning feed, controller and surface; publishes status
/// into a shared block for the web layer.
pub struct Engine {
    shared: Arc<StdMutex<Shared>>,
    radius_tx: mpsc::UnboundedSender<u32>,
    radius_rx: Option<mpsc::UnboundedReceiver<u32>>,
    worker: Option<WorkerHandle>,
}

impl Engine {
    pub fn new(default_radius_m: u32) -> Self {
        let (radius_tx, radius_rx) = mpsc::unbounded_channel();
        Self {
            shared: Arc::new(StdMutex::new(Shared {
                status: EngineStatus {
                    mode: EngineMode::Loading,
                    radius_m: geo::clamp_radius(i64::from(default_radius_m)),
                    render_failures: 0,
                    scene: None,
                },
                map: None,
            })),
            radius_tx,
            radius_rx: Some(radius_rx),
            worker: None,
        }
    }

    pub fn status(&self) -> EngineStatus {
        self.shared.lock().unwrap().status.clone()
    }

    pub fn map_snapshot(&self) -> Option<serde_json::Value> {
        self.shared.lock().unwrap().map.clone()
    }

    /// Clamps and queues a radius change (applied in arrival order);
    /// returns the effective radius.
    pub fn set_radius(&self, requested_m: i64) -> u32 {
        let radius = geo::clamp_radius(requested_m);
        // send only fails once the worker is gone; the request is then moot
        let _ = self.radius_tx.send(radius);
        radius
    }

    pub fn start<G, S, R>(
        &mut self,
        feed: PositionFeed<G, S>,
        controller: ViewController<R>,
        poll_interval: Duration,
    ) -> Result<(), EngineError>
    where
        G: PositionSource + Send + 'static,
        S: PositionSource + Send + 'static,
        R: RenderSurface + Send + 'static,
    {
        if self.worker.is_some() {
            return Err(EngineError::AlreadyRunning);
        }
        let radius_rx = self.radius_rx.take().ok_or(EngineError::AlreadyRunning)?;

        let shared = self.shared.clone();
        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_engine_loop(
            shared,
            feed,
            controller,
            poll_interval,
            radius_rx,
            stop_rx,
        ));
        self.worker = Some(WorkerHandle { stop_tx, join });
        Ok(())
    }

    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.join.await;
        }
        // fresh channel so a later start gets its own queue; radius
        // requests still pending at stop are dropped with the old one
        let (radius_tx, radius_rx) = mpsc::unbounded_channel();
        self.radius_tx = radius_tx;
        self.radius_rx = Some(radius_rx);
    }
}

async fn run_engine_loop<G, S, R>(
    shared: Arc<StdMutex<Shared>>,
    mut feed: PositionFeed<G, S>,
    mut controller: ViewController<R>,
    poll_interval: Duration,
    mut radius_rx: mpsc::UnboundedReceiver<u32>,
    mut stop_rx: oneshot::Receiver<()>,
) where
    G: PositionSource,
    S: PositionSource,
    R: RenderSurface,
{
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                // a fetch still in flight at teardown is dropped, not applied
                let events = tokio::select! {
                    _ = &mut stop_rx => break,
                    events = feed.poll() => events,
                };
                for event in events {
                    if let Err(err) = controller.observe(event) {
                        record_render_failure(&shared, &err);
                    }
                }
                publish(&shared, &feed, &controller);
            }
            Some(radius) = radius_rx.recv() => {
                if let Err(err) = controller.set_radius(i64::from(radius)) {
                    record_render_failure(&shared, &err);
                }
                publish(&shared, &feed, &controller);
            }
        }
    }
    log::info!("engine worker stopped");
}

fn record_render_failure(shared: &Arc<StdMutex<Shared>>, err: &crate::render::RenderError) {
    log::warn!("render surface write failed: {err}");
    shared.lock().unwrap().status.render_failures += 1;
}

fn publish<G, S, R>(
    shared: &Arc<StdMutex<Shared>>,
    feed: &PositionFeed<G, S>,
    controller: &ViewController<R>,
) where
    G: PositionSource,
    S: PositionSource,
    R: RenderSurface,
{
    let mut locked = shared.lock().unwrap();
    locked.status.mode = if feed.is_ready() {
        EngineMode::Ready
    } else {
        EngineMode::Loading
    };
    locked.status.radius_m = controller.radius_m();
    locked.status.scene = controller.scene().cloned();
    // no map document before readiness, matching the scene
    locked.map = if feed.is_ready() {
        controller.surface().document()
    } else {
        None
    };
}
