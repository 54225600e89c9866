mod helpers;
mod journey_api;
mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    api::API, config::JourneyConfig, entities::PositionUpdate, external::RouteService,
};

use state::JourneyState;

/// Receives one batch of position updates per tick.
pub type UpdateCallback = Arc<dyn Fn(Vec<PositionUpdate>) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    /// Initialized but never started.
    Ready,
    Running,
    Paused,
    Completed,
}

struct Inner {
    config: JourneyConfig,
    routes: Arc<RouteService>,
    state: Mutex<JourneyState>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, JourneyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands a tick's batch to the subscriber unless the journey it belongs
    /// to has been torn down since the tick was computed.
    fn deliver(&self, epoch: u64, callback: &UpdateCallback, updates: Vec<PositionUpdate>) -> bool {
        if self.lock().epoch != epoch {
            tracing::debug!("dropping updates for a torn down journey");
            return false;
        }

        callback(updates);
        true
    }
}

/// Animates a single shipment along its route on a fixed tick.
///
/// Cloning is cheap and every clone drives the same journey. At most one
/// journey is active at a time; initializing a new one tears down the old.
#[derive(Clone)]
pub struct JourneyEngine {
    inner: Arc<Inner>,
}

impl JourneyEngine {
    #[tracing::instrument(name = "JourneyEngine::new", skip_all)]
    pub fn new(config: JourneyConfig, routes: Arc<RouteService>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                routes,
                state: Mutex::new(JourneyState::new()),
            }),
        }
    }

    pub fn route_service(&self) -> &Arc<RouteService> {
        &self.inner.routes
    }

    /// Schedules the tick task. Caller holds the lock and has checked that the
    /// journey can run.
    fn spawn_timer(&self, state: &mut JourneyState) -> bool {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("no async runtime available, journey not started");
                return false;
            }
        };

        let id = state.reserve_timer_id();
        let inner = self.inner.clone();
        let handle = runtime.spawn(run_timer(inner, id));

        state.install_timer(handle);
        true
    }
}

async fn run_timer(inner: Arc<Inner>, id: u64) {
    let period = inner.config.tick_interval;
    let base_increment = inner.config.base_increment();

    let mut interval = tokio::time::interval(period);
    // the first tick resolves immediately
    interval.tick().await;

    loop {
        interval.tick().await;

        let (outcome, callback, epoch) = {
            let mut state = inner.lock();
            if !state.owns_timer(id) {
                break;
            }

            let outcome = state.advance(base_increment, period, Utc::now());
            if outcome.completed {
                // auto-pause: the handle is dropped, this task ends below
                state.timer = None;
            }

            (outcome, state.callback.clone(), state.epoch)
        };

        tracing::debug!(updates = outcome.updates.len(), "tick");

        if let Some(callback) = callback {
            inner.deliver(epoch, &callback, outcome.updates);
        }

        if outcome.completed {
            tracing::info!("journey completed");
            break;
        }
    }
}

impl API for JourneyEngine {}
