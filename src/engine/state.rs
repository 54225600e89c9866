use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    config::clamp_speed,
    engine::{Phase, UpdateCallback},
    entities::{JourneyStatus, PositionUpdate, Route, Shipment},
};

pub(crate) struct Timer {
    pub id: u64,
    pub handle: JoinHandle<()>,
}

/// Everything the engine knows about the active journey. Only ever touched
/// under the engine's lock.
pub(crate) struct JourneyState {
    pub shipments: Vec<Shipment>,
    pub routes: HashMap<Uuid, Route>,
    pub callback: Option<UpdateCallback>,
    pub speed: f64,
    pub timer: Option<Timer>,
    pub started: bool,
    pub completed: bool,
    /// Bumped whenever the journey is torn down or replaced.
    pub epoch: u64,
    next_timer_id: u64,
}

pub(crate) struct TickOutcome {
    pub updates: Vec<PositionUpdate>,
    pub completed: bool,
}

impl JourneyState {
    pub fn new() -> Self {
        Self {
            shipments: vec![],
            routes: HashMap::new(),
            callback: None,
            speed: 1.0,
            timer: None,
            started: false,
            completed: false,
            epoch: 0,
            next_timer_id: 0,
        }
    }

    pub fn is_initialized(&self) -> bool {
        !self.shipments.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn phase(&self) -> Phase {
        if !self.is_initialized() {
            Phase::Idle
        } else if self.completed {
            Phase::Completed
        } else if self.is_running() {
            Phase::Running
        } else if self.started {
            Phase::Paused
        } else {
            Phase::Ready
        }
    }

    pub fn set_speed(&mut self, multiplier: f64) -> f64 {
        self.speed = clamp_speed(multiplier);
        self.speed
    }

    pub fn install_timer(&mut self, handle: JoinHandle<()>) -> u64 {
        self.next_timer_id += 1;
        self.timer = Some(Timer {
            id: self.next_timer_id,
            handle,
        });
        self.started = true;
        self.next_timer_id
    }

    pub fn reserve_timer_id(&self) -> u64 {
        self.next_timer_id + 1
    }

    pub fn owns_timer(&self, id: u64) -> bool {
        matches!(&self.timer, Some(timer) if timer.id == id)
    }

    /// Cancels the timer task if one is scheduled.
    pub fn stop_timer(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Drops every trace of the current journey.
    pub fn teardown(&mut self) {
        self.stop_timer();
        self.shipments.clear();
        self.routes.clear();
        self.callback = None;
        self.speed = 1.0;
        self.started = false;
        self.completed = false;
        self.epoch += 1;
    }

    pub fn status(&self) -> Option<JourneyStatus> {
        let shipment = self.shipments.first()?;

        Some(JourneyStatus {
            shipment_id: shipment.id,
            progress: shipment.progress,
            status: shipment.status,
            is_running: self.is_running(),
            current_speed: self.speed,
        })
    }

    /// Moves every routed shipment forward by one tick. Shipments without a
    /// usable route are skipped.
    pub fn advance(&mut self, base_increment: f64, tick: Duration, now: DateTime<Utc>) -> TickOutcome {
        let increment = base_increment * self.speed;
        let mut updates = Vec::with_capacity(self.shipments.len());
        let mut completed = false;

        for shipment in self.shipments.iter_mut() {
            let route = match self.routes.get(&shipment.id) {
                Some(route) if !route.is_empty() => route,
                _ => {
                    tracing::warn!(id = %shipment.id, "skipping shipment without route");
                    continue;
                }
            };

            shipment.advance(increment);
            if let Some(position) = route.position_at(shipment.progress) {
                shipment.current = position;
            }

            if shipment.is_delivered() {
                completed = true;
            }

            let eta = estimate_eta(shipment.progress, increment, tick, now);
            updates.push(PositionUpdate::new(shipment, eta));
        }

        if completed {
            self.completed = true;
        }

        TickOutcome { updates, completed }
    }
}

/// Arrival time if the current speed holds, `None` once delivered.
pub(crate) fn estimate_eta(
    progress: f64,
    increment: f64,
    tick: Duration,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let remaining = 100.0 - progress;
    if remaining <= 0.0 || increment <= 0.0 {
        return None;
    }

    let ticks = (remaining / increment).ceil() as i64;
    let millis = ticks.saturating_mul(tick.as_millis() as i64);

    Some(now + chrono::Duration::milliseconds(millis))
}
