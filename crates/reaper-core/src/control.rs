//! The weekly control loop.
//!
//! ```text
//!            tick                 now >= next_trigger
//!   Idle ──────────▶ CheckDue ─────────────────────────▶ Firing
//!    ▲                  │ not due                          │ reconcile()
//!    └──────────────────┘                                  ▼
//!    ▲                                                Rescheduled ──▶ Terminated
//!    └────────────────────────────────────────────────────┘  (one-shot)
//!
//!   shutdown future ready (any time between passes) ──▶ Terminated
//! ```
//!
//! One task owns [`ScheduleState`]. The pass runs outside the `select!`, so
//! a shutdown request can only prevent the next pass from starting; it never
//! interrupts one in flight.

use crate::cluster::NamespaceApi;
use crate::config::{LoopConfig, MAX_INTERVAL_SECS};
use crate::error::{ReaperError, Result};
use crate::policy::RetentionPolicy;
use crate::reconcile::{reconcile, ReconcileReport};
use crate::schedule::Schedule;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of wall-clock time for due checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// ---------------------------------------------------------------------------
// ScheduleState / Termination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleState {
    pub next_trigger: DateTime<Utc>,
    pub interval: Duration,
    pub schedule: Schedule,
    pub one_shot: bool,
    pub dry_run: bool,
}

/// Why [`ControlLoop::run_until`] returned.
#[derive(Debug)]
pub enum Termination {
    /// The shutdown future completed.
    Cancelled,
    /// One-shot mode ran its pass. Carries that pass's outcome.
    OneShotCompleted(Result<ReconcileReport>),
}

// ---------------------------------------------------------------------------
// ControlLoop
// ---------------------------------------------------------------------------

pub struct ControlLoop<A, C = SystemClock> {
    api: A,
    clock: C,
    policy: RetentionPolicy,
    state: ScheduleState,
}

impl<A, C> ControlLoop<A, C>
where
    A: NamespaceApi,
    C: Clock,
{
    /// Build the loop in its idle state, with the first trigger computed from
    /// the current clock reading.
    pub fn new(api: A, clock: C, config: LoopConfig) -> Result<Self> {
        if config.interval.is_zero() {
            return Err(ReaperError::config("poll interval must be non-zero"));
        }
        if config.interval > Duration::from_secs(MAX_INTERVAL_SECS) {
            return Err(ReaperError::config(format!(
                "poll interval must be at most {MAX_INTERVAL_SECS} seconds"
            )));
        }

        let next_trigger = config.schedule.next_after(clock.now());
        tracing::info!(
            schedule = %config.schedule,
            next_trigger = %next_trigger,
            dry_run = config.dry_run,
            one_shot = config.one_shot,
            "namespace reaper scheduled"
        );

        Ok(Self {
            api,
            clock,
            policy: config.policy,
            state: ScheduleState {
                next_trigger,
                interval: config.interval,
                schedule: config.schedule,
                one_shot: config.one_shot,
                dry_run: config.dry_run,
            },
        })
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    /// Poll every `interval` until one-shot completion or until `shutdown`
    /// resolves, whichever comes first.
    ///
    /// The first poll happens one full interval after the call.
    pub async fn run_until<F>(mut self, shutdown: F) -> Termination
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let period = self.state.interval;
        let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, stopping control loop");
                    return Termination::Cancelled;
                }
                _ = ticker.tick() => {}
            }

            if let Some(done) = self.check_due().await {
                return done;
            }
        }
    }

    /// Handle one poll tick: fire the pass if the trigger has been reached.
    ///
    /// Returns `Some` only when a one-shot pass has run. Pass failures are
    /// logged here and never stop a looping schedule.
    pub async fn check_due(&mut self) -> Option<Termination> {
        let now = self.clock.now();
        tracing::info!(next_trigger = %self.state.next_trigger, "next delete time");

        if now < self.state.next_trigger {
            tracing::info!(%now, "not time to delete yet");
            return None;
        }

        tracing::info!(%now, "it's time to delete");
        let outcome = reconcile(&self.api, &self.policy, self.state.dry_run).await;
        match &outcome {
            Ok(report) => tracing::info!(
                candidates = report.candidates.len(),
                deleted = report.deleted.len(),
                dry_run = report.dry_run,
                "reconciliation pass finished"
            ),
            Err(e) => match std::error::Error::source(e) {
                Some(cause) => {
                    tracing::error!(error = %e, cause = %cause, "reconciliation pass failed")
                }
                None => tracing::error!(error = %e, "reconciliation pass failed"),
            },
        }

        if self.state.one_shot {
            return Some(Termination::OneShotCompleted(outcome));
        }

        self.state.next_trigger = self.state.schedule.next_after(now);
        tracing::info!(next_trigger = %self.state.next_trigger, "rescheduled");
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
