#![forbid(unsafe_code)]

//! Unlock gate driven by an absolute target instant.
//!
//! The gate never decrements a counter. Every tick recomputes
//! `remaining = target - now` from the [`Clock`], so a late or skipped tick
//! (host asleep, scheduler jitter) cannot make the countdown drift.
//!
//! # State machine
//!
//! ```text
//!            start(target), remaining > 0
//! Loading ────────────────────────────────▶ Counting(remaining)
//!    │  │                                     │  ▲   │
//!    │  │ start(target), remaining <= 0       │  └───┘ tick, remaining > 0
//!    │  └──────────────────────────┐          │
//!    │ fail(err)                   ▼          │ tick, remaining <= 0
//!    ▼                          Unlocked ◀────┘
//! Failed(err)
//! ```
//!
//! `Unlocked` and `Failed` are terminal. Entering `Unlocked` cancels the
//! gate's [`CancelToken`] *before* [`GateTransition::Unlocked`] is returned,
//! so the tick timer is dead by the time the caller navigates, and the
//! transition is reported at most once per gate.

use std::time::Duration;

use chrono::{DateTime, Utc};
use keepsake_core::{CancelToken, Clock};
use keepsake_store::FetchError;

/// Period of the countdown timer.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Observable gate state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Waiting for the unlock configuration.
    Loading,
    /// The configuration could not be obtained. No timer ever runs.
    Failed(FetchError),
    /// Time left until the target instant.
    Counting(Duration),
    Unlocked,
}

/// What an operation did to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTransition {
    /// Not applicable in the current state; nothing changed.
    Ignored,
    /// Now (or still) counting; the remaining time was refreshed.
    Counting,
    /// The gate just unlocked. Returned once per gate.
    Unlocked,
    Failed,
}

/// Days/hours/minutes/seconds decomposition of a remaining duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Countdown {
    /// Pure decomposition; sub-second remainders are truncated.
    #[must_use]
    pub const fn from_remaining(remaining: Duration) -> Self {
        let total = remaining.as_secs();
        Self {
            days: total / 86_400,
            hours: (total / 3_600) % 24,
            minutes: (total / 60) % 60,
            seconds: total % 60,
        }
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

/// The unlock gate.
#[derive(Debug)]
pub struct TimeGate {
    state: GateState,
    target: Option<DateTime<Utc>>,
    token: CancelToken,
}

impl Default for TimeGate {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeGate {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: GateState::Loading,
            target: None,
            token: CancelToken::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// The target instant while counting.
    #[must_use]
    pub fn target(&self) -> Option<DateTime<Utc>> {
        self.target
    }

    /// Token the tick timer should observe.
    #[must_use]
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Whether the tick timer should be running.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        matches!(self.state, GateState::Counting(_)) && !self.token.is_cancelled()
    }

    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.state == GateState::Unlocked
    }

    /// Countdown for display. Reads zero once unlocked.
    #[must_use]
    pub fn countdown(&self) -> Countdown {
        match self.state {
            GateState::Counting(remaining) => Countdown::from_remaining(remaining),
            _ => Countdown::default(),
        }
    }

    /// Begin counting toward `target`.
    ///
    /// Evaluates immediately: a target at or before `now` unlocks without
    /// the timer ever being armed. Only valid from `Loading`.
    pub fn start(&mut self, target: DateTime<Utc>, clock: &dyn Clock) -> GateTransition {
        if self.state != GateState::Loading {
            tracing::debug!(state = ?self.state, "gate start ignored");
            return GateTransition::Ignored;
        }
        self.target = Some(target);
        tracing::info!(target_instant = %target, "gate started");
        self.evaluate(clock)
    }

    /// Record a config fetch failure. Only valid from `Loading`.
    pub fn fail(&mut self, error: FetchError) -> GateTransition {
        if self.state != GateState::Loading {
            return GateTransition::Ignored;
        }
        tracing::warn!(kind = error.kind(), %error, "gate cannot start");
        self.token.cancel();
        self.state = GateState::Failed(error);
        GateTransition::Failed
    }

    /// Recompute the remaining time. Ignored unless counting.
    pub fn tick(&mut self, clock: &dyn Clock) -> GateTransition {
        if !self.is_ticking() {
            return GateTransition::Ignored;
        }
        self.evaluate(clock)
    }

    fn evaluate(&mut self, clock: &dyn Clock) -> GateTransition {
        let Some(target) = self.target else {
            return GateTransition::Ignored;
        };
        // Negative differences fail `to_std` and count as already due.
        let remaining = (target - clock.now()).to_std().unwrap_or(Duration::ZERO);
        if remaining.is_zero() {
            self.token.cancel();
            self.state = GateState::Unlocked;
            self.target = None;
            tracing::info!("gate unlocked");
            return GateTransition::Unlocked;
        }
        self.state = GateState::Counting(remaining);
        GateTransition::Counting
    }
}
