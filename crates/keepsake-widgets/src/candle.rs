#![forbid(unsafe_code)]

//! Birthday candle.
//!
//! One state shape, two transition policies:
//!
//! | Policy | `blow_out` | `toggle` | Side effect |
//! |--------|-----------|----------|-------------|
//! | [`CandlePolicy::Gating`] | Lit → Unlit (once) | same as `blow_out` while lit | schedules a delayed hand-off |
//! | [`CandlePolicy::Toggle`] | Lit → Unlit | Lit ↔ Unlit | none |
//!
//! Under the gating policy the delayed hand-off is represented by a pending
//! [`CancelToken`]. The owner arms a one-shot timer bound to that token and
//! calls [`Candle::fire`] when it elapses. Dropping the candle (its screen was
//! torn down) cancels the token, so a stale timer can never hand off.

use std::time::Duration;

use keepsake_core::CancelToken;

/// Delay between blowing out the gating candle and the hand-off.
pub const BLOW_OUT_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleState {
    Lit,
    Unlit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandlePolicy {
    /// One-way; going out schedules a hand-off after `delay`.
    Gating { delay: Duration },
    /// Freely toggled, no side effects.
    Toggle,
}

/// Result of a candle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleEffect {
    None,
    /// A hand-off was scheduled; arm a timer for this delay.
    Scheduled(Duration),
}

#[derive(Debug)]
pub struct Candle {
    state: CandleState,
    policy: CandlePolicy,
    pending: Option<CancelToken>,
}

impl Candle {
    /// A lit candle under `policy`.
    #[must_use]
    pub fn new(policy: CandlePolicy) -> Self {
        Self {
            state: CandleState::Lit,
            policy,
            pending: None,
        }
    }

    /// The gating candle with the standard delay.
    #[must_use]
    pub fn gating() -> Self {
        Self::new(CandlePolicy::Gating {
            delay: BLOW_OUT_DELAY,
        })
    }

    /// The free-toggling widget variant.
    #[must_use]
    pub fn toggle_widget() -> Self {
        Self::new(CandlePolicy::Toggle)
    }

    #[must_use]
    pub fn state(&self) -> CandleState {
        self.state
    }

    #[must_use]
    pub fn policy(&self) -> CandlePolicy {
        self.policy
    }

    #[must_use]
    pub fn is_lit(&self) -> bool {
        self.state == CandleState::Lit
    }

    /// Lit → Unlit. A no-op when already out.
    pub fn blow_out(&mut self) -> CandleEffect {
        if self.state == CandleState::Unlit {
            return CandleEffect::None;
        }
        self.state = CandleState::Unlit;
        match self.policy {
            CandlePolicy::Gating { delay } => {
                self.pending = Some(CancelToken::new());
                tracing::debug!(delay_ms = delay.as_millis() as u64, "candle out, hand-off scheduled");
                CandleEffect::Scheduled(delay)
            }
            CandlePolicy::Toggle => CandleEffect::None,
        }
    }

    /// Flip Lit ↔ Unlit under the toggle policy. Under the gating policy
    /// this only ever blows the candle out.
    pub fn toggle(&mut self) -> CandleEffect {
        match (self.policy, self.state) {
            (CandlePolicy::Toggle, CandleState::Unlit) => {
                self.state = CandleState::Lit;
                CandleEffect::None
            }
            (_, CandleState::Lit) => self.blow_out(),
            (CandlePolicy::Gating { .. }, CandleState::Unlit) => CandleEffect::None,
        }
    }

    /// The scheduled hand-off's token, if one is pending.
    #[must_use]
    pub fn pending(&self) -> Option<&CancelToken> {
        self.pending.as_ref().filter(|t| !t.is_cancelled())
    }

    /// The delay of the pending hand-off.
    #[must_use]
    pub fn delay(&self) -> Option<Duration> {
        match self.policy {
            CandlePolicy::Gating { delay } if self.pending().is_some() => Some(delay),
            _ => None,
        }
    }

    /// Consume the pending hand-off.
    ///
    /// Returns `true` exactly once per scheduled hand-off, and never after
    /// [`cancel`](Self::cancel).
    pub fn fire(&mut self) -> bool {
        match self.pending.take() {
            Some(token) => token.cancel(),
            None => false,
        }
    }

    /// Cancel the pending hand-off, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take()
            && token.cancel()
        {
            tracing::debug!("candle hand-off cancelled");
        }
    }
}

impl Drop for Candle {
    fn drop(&mut self) {
        self.cancel();
    }
}
