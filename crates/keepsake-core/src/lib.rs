#![forbid(unsafe_code)]

//! Core: canonical input events, the wall clock, and cancellation tokens.
//!
//! Everything above this crate treats time as something read from a
//! [`clock::Clock`] and treats pending timers as something a
//! [`cancel::CancelToken`] can switch off. Nothing here knows about screens.

pub mod cancel;
pub mod clock;
pub mod event;

pub use cancel::CancelToken;
pub use clock::{Clock, ManualClock, SystemClock};
