#![forbid(unsafe_code)]

//! Screen-local state for the keepsake reveal flow.
//!
//! Every state machine here is transitioned only through named operations;
//! none of them know about navigation. Operations that should lead somewhere
//! else (the gate unlocking, the candle's delayed hand-off) report it through
//! their return value and leave the actual screen change to the caller.

pub mod candle;
pub mod envelope;
pub mod image_viewer;
pub mod random_picker;
pub mod time_gate;

pub use candle::{BLOW_OUT_DELAY, Candle, CandleEffect, CandlePolicy, CandleState};
pub use envelope::{Envelope, EnvelopeState, LetterPresentation};
pub use image_viewer::{ImageViewer, ViewerState};
pub use random_picker::{PickControl, RandomPicker, pick};
pub use time_gate::{Countdown, GateState, GateTransition, TICK_INTERVAL, TimeGate};
