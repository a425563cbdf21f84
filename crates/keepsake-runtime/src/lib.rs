#![forbid(unsafe_code)]

//! Elm-style runtime for the keepsake reveal flow.
//!
//! - [`program`]: the `Model`/`Cmd` contract and the crossterm [`Program`] loop.
//! - [`subscription`]: declarative timers ([`Every`], [`After`]) reconciled after
//!   every update.
//! - [`simulator`]: [`ProgramSimulator`], which runs a model in virtual time.
//! - [`frame`]: the line-oriented render target.

pub mod debug_trace;
pub mod frame;
pub mod program;
pub mod simulator;
pub mod subscription;

pub use frame::Frame;
pub use program::{Cmd, Model, Program, ProgramConfig, TaskSpec};
pub use simulator::{CmdRecord, ProgramSimulator};
pub use subscription::{After, Cadence, Every, StopSignal, SubId, Subscription};
