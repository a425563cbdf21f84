#![forbid(unsafe_code)]

//! The keepsake reveal flow: a countdown gate followed by a fixed sequence of
//! small interactive screens.
//!
//! - [`navigation`]: screens, edges and return contexts.
//! - [`screens`]: one module per screen.
//! - [`app`]: [`app::AppModel`], the model the runtime drives.
//! - [`cli`]: flags and environment variables.

pub mod app;
pub mod cli;
pub mod navigation;
pub mod screens;
