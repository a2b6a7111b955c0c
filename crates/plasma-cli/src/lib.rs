#![forbid(unsafe_code)]

//! The `plasma` binary's building blocks.
//!
//! # Role in the workspace
//! `plasma-cli` owns everything that touches the process: arguments and
//! environment ([`cli`]), the truecolor terminal surface ([`terminal`]),
//! the stderr subscriber ([`logging`]), and startup wiring including signal
//! registration and snapshot output ([`app`]). Rendering itself lives in
//! `plasma-fx`.

pub mod app;
pub mod cli;
pub mod logging;
pub mod terminal;
