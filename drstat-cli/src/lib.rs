//! drstat CLI library -- argument parsing, command handlers and output rendering.
//!
//! The `drstat` binary in `main.rs` is a thin wrapper around these modules.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
