//! inboxctl: human-in-the-loop review for interrupted agent runs.
//!
//! This library exposes the review engine (working responses, edit
//! tracking, decision building, single and batch controllers) and the
//! run-stream transports. The binary entrypoint is in `main.rs`.

pub mod cli;
pub mod config;
pub mod inbox;
pub mod stream;
pub mod utils;
