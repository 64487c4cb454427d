//! Core domain + application logic for the chat moderation bot.
//!
//! This crate is intentionally transport-agnostic. The chat transport
//! (session handshake, pairing, group membership primitives) lives behind
//! ports (traits) implemented in adapter crates.

pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod moderation;
pub mod notifier;
pub mod pipeline;
pub mod ports;
pub mod refresh;
pub mod state;
pub mod usage;

pub use errors::{Error, Result};
