//! Core forward pipeline for the two-bot Telegram relay.
//!
//! This crate is intentionally framework-agnostic. The Telegram Bot API and the
//! HTTP receiver live in adapter crates; outbound delivery sits behind the
//! `DestinationPort` trait.

pub mod config;
pub mod domain;
pub mod errors;
pub mod forward;
pub mod logging;
pub mod messaging;

pub use errors::{Error, Result};
