//! Core domain + application logic for the presence bot.
//!
//! This crate is framework-agnostic. Telegram lives behind the messaging port
//! implemented in the adapter crate.

pub mod catalog;
pub mod clients;
pub mod config;
pub mod conversation;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod menu;
pub mod messaging;
pub mod status;
pub mod texts;

pub use errors::{Error, Result};
