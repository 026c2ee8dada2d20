//! # balance
//!
//! Command-line REINFORCE trainer for the cart-pole balancing task. The
//! binary parses arguments and installs logging; everything else lives here
//! so it can be driven from tests.

pub mod app;
pub mod config;

pub use config::AppConfig;
