//! Waste Platform Library
//!
//! Report lifecycle and reward ledger for a citizen / enterprise /
//! collector waste-collection platform.

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod persistence;
pub mod report;
pub mod rewards;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
