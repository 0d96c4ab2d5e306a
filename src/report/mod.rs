//! Report domain module
//!
//! Contains the report models, lifecycle statuses, and platform events.

mod model;

pub use model::*;
