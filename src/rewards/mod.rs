//! Rewards domain module
//!
//! Reward rules, the transaction ledger entries, and point computation.

pub mod engine;
mod model;

pub use engine::{compute_reward, leaderboard, next_milestone, unlocked_milestones, RewardAward};
pub use model::*;
