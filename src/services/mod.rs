//! Business logic services for the waste platform

mod analytics;
mod platform;

pub use analytics::{AnalyticsService, AnalyticsSummary};
pub use platform::PlatformService;
