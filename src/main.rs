//! Waste Platform
//!
//! Loads the persisted platform state (or seed data), checks the reward
//! ledger, and logs a summary of reports and awarded points.

use anyhow::Context;

use waste_platform::config::Config;
use waste_platform::services::AnalyticsService;
use waste_platform::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(
        environment = config.environment.as_str(),
        snapshot = %config.snapshot_path().display(),
        "Starting waste platform"
    );

    let app_state = AppState::from_config(&config);

    if config.reset_on_start {
        tracing::info!("RESET_ON_START set, restoring seed data");
        app_state.platform.reset().await;
    }

    if let Err(e) = app_state.platform.verify_ledger().await {
        tracing::error!(code = e.error_code(), error = %e, "Reward ledger check failed");
    }

    let state = app_state.platform.snapshot().await;
    let summary = AnalyticsService::summarize(&state);
    tracing::info!(
        reports = summary.total_reports,
        collected = summary.collected,
        points_awarded = summary.total_points_awarded,
        collectors = state.collectors.len(),
        citizens = state.citizens.len(),
        "Platform state loaded"
    );

    for entry in app_state.platform.leaderboard().await.iter().take(5) {
        tracing::info!(rank = entry.rank, citizen = %entry.name, points = entry.points, "Leaderboard");
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to render summary")?
    );

    Ok(())
}
