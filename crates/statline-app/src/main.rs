// League analytics entry point.
//
// Run sequence:
// 1. Initialize tracing (log to file)
// 2. Load config
// 3. Load daily stats and roster history
// 4. Build the daily value matrix
// 5. Sweep lookback windows
// 6. Rank keepers
// 7. Compare the managed roster against free agents
// 8. Score team success against roster behavior
// 9. Write output tables

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use statline_core::config;
use statline_core::ingest;
use statline_core::league::{behavior, keepers, waivers};
use statline_core::report;
use statline_core::valuation::{daily, window};

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("statline starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} window candidates, horizon {} days, target team {}",
        config.window.candidates().len(),
        config.window.horizon_days,
        config.waivers.team_id
    );

    let data = ingest::load_all(&config.data_paths).context("failed to load league data")?;
    let latest = data
        .latest_date()
        .context("daily stats contain no dates")?;

    let matrix = daily::build_value_matrix(&data.daily, &config.daily_value);
    let names = daily::player_names(&data.daily);

    let window_report = window::optimize_window(&matrix, &config.window);
    if let Some(selected) = window_report.selected {
        if selected.window != config.waivers.window_days {
            info!(
                "Selected window {} differs from the {}-day roster comparison window",
                selected.window, config.waivers.window_days
            );
        }
    }

    let abbrevs = ingest::team_abbrevs(&data.rosters);
    let keeper_rows = keepers::rank_keepers(&data.daily, &config.keepers, &abbrevs);
    info!("Ranked {} keepers", keeper_rows.len());

    let recommendations = if data.rosters.is_empty() {
        warn!("No roster history; skipping roster comparison");
        Vec::new()
    } else {
        waivers::recommend(&matrix, &data.rosters, &config.waivers, &names)
    };

    let behavior = behavior::analyze_behavior(&matrix, &data.rosters, latest, &config.behavior);

    let out_dir = Path::new(&config.data_paths.output_dir);
    report::write_keepers(out_dir, &keeper_rows).context("failed to write keepers")?;
    report::write_window_correlations(out_dir, &window_report)
        .context("failed to write window correlations")?;
    report::write_recommendations(out_dir, &recommendations)
        .context("failed to write roster recommendations")?;
    report::write_team_success(out_dir, &behavior).context("failed to write team success")?;
    let summary = report::LeagueSummary::new(&window_report, &behavior);
    report::write_summary(out_dir, &summary).context("failed to write league summary")?;

    info!("statline finished; outputs in {}", out_dir.display());
    Ok(())
}

/// Initialize tracing to log to `logs/statline.log`.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("statline.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("statline=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
