use std::{env, fs, path::Path, time::Instant};

use anyhow::{Context, Result};
use mmplot::prelude::*;
use time::macros::format_description;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[path = "../tests/common/mod.rs"]
mod common;

use common::{InventorySkewPolicy, SymmetricPolicy, ToyGenerator, ToyMarket};

fn main() -> Result<()> {
    let _guard = init_tracing()?;

    println!("Starting Monte-Carlo evaluation...");

    let market = ToyMarket::default().with_rollouts(3);
    let out_dir = Path::new("demos/plots");
    let mut canvas = FileCanvas::new(PlotConfig::default().with_output_dir(out_dir));

    let mut policy = InventorySkewPolicy {
        half_spread: 0.8,
        skew: 0.15,
    };
    let mut generator = ToyGenerator::new(market, 2024);

    plot_trajectory(&mut canvas, &market, &mut policy, &mut generator, Some(7))?;
    plot_policy_actions(&mut canvas, &mut policy, &market)?;

    let single = ToyMarket::default();
    let cfg = MonteCarloConfig::default().with_base_seed(1);

    let eval_start = Instant::now();
    let skewed = run_monte_carlo(&single, &mut policy, &mut generator, &cfg)?;
    let eval_time = eval_start.elapsed();

    let mut symmetric = SymmetricPolicy { half_spread: 0.8 };
    let baseline = run_monte_carlo(&single, &mut symmetric, &mut generator, &cfg)?;

    canvas.show("pnl_policy", &skewed.figure)?;
    canvas.show(
        "pnl_vs_symmetric",
        &plot_pnl(&skewed.rewards, Some(baseline.rewards.as_slice())),
    )?;

    skewed.table.to_csv(out_dir.join("skewed"))?;
    baseline.table.to_csv(out_dir.join("symmetric"))?;

    println!("\n--- Results ---");
    println!("{}", skewed.table.as_df());
    println!("{}", baseline.table.as_df());
    println!("Skewed policy run time: {eval_time:?}");
    for path in canvas.written() {
        println!("wrote {}", path.display());
    }

    drop(_guard);

    Ok(())
}

// ================================================================================================
// Tracing Configuration
// ================================================================================================

fn init_tracing() -> Result<Option<WorkerGuard>> {
    let app_name = "mmplot";

    let in_container =
        env::var("CONTAINER").is_ok() || std::path::Path::new("/.dockerenv").exists();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if in_container {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NONE)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
            .init();

        info!("Logging to stdout (container mode)");
        Ok(None)
    } else {
        let log_dir = dirs::state_dir()
            .or_else(dirs::home_dir)
            .map(|mut p| {
                p.push(app_name);
                p.push("logs");
                p
            })
            .context("Failed to find a state or home directory")?;
        fs::create_dir_all(&log_dir)?;

        let timestamp = time::OffsetDateTime::now_utc()
            .format(&format_description!(
                "[year][month][day]-[hour][minute][second]"
            ))
            .context("Failed to format timestamp")?;
        let file_name = format!("{app_name}-{timestamp}.log");
        let file_path = log_dir.join(&file_name);

        let file_appender = tracing_appender::rolling::never(&log_dir, &file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(non_blocking)
            .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NONE)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
            .init();

        info!(log_file = %file_path.display(), "Logging to file (local mode)");
        Ok(Some(guard))
    }
}
