use tracing::warn;

use crate::{
    config::DEFAULT_PNL_BINS,
    plot::figure::{Figure, HistogramSeries, SeriesColor},
};

/// Overlaid density histograms of episode P&L.
///
/// The optional baseline (rewards of a symmetric strategy) is drawn first so
/// the policy's histogram sits on top. The figure is returned, not shown.
pub fn plot_pnl(rewards: &[f64], symmetric_rewards: Option<&[f64]>) -> Figure {
    plot_pnl_with_bins(rewards, symmetric_rewards, DEFAULT_PNL_BINS)
}

pub fn plot_pnl_with_bins(
    rewards: &[f64],
    symmetric_rewards: Option<&[f64]>,
    bins: usize,
) -> Figure {
    if rewards.is_empty() {
        warn!("Plotting P&L histogram of an empty reward sample");
    }

    let mut fig = Figure::grid(1, 1);
    let panel = &mut fig.panels_mut()[0];
    panel.set_x_desc("P&L").set_y_desc("density").show_legend();

    if let Some(baseline) = symmetric_rewards {
        panel.push(
            HistogramSeries::density(baseline, bins, SeriesColor::Palette(0))
                .with_label("Rewards of symmetric strategy"),
        );
    }
    panel.push(HistogramSeries::density(rewards, bins, SeriesColor::Red).with_label("Rewards"));

    fig
}
