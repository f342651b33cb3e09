use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Number of episodes sampled by the Monte-Carlo aggregator unless overridden.
pub const DEFAULT_EPISODES: usize = 1000;

/// Number of bins of each P&L histogram.
pub const DEFAULT_PNL_BINS: usize = 50;

// ================================================================================================
// Output
// ================================================================================================

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

/// Where and how a [`FileCanvas`](crate::plot::FileCanvas) writes the figures it is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotConfig {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("target/plots"),
            format: OutputFormat::default(),
        }
    }
}

impl PlotConfig {
    pub fn with_output_dir(self, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..self
        }
    }

    pub fn with_format(self, format: OutputFormat) -> Self {
        Self { format, ..self }
    }

    /// Target file for a figure called `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.{}", self.format))
    }
}

// ================================================================================================
// Monte-Carlo
// ================================================================================================

/// Sampling parameters of [`generate_results_table_and_hist`](crate::report::results::generate_results_table_and_hist).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    pub n_episodes: usize,
    pub bins: usize,
    /// Episode `i` is generated with seed `base_seed + i`. `None` leaves seeding to the generator.
    pub base_seed: Option<u64>,
    /// Emit a progress event every this many episodes. `0` disables progress events.
    pub log_every: usize,
    /// Draw a terminal progress bar while sampling.
    pub show_progress: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            n_episodes: DEFAULT_EPISODES,
            bins: DEFAULT_PNL_BINS,
            base_seed: None,
            log_every: 100,
            show_progress: true,
        }
    }
}

impl MonteCarloConfig {
    pub fn with_episodes(self, n_episodes: usize) -> Self {
        Self { n_episodes, ..self }
    }

    pub fn with_bins(self, bins: usize) -> Self {
        Self { bins, ..self }
    }

    pub fn with_base_seed(self, seed: u64) -> Self {
        Self {
            base_seed: Some(seed),
            ..self
        }
    }

    pub fn with_log_every(self, log_every: usize) -> Self {
        Self { log_every, ..self }
    }

    pub fn with_progress(self, show_progress: bool) -> Self {
        Self {
            show_progress,
            ..self
        }
    }

    pub(crate) fn seed_for(&self, episode: usize) -> Option<u64> {
        self.base_seed
            .map(|base| base.wrapping_add(episode as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_config_paths_carry_format_extension() {
        let cfg = PlotConfig::default()
            .with_output_dir("out")
            .with_format(OutputFormat::Svg);
        assert_eq!(cfg.path_for("trajectory"), PathBuf::from("out/trajectory.svg"));
        assert_eq!("png".parse::<OutputFormat>().ok(), Some(OutputFormat::Png));
    }

    #[test]
    fn monte_carlo_seeds_are_offset_from_base() {
        let cfg = MonteCarloConfig::default();
        assert_eq!(cfg.n_episodes, 1000);
        assert_eq!(cfg.seed_for(3), None);

        let seeded = cfg.with_base_seed(u64::MAX).with_episodes(2);
        assert_eq!(seeded.seed_for(0), Some(u64::MAX));
        assert_eq!(seeded.seed_for(1), Some(0));
    }
}
