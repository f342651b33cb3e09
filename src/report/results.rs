use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use polars::{
    df,
    frame::DataFrame,
    prelude::{DataType, Expr, Field, IntoLazy, PlSmallStr, Schema, SchemaRef, col, lit},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use tracing::{debug, info, warn};

use crate::{
    config::MonteCarloConfig,
    error::{DataError, EnvError, PlotResult},
    gym::{Environment, Policy, Trajectory, TrajectoryGenerator},
    plot::{Figure, pnl::plot_pnl_with_bins},
    report::{
        io::{Report, ReportName, ToSchema},
        polars_ext::polars_to_plot_error,
    },
};

/// Label of the single row of a [`ResultsTable`].
pub const RESULTS_ROW_LABEL: &str = "Inventory";

// ================================================================================================
// Per-episode reduction
// ================================================================================================

/// Reduction of one generated batch to the three quantities the results table aggregates.
///
/// With several rollouts per batch, reward and terminal inventory are averaged
/// across rollouts; the half-spread mean runs over every quote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub mean_half_spread: f64,
    pub total_reward: f64,
    pub terminal_inventory: f64,
}

impl From<&Trajectory> for EpisodeSummary {
    fn from(t: &Trajectory) -> Self {
        Self {
            mean_half_spread: t.mean_abs_half_spread(),
            total_reward: t.total_rewards().mean().unwrap_or(f64::NAN),
            terminal_inventory: t.terminal_inventory().mean().unwrap_or(f64::NAN),
        }
    }
}

// ================================================================================================
// Results table
// ================================================================================================

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    PartialOrd,
    Ord,
    EnumIter,
    IntoStaticStr,
    EnumCount,
)]
pub enum ResultsCol {
    #[strum(serialize = "label")]
    Label,
    #[strum(serialize = "Mean spread")]
    MeanSpread,
    #[strum(serialize = "Mean PnL")]
    MeanPnl,
    #[strum(serialize = "Std PnL")]
    StdPnl,
    #[strum(serialize = "Mean terminal inventory")]
    MeanTerminalInventory,
    #[strum(serialize = "Std terminal inventory")]
    StdTerminalInventory,
}

impl From<ResultsCol> for PlSmallStr {
    fn from(value: ResultsCol) -> Self {
        value.as_str().into()
    }
}

impl ResultsCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Columns of the intermediate per-episode frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum EpisodeCol {
    HalfSpread,
    Reward,
    TerminalInventory,
}

impl EpisodeCol {
    fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// One-row summary of a Monte-Carlo run: mean spread, P&L and terminal
/// inventory statistics. Standard deviations are population (`ddof = 0`).
///
/// Every statistic of an empty sample is `NaN`.
#[derive(Debug, Clone)]
pub struct ResultsTable {
    df: DataFrame,
}

impl ReportName for ResultsTable {
    fn base_name(&self) -> String {
        "results".to_string()
    }
}

impl Report for ResultsTable {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }
}

impl ToSchema for ResultsTable {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = ResultsCol::iter()
            .map(|c| {
                let dtype = match c {
                    ResultsCol::Label => DataType::String,
                    ResultsCol::MeanSpread
                    | ResultsCol::MeanPnl
                    | ResultsCol::StdPnl
                    | ResultsCol::MeanTerminalInventory
                    | ResultsCol::StdTerminalInventory => DataType::Float64,
                };
                Field::new(c.name(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}

impl ResultsTable {
    pub fn from_episodes(episodes: &[EpisodeSummary]) -> PlotResult<Self> {
        let values = |f: fn(&EpisodeSummary) -> f64| episodes.iter().map(f).collect::<Vec<f64>>();
        let frame = df!(
            EpisodeCol::HalfSpread.as_str() => values(|e| e.mean_half_spread),
            EpisodeCol::Reward.as_str() => values(|e| e.total_reward),
            EpisodeCol::TerminalInventory.as_str() => values(|e| e.terminal_inventory),
        )
        .map_err(convert_err)?;

        let df = frame
            .lazy()
            .select(exprs())
            .collect()
            .map_err(convert_err)?;

        Ok(Self { df })
    }

    /// Statistic `c` of the single row. `NaN` when missing or null.
    pub fn value(&self, c: ResultsCol) -> PlotResult<f64> {
        if c == ResultsCol::Label {
            return Err(DataError::MissingColumn(format!("{c} is not numeric")).into());
        }
        let v = self
            .df
            .column(c.as_str())
            .map_err(|_| DataError::MissingColumn(c.to_string()))?
            .f64()
            .map_err(convert_err)?
            .get(0);
        Ok(v.unwrap_or(f64::NAN))
    }

    pub fn label(&self) -> PlotResult<Option<String>> {
        let label = self
            .df
            .column(ResultsCol::Label.as_str())
            .map_err(|_| DataError::MissingColumn(ResultsCol::Label.to_string()))?
            .str()
            .map_err(convert_err)?
            .get(0)
            .map(str::to_string);
        Ok(label)
    }

    pub fn mean_spread(&self) -> PlotResult<f64> {
        self.value(ResultsCol::MeanSpread)
    }

    pub fn mean_pnl(&self) -> PlotResult<f64> {
        self.value(ResultsCol::MeanPnl)
    }

    pub fn std_pnl(&self) -> PlotResult<f64> {
        self.value(ResultsCol::StdPnl)
    }

    pub fn mean_terminal_inventory(&self) -> PlotResult<f64> {
        self.value(ResultsCol::MeanTerminalInventory)
    }

    pub fn std_terminal_inventory(&self) -> PlotResult<f64> {
        self.value(ResultsCol::StdTerminalInventory)
    }
}

fn exprs() -> Vec<Expr> {
    let nan = || lit(f64::NAN);
    let half_spread = || col(EpisodeCol::HalfSpread.as_str());
    let reward = || col(EpisodeCol::Reward.as_str());
    let inventory = || col(EpisodeCol::TerminalInventory.as_str());

    vec![
        lit(RESULTS_ROW_LABEL).alias(ResultsCol::Label),
        // Quoted spread is twice the half-spread.
        (half_spread().mean() * lit(2.0))
            .fill_null(nan())
            .alias(ResultsCol::MeanSpread),
        reward().mean().fill_null(nan()).alias(ResultsCol::MeanPnl),
        reward().std(0).fill_null(nan()).alias(ResultsCol::StdPnl),
        inventory()
            .mean()
            .fill_null(nan())
            .alias(ResultsCol::MeanTerminalInventory),
        inventory()
            .std(0)
            .fill_null(nan())
            .alias(ResultsCol::StdTerminalInventory),
    ]
}

fn convert_err(e: polars::error::PolarsError) -> crate::error::PlotError {
    polars_to_plot_error("results table", e)
}

// ================================================================================================
// Monte-Carlo aggregation
// ================================================================================================

/// Output of [`generate_results_table_and_hist`].
#[derive(Debug, Clone)]
pub struct MonteCarloResults {
    pub table: ResultsTable,
    /// Density histogram of `rewards`.
    pub figure: Figure,
    /// Total reward per episode, in sampling order.
    pub rewards: Vec<f64>,
    pub terminal_inventories: Vec<f64>,
    pub half_spreads: Vec<f64>,
}

/// Sample `n_episodes` trajectories and summarize them.
pub fn generate_results_table_and_hist(
    env: &dyn Environment,
    agent: &mut dyn Policy,
    generator: &mut dyn TrajectoryGenerator,
    n_episodes: usize,
) -> PlotResult<MonteCarloResults> {
    let cfg = MonteCarloConfig::default().with_episodes(n_episodes);
    run_monte_carlo(env, agent, generator, &cfg)
}

/// Sample `cfg.n_episodes` trajectories sequentially and summarize them.
pub fn run_monte_carlo(
    env: &dyn Environment,
    agent: &mut dyn Policy,
    generator: &mut dyn TrajectoryGenerator,
    cfg: &MonteCarloConfig,
) -> PlotResult<MonteCarloResults> {
    info!(
        episodes = cfg.n_episodes,
        rollouts = env.num_trajectories(),
        steps = env.n_steps(),
        "Starting Monte-Carlo evaluation"
    );

    let bar = if cfg.show_progress {
        progress_bar(cfg.n_episodes as u64)?
    } else {
        ProgressBar::hidden()
    };

    let mut episodes = Vec::with_capacity(cfg.n_episodes);
    for i in 0..cfg.n_episodes {
        let trajectory = generator.generate(env, agent, cfg.seed_for(i))?;
        trajectory.check_against(env)?;
        episodes.push(EpisodeSummary::from(&trajectory));

        bar.inc(1);
        if cfg.log_every > 0 && (i + 1) % cfg.log_every == 0 {
            debug!(done = i + 1, total = cfg.n_episodes, "Monte-Carlo progress");
        }
    }
    bar.finish_and_clear();

    if episodes.is_empty() {
        warn!("Monte-Carlo evaluation ran zero episodes; statistics are NaN");
    }

    let table = ResultsTable::from_episodes(&episodes)?;
    let rewards = episodes.iter().map(|e| e.total_reward).collect::<Vec<_>>();
    let figure = plot_pnl_with_bins(&rewards, None, cfg.bins);

    info!(
        mean_pnl = table.mean_pnl()?,
        std_pnl = table.std_pnl()?,
        "Monte-Carlo evaluation finished"
    );

    Ok(MonteCarloResults {
        table,
        figure,
        terminal_inventories: episodes.iter().map(|e| e.terminal_inventory).collect(),
        half_spreads: episodes.iter().map(|e| e.mean_half_spread).collect(),
        rewards,
    })
}

fn progress_bar(capacity: u64) -> PlotResult<ProgressBar> {
    let bar = ProgressBar::new(capacity);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta_precise}) {msg}")
            .map_err(EnvError::ProgressBar)?
            .progress_chars("#>-"));
    Ok(bar)
}
