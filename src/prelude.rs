// 1. Traits
pub use crate::gym::{Environment, Policy, TrajectoryGenerator};
pub use crate::plot::Canvas;
pub use crate::report::io::{Report, ReportName, ToCsv, ToJson, ToSchema};

// 2. Trajectory Types
pub use crate::gym::{ObservationSignal, PolicyState, QuoteAction, Trajectory, timestamps};

// 3. Plotting
pub use crate::plot::{
    ActionSurface, FileCanvas, Figure, MemoryCanvas, TrajectoryView, plot_pnl,
    plot_policy_actions, plot_trajectory, policy_action_surface, trajectory_figure,
    trajectory_view,
};

// 4. Monte-Carlo Reports
pub use crate::report::results::{
    EpisodeSummary, MonteCarloResults, ResultsCol, ResultsTable, generate_results_table_and_hist,
    run_monte_carlo,
};

// 5. Errors
pub use crate::error::{AgentError, DataError, EnvError, IoError, PlotError, PlotResult, RenderError};

// 6. Configs
pub use crate::config::{MonteCarloConfig, OutputFormat, PlotConfig};
