pub mod canvas;
pub mod figure;
pub mod pnl;
pub mod policy;
pub mod render;
pub mod trajectory;

pub use canvas::{Canvas, FileCanvas, MemoryCanvas};
pub use figure::{
    Figure, HistogramBin, HistogramSeries, LineSeries, Panel, Series, SeriesColor, YAxis,
};
pub use pnl::plot_pnl;
pub use policy::{ActionSurface, INVENTORY_LEVELS, plot_policy_actions, policy_action_surface};
pub use trajectory::{TrajectoryView, plot_trajectory, trajectory_figure, trajectory_view};
