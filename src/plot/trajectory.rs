use ndarray::{Array1, Array2, s};
use tracing::debug;

use crate::{
    error::PlotResult,
    gym::{Environment, Policy, TrajectoryGenerator, timestamps},
    plot::{
        canvas::Canvas,
        figure::{Figure, LineSeries, Panel, SeriesColor, YAxis},
    },
};

/// Name under which [`plot_trajectory`] shows its figure.
pub const TRAJECTORY_FIGURE: &str = "trajectory";

/// Plot-ready arrays derived from one generated trajectory batch.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryView {
    /// `n_steps + 1` points from 0 to the terminal time.
    pub timestamps: Array1<f64>,
    /// `(rollouts, n_steps)`, aligned with `timestamps[1..]`.
    pub cum_rewards: Array2<f64>,
    /// `(rollouts, n_steps + 1)`.
    pub asset_prices: Array2<f64>,
    pub inventory: Array2<f64>,
    pub cash_holdings: Array2<f64>,
    /// `(rollouts, n_steps)`, aligned with `timestamps[..n_steps]`.
    pub bid_half_spreads: Array2<f64>,
    pub ask_half_spreads: Array2<f64>,
}

impl TrajectoryView {
    pub fn num_rollouts(&self) -> usize {
        self.inventory.nrows()
    }

    /// 2x2 grid: cumulative reward, asset price, inventory with cash on a
    /// second axis, quoted half-spreads.
    pub fn figure(&self) -> Figure {
        let n = self.num_rollouts();
        let alpha = |i: usize| (i + 1) as f64 / (n + 1) as f64;

        let ts = &self.timestamps;
        let n_steps = ts.len() - 1;
        let ts_after = ts.slice(s![1..]);
        let ts_before = ts.slice(s![..n_steps]);

        let mut fig = Figure::grid(2, 2);
        let panels = fig.panels_mut();

        let mut cum = Panel::default().with_title("cum_rewards");
        let mut prices = Panel::default().with_title("asset_prices");
        let mut holdings = Panel::default().with_title("inventory and cash holdings");
        let mut spreads = Panel::default().with_title("quoted spreads");
        cum.set_x_desc("time");
        prices.set_x_desc("time");
        holdings
            .set_x_desc("time")
            .set_y_desc("inventory")
            .set_secondary_y_desc("cash")
            .show_legend();
        spreads.set_x_desc("time").set_y_desc("half spread").show_legend();

        for i in 0..n {
            cum.push(LineSeries::new(
                ts_after.iter().copied(),
                self.cum_rewards.row(i).iter().copied(),
                SeriesColor::Palette(i),
            ));
            prices.push(LineSeries::new(
                ts.iter().copied(),
                self.asset_prices.row(i).iter().copied(),
                SeriesColor::Palette(i),
            ));
            holdings
                .push(
                    LineSeries::new(
                        ts.iter().copied(),
                        self.inventory.row(i).iter().copied(),
                        SeriesColor::Red,
                    )
                    .with_label(format!("inventory {i}"))
                    .with_alpha(alpha(i)),
                )
                .push(
                    LineSeries::new(
                        ts.iter().copied(),
                        self.cash_holdings.row(i).iter().copied(),
                        SeriesColor::Blue,
                    )
                    .with_label(format!("cash holdings {i}"))
                    .with_alpha(alpha(i))
                    .on_axis(YAxis::Secondary),
                );
            spreads
                .push(
                    LineSeries::new(
                        ts_before.iter().copied(),
                        self.bid_half_spreads.row(i).iter().copied(),
                        SeriesColor::Red,
                    )
                    .with_label(format!("bid half spread {i}"))
                    .with_alpha(alpha(i)),
                )
                .push(
                    LineSeries::new(
                        ts_before.iter().copied(),
                        self.ask_half_spreads.row(i).iter().copied(),
                        SeriesColor::Blue,
                    )
                    .with_label(format!("ask half spread {i}"))
                    .with_alpha(alpha(i)),
                );
        }

        panels[0] = cum;
        panels[1] = prices;
        panels[2] = holdings;
        panels[3] = spreads;
        fig
    }
}

/// Generate one trajectory batch and derive the arrays the trajectory plot draws.
pub fn trajectory_view(
    env: &dyn Environment,
    agent: &mut dyn Policy,
    generator: &mut dyn TrajectoryGenerator,
    seed: Option<u64>,
) -> PlotResult<TrajectoryView> {
    let timestamps = timestamps(env)?;
    let trajectory = generator.generate(env, agent, seed)?;
    trajectory.check_against(env)?;

    debug!(
        rollouts = trajectory.num_rollouts(),
        steps = trajectory.n_steps(),
        ?seed,
        "Generated trajectory for plotting"
    );

    Ok(TrajectoryView {
        timestamps,
        cum_rewards: trajectory.cumulative_rewards(),
        asset_prices: trajectory.asset_prices().to_owned(),
        inventory: trajectory.inventory().to_owned(),
        cash_holdings: trajectory.cash_holdings().to_owned(),
        bid_half_spreads: trajectory.bid_half_spreads().to_owned(),
        ask_half_spreads: trajectory.ask_half_spreads().to_owned(),
    })
}

pub fn trajectory_figure(
    env: &dyn Environment,
    agent: &mut dyn Policy,
    generator: &mut dyn TrajectoryGenerator,
    seed: Option<u64>,
) -> PlotResult<Figure> {
    Ok(trajectory_view(env, agent, generator, seed)?.figure())
}

/// Generate a trajectory and show its 2x2 overview on `canvas`.
pub fn plot_trajectory(
    canvas: &mut dyn Canvas,
    env: &dyn Environment,
    agent: &mut dyn Policy,
    generator: &mut dyn TrajectoryGenerator,
    seed: Option<u64>,
) -> PlotResult<()> {
    let figure = trajectory_figure(env, agent, generator, seed)?;
    canvas.show(TRAJECTORY_FIGURE, &figure)
}

#[cfg(test)]
mod tests {
    use ndarray::{Array, Array3};

    use super::*;
    use crate::{
        gym::{PolicyState, QuoteAction, Trajectory, tests::FixedEnv},
        plot::{MemoryCanvas, Series},
    };

    struct Flat;

    impl Policy for Flat {
        fn predict(
            &mut self,
            _state: &PolicyState,
            _deterministic: bool,
        ) -> PlotResult<(QuoteAction, Option<Array1<f64>>)> {
            Ok((QuoteAction::new(0.5, 0.5), None))
        }
    }

    /// Emits a fixed ramp regardless of seed.
    struct Ramp;

    impl TrajectoryGenerator for Ramp {
        fn generate(
            &mut self,
            env: &dyn Environment,
            _agent: &mut dyn Policy,
            _seed: Option<u64>,
        ) -> PlotResult<Trajectory> {
            let (r, t) = (env.num_trajectories(), env.n_steps());
            let obs = Array::from_shape_fn((r, 4, t + 1), |(i, sig, k)| (i + sig * k) as f64);
            let actions = Array3::from_elem((r, 2, t), 0.25);
            let rewards = Array3::from_elem((r, 1, t), 1.0);
            Trajectory::new(obs, actions, rewards)
        }
    }

    fn env() -> FixedEnv {
        FixedEnv {
            terminal_time: 1.0,
            n_steps: 4,
            num_trajectories: 3,
        }
    }

    #[test]
    fn view_aligns_series_with_time_axis() {
        let view = trajectory_view(&env(), &mut Flat, &mut Ramp, Some(7)).expect("view");
        assert_eq!(view.timestamps.len(), 5);
        assert_eq!(view.cum_rewards.dim(), (3, 4));
        assert_eq!(view.cum_rewards.row(0).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(view.inventory.dim(), (3, 5));
        assert_eq!(view.bid_half_spreads.dim(), (3, 4));
    }

    #[test]
    fn figure_has_four_panels_with_alpha_ramp() {
        let fig = trajectory_figure(&env(), &mut Flat, &mut Ramp, None).expect("figure");
        assert_eq!(fig.shape(), (2, 2));

        let titles = fig
            .panels()
            .iter()
            .filter_map(|p| p.title.as_deref())
            .collect::<Vec<_>>();
        assert_eq!(
            titles,
            [
                "cum_rewards",
                "asset_prices",
                "inventory and cash holdings",
                "quoted spreads"
            ]
        );

        // One line per rollout, two per rollout on the holdings and spread panels.
        let counts = fig.panels().iter().map(|p| p.series().len()).collect::<Vec<_>>();
        assert_eq!(counts, [3, 3, 6, 6]);

        let holdings = &fig.panels()[2];
        assert!(holdings.has_secondary_axis());
        let alphas = holdings
            .series()
            .iter()
            .filter_map(Series::as_line)
            .filter(|l| l.axis == YAxis::Primary)
            .map(|l| l.alpha)
            .collect::<Vec<_>>();
        assert_eq!(alphas, [0.25, 0.5, 0.75]);

        // Cumulative reward starts at the first step, spreads stop before the last.
        let cum = fig.panels()[0].series()[0].as_line().expect("line");
        assert_eq!(cum.points.first().map(|p| p.0), Some(0.25));
        let bid = fig.panels()[3].series()[0].as_line().expect("line");
        assert_eq!(bid.points.last().map(|p| p.0), Some(0.75));
    }

    #[test]
    fn plot_trajectory_shows_on_canvas() {
        let mut canvas = MemoryCanvas::new();
        plot_trajectory(&mut canvas, &env(), &mut Flat, &mut Ramp, Some(1)).expect("plot");
        assert!(canvas.get(TRAJECTORY_FIGURE).is_some());
    }

    #[test]
    fn rollout_count_mismatch_is_an_error() {
        struct Short;
        impl TrajectoryGenerator for Short {
            fn generate(
                &mut self,
                _env: &dyn Environment,
                _agent: &mut dyn Policy,
                _seed: Option<u64>,
            ) -> PlotResult<Trajectory> {
                Trajectory::new(
                    Array3::zeros((1, 4, 5)),
                    Array3::zeros((1, 2, 4)),
                    Array3::zeros((1, 1, 4)),
                )
            }
        }

        assert!(trajectory_view(&env(), &mut Flat, &mut Short, None).is_err());
    }
}
