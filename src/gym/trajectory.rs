use ndarray::{Array1, Array2, Array3, ArrayView2, Axis, s};

use crate::{
    error::{DataError, EnvError, PlotResult},
    gym::{Environment, observation::ObservationSignal},
};

/// Bid quotes live at this row of the action batch, asks at the next.
const BID_ROW: usize = 0;
const ASK_ROW: usize = 1;

/// One batch of rollouts recorded by a [`TrajectoryGenerator`](crate::gym::TrajectoryGenerator).
///
/// # Shapes
/// - `observations`: `(rollouts, signals, steps + 1)`, signals indexed by [`ObservationSignal`]
/// - `actions`: `(rollouts, 2, steps)`, bid half-spread then ask half-spread
/// - `rewards`: `(rollouts, 1, steps)`
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    observations: Array3<f64>,
    actions: Array3<f64>,
    rewards: Array3<f64>,
}

impl Trajectory {
    pub fn new(
        observations: Array3<f64>,
        actions: Array3<f64>,
        rewards: Array3<f64>,
    ) -> PlotResult<Self> {
        let (rollouts, signals, obs_len) = observations.dim();
        if signals <= ObservationSignal::AssetPrice.index() || obs_len == 0 {
            return Err(shape_err(
                "observations",
                format!(
                    "(rollouts, >= {}, steps + 1)",
                    ObservationSignal::AssetPrice.index() + 1
                ),
                observations.shape(),
            ));
        }
        let steps = obs_len - 1;

        if actions.dim() != (rollouts, 2, steps) {
            return Err(shape_err(
                "actions",
                format!("({rollouts}, 2, {steps})"),
                actions.shape(),
            ));
        }
        if rewards.dim() != (rollouts, 1, steps) {
            return Err(shape_err(
                "rewards",
                format!("({rollouts}, 1, {steps})"),
                rewards.shape(),
            ));
        }

        Ok(Self {
            observations,
            actions,
            rewards,
        })
    }

    /// Verify that the batch was produced for `env`.
    pub fn check_against(&self, env: &dyn Environment) -> PlotResult<()> {
        if env.num_trajectories() == 0 {
            return Err(EnvError::NoRollouts.into());
        }
        if env.n_steps() == 0 {
            return Err(EnvError::NoSteps.into());
        }
        if self.num_rollouts() != env.num_trajectories() || self.n_steps() != env.n_steps() {
            return Err(shape_err(
                "observations",
                format!(
                    "({}, _, {})",
                    env.num_trajectories(),
                    env.n_steps() + 1
                ),
                self.observations.shape(),
            ));
        }
        Ok(())
    }

    pub fn num_rollouts(&self) -> usize {
        self.observations.len_of(Axis(0))
    }

    pub fn n_steps(&self) -> usize {
        self.actions.len_of(Axis(2))
    }

    pub fn observations(&self) -> &Array3<f64> {
        &self.observations
    }

    pub fn actions(&self) -> &Array3<f64> {
        &self.actions
    }

    pub fn rewards(&self) -> &Array3<f64> {
        &self.rewards
    }

    /// `(rollouts, steps + 1)` view of one observed signal.
    pub fn signal(&self, signal: ObservationSignal) -> ArrayView2<'_, f64> {
        self.observations.index_axis(Axis(1), signal.index())
    }

    pub fn cash_holdings(&self) -> ArrayView2<'_, f64> {
        self.signal(ObservationSignal::CashHolding)
    }

    pub fn inventory(&self) -> ArrayView2<'_, f64> {
        self.signal(ObservationSignal::Inventory)
    }

    pub fn asset_prices(&self) -> ArrayView2<'_, f64> {
        self.signal(ObservationSignal::AssetPrice)
    }

    pub fn bid_half_spreads(&self) -> ArrayView2<'_, f64> {
        self.actions.index_axis(Axis(1), BID_ROW)
    }

    pub fn ask_half_spreads(&self) -> ArrayView2<'_, f64> {
        self.actions.index_axis(Axis(1), ASK_ROW)
    }

    /// Running sum of rewards along the time axis, `(rollouts, steps)`.
    pub fn cumulative_rewards(&self) -> Array2<f64> {
        let mut cum = self.rewards.index_axis(Axis(1), 0).to_owned();
        cum.accumulate_axis_inplace(Axis(1), |&prev, curr| *curr += prev);
        cum
    }

    /// Total reward collected by each rollout.
    pub fn total_rewards(&self) -> Array1<f64> {
        self.rewards.sum_axis(Axis(2)).index_axis_move(Axis(1), 0)
    }

    /// Inventory held at the final observation of each rollout.
    pub fn terminal_inventory(&self) -> Array1<f64> {
        self.inventory().slice(s![.., -1]).to_owned()
    }

    /// Mean absolute half-spread over every quote in the batch.
    ///
    /// `NaN` when the batch holds no quotes.
    pub fn mean_abs_half_spread(&self) -> f64 {
        self.actions.mapv(f64::abs).mean().unwrap_or(f64::NAN)
    }
}

fn shape_err(array: &'static str, expected: String, actual: &[usize]) -> crate::error::PlotError {
    DataError::Shape {
        array,
        expected,
        actual: actual.to_vec(),
    }
    .into()
}
