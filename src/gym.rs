use ndarray::{Array, Array1};

use crate::error::{EnvError, PlotResult};

pub mod observation;
pub mod trajectory;

pub use observation::{ObservationSignal, PolicyState, QuoteAction};
pub use trajectory::Trajectory;

// ================================================================================================
// Collaborator Contracts
// ================================================================================================

/// Shape-defining attributes of a market-making simulation environment.
///
/// Only the horizon and batch size are read here; the dynamics live with the
/// implementor.
pub trait Environment {
    /// Time horizon of an episode.
    fn terminal_time(&self) -> f64;

    /// Number of decision steps in an episode.
    fn n_steps(&self) -> usize;

    /// Number of rollouts simulated in parallel per call to the generator.
    fn num_trajectories(&self) -> usize;
}

/// A (trained) policy quoting bid and ask half-spreads.
pub trait Policy {
    /// Predict an action for a single state.
    ///
    /// # Arguments
    ///
    /// * `state` - Synthetic or observed state, ordered `(price, cash, inventory, time)`.
    /// * `deterministic` - Request the greedy action instead of a sample. The
    ///   action-surface plotter always passes `true`.
    ///
    /// # Returns
    ///
    /// The quoted half-spreads, plus whatever auxiliary output the policy has
    /// (e.g. a recurrent hidden state). Callers in this crate ignore the latter.
    fn predict(
        &mut self,
        state: &PolicyState,
        deterministic: bool,
    ) -> PlotResult<(QuoteAction, Option<Array1<f64>>)>;
}

impl Policy for Box<dyn Policy> {
    fn predict(
        &mut self,
        state: &PolicyState,
        deterministic: bool,
    ) -> PlotResult<(QuoteAction, Option<Array1<f64>>)> {
        (**self).predict(state, deterministic)
    }
}

/// Rolls a policy through an environment and returns the recorded batch.
pub trait TrajectoryGenerator {
    /// Generate one batch of `env.num_trajectories()` rollouts over `env.n_steps()` steps.
    ///
    /// # Arguments
    ///
    /// * `env` - Environment whose horizon and batch size shape the result.
    /// * `agent` - Policy queried once per rollout and step.
    /// * `seed` - Explicit seed for this batch. `None` leaves seeding to the
    ///   generator; with `Some`, implementations that honour it must be reproducible.
    ///
    /// # Side Effects
    ///
    /// May advance the generator's internal random state and any state held by `agent`.
    fn generate(
        &mut self,
        env: &dyn Environment,
        agent: &mut dyn Policy,
        seed: Option<u64>,
    ) -> PlotResult<Trajectory>;
}

// ================================================================================================
// Timestamps
// ================================================================================================

/// Evenly spaced time axis `0..=terminal_time` with `n_steps + 1` points.
///
/// The length matches the per-step observation arrays of a [`Trajectory`].
pub fn timestamps(env: &dyn Environment) -> PlotResult<Array1<f64>> {
    let terminal_time = env.terminal_time();
    if !terminal_time.is_finite() || terminal_time <= 0.0 {
        return Err(EnvError::InvalidTerminalTime(terminal_time).into());
    }
    let n_steps = env.n_steps();
    if n_steps == 0 {
        return Err(EnvError::NoSteps.into());
    }

    Ok(Array::linspace(0.0, terminal_time, n_steps + 1))
}
