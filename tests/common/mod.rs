#![allow(dead_code)]

use mmplot::prelude::*;
use ndarray::{Array1, Array3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

/// A small Avellaneda-Stoikov style market: arithmetic Brownian mid price,
/// Poisson fills whose intensity decays exponentially with the quoted half-spread.
#[derive(Debug, Clone, Copy)]
pub struct ToyMarket {
    pub terminal_time: f64,
    pub n_steps: usize,
    pub num_trajectories: usize,
    pub initial_price: f64,
    pub initial_cash: f64,
    pub volatility: f64,
    pub arrival_rate: f64,
    pub fill_exponent: f64,
}

impl Default for ToyMarket {
    fn default() -> Self {
        Self {
            terminal_time: 1.0,
            n_steps: 50,
            num_trajectories: 1,
            initial_price: 100.0,
            initial_cash: 100.0,
            volatility: 2.0,
            arrival_rate: 140.0,
            fill_exponent: 1.5,
        }
    }
}

impl ToyMarket {
    pub fn with_rollouts(self, num_trajectories: usize) -> Self {
        Self {
            num_trajectories,
            ..self
        }
    }

    pub fn with_steps(self, n_steps: usize) -> Self {
        Self { n_steps, ..self }
    }
}

impl Environment for ToyMarket {
    fn terminal_time(&self) -> f64 {
        self.terminal_time
    }

    fn n_steps(&self) -> usize {
        self.n_steps
    }

    fn num_trajectories(&self) -> usize {
        self.num_trajectories
    }
}

/// Quotes the same half-spread on both sides regardless of state.
#[derive(Debug, Clone, Copy)]
pub struct SymmetricPolicy {
    pub half_spread: f64,
}

impl Policy for SymmetricPolicy {
    fn predict(
        &mut self,
        _state: &PolicyState,
        _deterministic: bool,
    ) -> PlotResult<(QuoteAction, Option<Array1<f64>>)> {
        Ok((QuoteAction::new(self.half_spread, self.half_spread), None))
    }
}

/// Leans quotes against inventory: wider on the side that would grow the position.
#[derive(Debug, Clone, Copy)]
pub struct InventorySkewPolicy {
    pub half_spread: f64,
    pub skew: f64,
}

impl Policy for InventorySkewPolicy {
    fn predict(
        &mut self,
        state: &PolicyState,
        _deterministic: bool,
    ) -> PlotResult<(QuoteAction, Option<Array1<f64>>)> {
        let lean = self.skew * state.inventory;
        Ok((
            QuoteAction::new(
                (self.half_spread + lean).max(0.0),
                (self.half_spread - lean).max(0.0),
            ),
            None,
        ))
    }
}

/// Rolls a policy through a [`ToyMarket`].
///
/// An explicit seed reseeds from scratch; `None` continues the generator's own stream.
pub struct ToyGenerator {
    market: ToyMarket,
    rng: StdRng,
}

impl ToyGenerator {
    pub fn new(market: ToyMarket, seed: u64) -> Self {
        Self {
            market,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl TrajectoryGenerator for ToyGenerator {
    fn generate(
        &mut self,
        env: &dyn Environment,
        agent: &mut dyn Policy,
        seed: Option<u64>,
    ) -> PlotResult<Trajectory> {
        let mut seeded;
        let rng: &mut StdRng = match seed {
            Some(s) => {
                seeded = StdRng::seed_from_u64(s);
                &mut seeded
            }
            None => &mut self.rng,
        };

        let m = self.market;
        let (rollouts, steps) = (env.num_trajectories(), env.n_steps());
        let dt = env.terminal_time() / steps as f64;
        let price_step = Normal::new(0.0, m.volatility * dt.sqrt())
            .map_err(|e| EnvError::Generation(e.to_string()))?;

        let mut obs = Array3::zeros((rollouts, 4, steps + 1));
        let mut actions = Array3::zeros((rollouts, 2, steps));
        let mut rewards = Array3::zeros((rollouts, 1, steps));

        for r in 0..rollouts {
            let (mut cash, mut inventory, mut price) = (m.initial_cash, 0.0, m.initial_price);
            record(&mut obs, r, 0, cash, inventory, price);

            for t in 0..steps {
                let state = PolicyState {
                    price,
                    cash,
                    inventory,
                    time: t as f64 * dt,
                };
                let (quote, _) = agent.predict(&state, false)?;
                actions[[r, 0, t]] = quote.bid_half_spread;
                actions[[r, 1, t]] = quote.ask_half_spread;

                let wealth_before = cash + inventory * price;

                let bid_fill = (m.arrival_rate * (-m.fill_exponent * quote.bid_half_spread).exp()
                    * dt)
                    .clamp(0.0, 1.0);
                let ask_fill = (m.arrival_rate * (-m.fill_exponent * quote.ask_half_spread).exp()
                    * dt)
                    .clamp(0.0, 1.0);
                if rng.random_bool(bid_fill) {
                    inventory += 1.0;
                    cash -= price - quote.bid_half_spread;
                }
                if rng.random_bool(ask_fill) {
                    inventory -= 1.0;
                    cash += price + quote.ask_half_spread;
                }

                price += price_step.sample(rng);

                rewards[[r, 0, t]] = cash + inventory * price - wealth_before;
                record(&mut obs, r, t + 1, cash, inventory, price);
            }
        }

        Trajectory::new(obs, actions, rewards)
    }
}

fn record(obs: &mut Array3<f64>, r: usize, t: usize, cash: f64, inventory: f64, price: f64) {
    obs[[r, ObservationSignal::CashHolding.index(), t]] = cash;
    obs[[r, ObservationSignal::Inventory.index(), t]] = inventory;
    obs[[r, ObservationSignal::AssetPrice.index(), t]] = price;
}

pub fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

pub fn population_std(xs: &[f64]) -> f64 {
    let mu = mean(xs);
    (xs.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / xs.len() as f64).sqrt()
}
