use std::collections::BTreeMap;

use ndarray::{Array2, ArrayView1, Axis};
use tracing::debug;

use crate::{
    error::PlotResult,
    gym::{Environment, Policy, PolicyState, timestamps},
    plot::{
        canvas::Canvas,
        figure::{Figure, LineSeries, SeriesColor},
    },
};

/// Inventory levels at which the action surface is sampled.
pub const INVENTORY_LEVELS: [i32; 7] = [-3, -2, -1, 0, 1, 2, 3];

/// Reference price and cash of every synthetic state.
const PROBE_PRICE: f64 = 100.0;
const PROBE_CASH: f64 = 100.0;

pub const BID_ACTIONS_FIGURE: &str = "policy_bid_half_spreads";
pub const ASK_ACTIONS_FIGURE: &str = "policy_ask_half_spreads";

/// Deterministic policy output over time, per inventory level.
///
/// Each curve is `(n_steps + 1, 2)`: one row per timestamp, bid then ask.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSurface {
    curves: BTreeMap<i32, Array2<f64>>,
}

impl ActionSurface {
    pub fn curves(&self) -> &BTreeMap<i32, Array2<f64>> {
        &self.curves
    }

    pub fn curve(&self, inventory: i32) -> Option<&Array2<f64>> {
        self.curves.get(&inventory)
    }

    pub fn bid(&self, inventory: i32) -> Option<ArrayView1<'_, f64>> {
        self.curve(inventory).map(|c| c.column(0))
    }

    pub fn ask(&self, inventory: i32) -> Option<ArrayView1<'_, f64>> {
        self.curve(inventory).map(|c| c.column(1))
    }

    /// Bid chart and ask chart, one line per inventory level indexed by step.
    pub fn figures(&self) -> (Figure, Figure) {
        (self.side_figure(0, "bid half spread"), self.side_figure(1, "ask half spread"))
    }

    fn side_figure(&self, column: usize, y_desc: &str) -> Figure {
        let mut fig = Figure::grid(1, 1);
        let panel = &mut fig.panels_mut()[0];
        panel.set_x_desc("step").set_y_desc(y_desc).show_legend();

        for (k, (inventory, curve)) in self.curves.iter().enumerate() {
            let values = curve.index_axis(Axis(1), column);
            panel.push(
                LineSeries::new(
                    (0..values.len()).map(|step| step as f64),
                    values.iter().copied(),
                    SeriesColor::Palette(k),
                )
                .with_label(inventory.to_string()),
            );
        }
        fig
    }
}

/// Query `policy` deterministically at `(price = 100, cash = 100, inventory, t)`
/// for every inventory level and every timestamp of the horizon.
pub fn policy_action_surface(
    policy: &mut dyn Policy,
    env: &dyn Environment,
) -> PlotResult<ActionSurface> {
    let ts = timestamps(env)?;
    let mut curves = BTreeMap::new();

    for inventory in INVENTORY_LEVELS {
        let mut curve = Array2::zeros((ts.len(), 2));
        for (mut row, &time) in curve.rows_mut().into_iter().zip(ts.iter()) {
            let state = PolicyState {
                price: PROBE_PRICE,
                cash: PROBE_CASH,
                inventory: f64::from(inventory),
                time,
            };
            let (action, _) = policy.predict(&state, true)?;
            row[0] = action.bid_half_spread;
            row[1] = action.ask_half_spread;
        }
        curves.insert(inventory, curve);
    }

    debug!(
        levels = INVENTORY_LEVELS.len(),
        steps = ts.len(),
        "Sampled policy action surface"
    );
    Ok(ActionSurface { curves })
}

/// Show the bid and ask action curves of `policy`, in that order.
pub fn plot_policy_actions(
    canvas: &mut dyn Canvas,
    policy: &mut dyn Policy,
    env: &dyn Environment,
) -> PlotResult<ActionSurface> {
    let surface = policy_action_surface(policy, env)?;
    let (bid, ask) = surface.figures();
    canvas.show(BID_ACTIONS_FIGURE, &bid)?;
    canvas.show(ASK_ACTIONS_FIGURE, &ask)?;
    Ok(surface)
}
