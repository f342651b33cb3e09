use ndarray::{Array1, ArrayView1, array};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

use crate::error::{AgentError, PlotResult};

/// Signal rows of an observation batch.
///
/// The discriminants are the row indices used by the upstream environment and
/// must not be reordered.
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
#[strum(serialize_all = "snake_case")]
pub enum ObservationSignal {
    CashHolding = 0,
    Inventory = 1,
    /// Reserved by the environment, never plotted.
    Unused = 2,
    AssetPrice = 3,
}

impl ObservationSignal {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Synthetic state fed to a policy.
///
/// Serialized for the policy in the order `(price, cash, inventory, time)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyState {
    pub price: f64,
    pub cash: f64,
    pub inventory: f64,
    pub time: f64,
}

impl PolicyState {
    pub fn to_array(&self) -> Array1<f64> {
        array![self.price, self.cash, self.inventory, self.time]
    }
}

impl From<PolicyState> for [f64; 4] {
    fn from(s: PolicyState) -> Self {
        [s.price, s.cash, s.inventory, s.time]
    }
}

/// Bid and ask half-spreads quoted by a policy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuoteAction {
    pub bid_half_spread: f64,
    pub ask_half_spread: f64,
}

impl QuoteAction {
    pub fn new(bid_half_spread: f64, ask_half_spread: f64) -> Self {
        Self {
            bid_half_spread,
            ask_half_spread,
        }
    }

    /// Interpret a raw 2-element policy output as `(bid, ask)`.
    pub fn from_view(raw: ArrayView1<f64>) -> PlotResult<Self> {
        match raw.as_slice() {
            Some(&[bid, ask]) => Ok(Self::new(bid, ask)),
            _ if raw.len() == 2 => Ok(Self::new(raw[0], raw[1])),
            _ => Err(AgentError::MalformedAction(format!(
                "expected 2 half-spreads, got {} values",
                raw.len()
            ))
            .into()),
        }
    }

    pub fn to_array(&self) -> [f64; 2] {
        [self.bid_half_spread, self.ask_half_spread]
    }
}
