use std::fmt;

use serde::{Deserialize, Serialize};

/// Trade direction as it appears in signal text and on the terminal wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// A trade instruction extracted from one chat message.
///
/// Stop-loss and take-profit are always present: a message missing either
/// one never produces a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub symbol: String,
    pub action: Direction,
    pub stop_loss: f64,
    pub take_profit: f64,
}
