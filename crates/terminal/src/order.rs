use common::models::{Direction, TradeSignal};
use serde::{Deserialize, Serialize};

/// Live bid/ask for one instrument, fetched fresh per trade attempt.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PriceQuote {
    pub bid: f64,
    pub ask: f64,
}

/// Static trading parameters applied to every order.
#[derive(Debug, Clone)]
pub struct TradePolicy {
    /// Fixed trade volume in lots.
    pub lot_size: f64,
    /// Maximum allowed slippage in price points.
    pub deviation: u32,
    /// Numeric tag identifying this bot in the terminal's order history.
    pub magic: u64,
    /// Text tag attached to every order.
    pub comment: String,
}

impl Default for TradePolicy {
    fn default() -> Self {
        Self {
            lot_size: 0.01,
            deviation: 20,
            magic: 111_222,
            comment: "tg-signal-copier".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Deal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimePolicy {
    Gtc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FillPolicy {
    Ioc,
}

/// One market-order submission, in the exact JSON shape the bridge forwards
/// to the terminal's order_send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub action: TradeAction,
    pub symbol: String,
    pub volume: f64,
    #[serde(rename = "type")]
    pub order_type: Direction,
    pub price: f64,
    pub sl: f64,
    pub tp: f64,
    pub deviation: u32,
    pub magic: u64,
    pub comment: String,
    pub type_time: TimePolicy,
    pub type_filling: FillPolicy,
}

/// Submission outcome as reported by the terminal.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResult {
    pub retcode: u32,
    #[serde(default)]
    pub order: u64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub comment: String,
}

/// Translates a signal plus a fresh quote into an order request.
///
/// Entry is the side that fills immediately at the displayed quote: ask for
/// a buy, bid for a sell. Pure function, no I/O.
pub fn build_request(
    signal: &TradeSignal,
    quote: &PriceQuote,
    policy: &TradePolicy,
) -> OrderRequest {
    let price = match signal.action {
        Direction::Buy => quote.ask,
        Direction::Sell => quote.bid,
    };

    OrderRequest {
        action: TradeAction::Deal,
        symbol: signal.symbol.clone(),
        volume: policy.lot_size,
        order_type: signal.action,
        price,
        sl: signal.stop_loss,
        tp: signal.take_profit,
        deviation: policy.deviation,
        magic: policy.magic,
        comment: policy.comment.clone(),
        type_time: TimePolicy::Gtc,
        type_filling: FillPolicy::Ioc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sell_signal() -> TradeSignal {
        TradeSignal {
            symbol: "XAUUSD".to_string(),
            action: Direction::Sell,
            stop_loss: 1905.0,
            take_profit: 1890.0,
        }
    }

    #[test]
    fn sell_enters_at_bid() {
        let quote = PriceQuote {
            bid: 1899.5,
            ask: 1900.2,
        };
        let request = build_request(&sell_signal(), &quote, &TradePolicy::default());
        assert_eq!(request.price, 1899.5);
        assert_eq!(request.order_type, Direction::Sell);
    }

    #[test]
    fn buy_enters_at_ask() {
        let signal = TradeSignal {
            action: Direction::Buy,
            ..sell_signal()
        };
        let quote = PriceQuote {
            bid: 1899.5,
            ask: 1900.2,
        };
        let request = build_request(&signal, &quote, &TradePolicy::default());
        assert_eq!(request.price, 1900.2);
    }

    #[test]
    fn translation_is_deterministic() {
        let quote = PriceQuote {
            bid: 1899.5,
            ask: 1900.2,
        };
        let policy = TradePolicy::default();
        let a = build_request(&sell_signal(), &quote, &policy);
        let b = build_request(&sell_signal(), &quote, &policy);
        assert_eq!(a, b);
    }

    #[test]
    fn policy_fields_carry_through() {
        let policy = TradePolicy {
            lot_size: 0.5,
            deviation: 35,
            magic: 7,
            comment: "audit-tag".to_string(),
        };
        let quote = PriceQuote {
            bid: 1.0,
            ask: 1.1,
        };
        let request = build_request(&sell_signal(), &quote, &policy);
        assert_eq!(request.volume, 0.5);
        assert_eq!(request.deviation, 35);
        assert_eq!(request.magic, 7);
        assert_eq!(request.comment, "audit-tag");
    }

    #[test]
    fn serializes_with_terminal_field_names() {
        let quote = PriceQuote {
            bid: 1899.5,
            ask: 1900.2,
        };
        let request = build_request(&sell_signal(), &quote, &TradePolicy::default());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["action"], "DEAL");
        assert_eq!(json["type"], "SELL");
        assert_eq!(json["type_time"], "GTC");
        assert_eq!(json["type_filling"], "IOC");
        assert_eq!(json["sl"], 1905.0);
        assert_eq!(json["tp"], 1890.0);
        assert_eq!(json["deviation"], 20);
        assert_eq!(json["magic"], 111_222);
    }
}
