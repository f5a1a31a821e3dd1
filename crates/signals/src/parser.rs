use common::models::{Direction, TradeSignal};
use regex::Regex;

use crate::normalizer::SymbolTable;

/// Extracts trade signals from raw channel messages.
///
/// A message only becomes a signal when all four parts are found: a
/// direction keyword, a known symbol alias, a stop-loss and a take-profit.
/// Anything else is normal chatter and parses to `None`.
#[derive(Debug)]
pub struct SignalParser {
    symbols: SymbolTable,
    tp_re: Regex,
    sl_re: Regex,
}

impl SignalParser {
    pub fn new(symbols: SymbolTable) -> Self {
        // "STOPLSS" is a typo alias that shows up in live signal feeds.
        let tp_re = Regex::new(r"TP\s*[:=]?\s*(\d+(?:\.\d+)?)").expect("valid TP pattern");
        let sl_re = Regex::new(r"(?:STOP\s*LOSS|STOPLSS|SL)\s*[:=]?\s*(\d+(?:\.\d+)?)")
            .expect("valid SL pattern");
        Self {
            symbols,
            tp_re,
            sl_re,
        }
    }

    pub fn parse(&self, raw: &str) -> Option<TradeSignal> {
        let text = raw.to_uppercase().replace('\n', " ");

        let action = if text.contains("BUY") {
            Direction::Buy
        } else if text.contains("SELL") {
            Direction::Sell
        } else {
            return None;
        };

        let symbol = self.symbols.resolve(&text)?;
        let take_profit = capture_value(&self.tp_re, &text)?;
        let stop_loss = capture_value(&self.sl_re, &text)?;

        Some(TradeSignal {
            symbol: symbol.to_string(),
            action,
            stop_loss,
            take_profit,
        })
    }
}

/// Leftmost match of the label's value band, independently per field.
fn capture_value(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> SignalParser {
        SignalParser::new(SymbolTable::default())
    }

    #[test]
    fn parses_full_signal() {
        let signal = parser().parse("BUY GOLD TP:1950 SL:1900").unwrap();
        assert_eq!(signal.symbol, "XAUUSD");
        assert_eq!(signal.action, Direction::Buy);
        assert_eq!(signal.take_profit, 1950.0);
        assert_eq!(signal.stop_loss, 1900.0);
    }

    #[test]
    fn parses_multiline_lowercase_message() {
        let signal = parser()
            .parse("sell xau\ntp 1890.5\nsl = 1905")
            .unwrap();
        assert_eq!(signal.symbol, "XAUUSD");
        assert_eq!(signal.action, Direction::Sell);
        assert_eq!(signal.take_profit, 1890.5);
        assert_eq!(signal.stop_loss, 1905.0);
    }

    #[test]
    fn accepts_stop_loss_label_variants() {
        let p = parser();
        for text in [
            "SELL US30 TP 33000 SL 34100",
            "SELL US30 TP 33000 STOP LOSS 34100",
            "SELL US30 TP 33000 STOPLSS: 34100",
        ] {
            let signal = p.parse(text).unwrap();
            assert_eq!(signal.stop_loss, 34100.0, "failed for '{text}'");
        }
    }

    #[test]
    fn chatter_without_keywords_is_no_signal() {
        assert_eq!(parser().parse("random chatter with no keywords"), None);
    }

    #[test]
    fn direction_is_mandatory() {
        // Symbol, SL and TP present, but no BUY/SELL anywhere.
        assert_eq!(parser().parse("GOLD TP 1950 SL 1900"), None);
    }

    #[test]
    fn unknown_symbol_is_no_signal() {
        assert_eq!(parser().parse("BUY EURUSD TP 1.09 SL 1.07"), None);
    }

    #[test]
    fn both_levels_are_required() {
        let p = parser();
        assert_eq!(p.parse("BUY GOLD TP 1950"), None);
        assert_eq!(p.parse("BUY GOLD SL 1900"), None);
        assert_eq!(p.parse("BUY GOLD"), None);
    }

    #[test]
    fn buy_keyword_takes_precedence_over_sell() {
        let signal = parser().parse("BUY not SELL gold tp 1950 sl 1900").unwrap();
        assert_eq!(signal.action, Direction::Buy);
    }

    #[test]
    fn leftmost_match_wins_per_field() {
        let signal = parser().parse("SELL XAU TP 1 SL 2 TP 3 SL 4").unwrap();
        assert_eq!(signal.take_profit, 1.0);
        assert_eq!(signal.stop_loss, 2.0);
    }

    #[test]
    fn fractional_levels_parse() {
        let signal = parser().parse("BUY XAU TP=1950.75 SL=1900.25").unwrap();
        assert_eq!(signal.take_profit, 1950.75);
        assert_eq!(signal.stop_loss, 1900.25);
    }
}
