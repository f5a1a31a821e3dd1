use common::models::TradeSignal;
use thiserror::Error;
use tracing::debug;

use crate::api::TerminalApi;
use crate::order::{OrderResult, TradePolicy, build_request};
use crate::retcode::ReturnCode;

/// Why one trade attempt was abandoned. Never fatal to the process; the
/// caller logs it and waits for the next signal.
#[derive(Debug, Error)]
pub enum TradeError {
    #[error("terminal unavailable: {0}")]
    Terminal(String),

    #[error("symbol {0} not available in terminal")]
    SymbolUnavailable(String),

    #[error("no current quote for {0}")]
    QuoteUnavailable(String),

    #[error("order rejected with {code}: {message}")]
    Rejected { code: ReturnCode, message: String },
}

/// Drives one trade end to end against the terminal.
pub struct ExecutionGateway<A> {
    api: A,
    policy: TradePolicy,
}

impl<A: TerminalApi> ExecutionGateway<A> {
    pub fn new(api: A, policy: TradePolicy) -> Self {
        Self { api, policy }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Connect, enable the instrument, fetch a quote, translate, submit,
    /// interpret. Any failure aborts this trade only; no retries.
    pub async fn execute(&self, signal: &TradeSignal) -> Result<OrderResult, TradeError> {
        self.api
            .initialize()
            .await
            .map_err(|e| TradeError::Terminal(e.to_string()))?;

        let enabled = self
            .api
            .ensure_symbol(&signal.symbol)
            .await
            .map_err(|e| TradeError::Terminal(e.to_string()))?;
        if !enabled {
            return Err(TradeError::SymbolUnavailable(signal.symbol.clone()));
        }

        let quote = self
            .api
            .tick(&signal.symbol)
            .await
            .map_err(|e| TradeError::Terminal(e.to_string()))?
            .ok_or_else(|| TradeError::QuoteUnavailable(signal.symbol.clone()))?;

        let request = build_request(signal, &quote, &self.policy);
        debug!("Submitting order: {:?}", request);

        let result = self
            .api
            .order_send(&request)
            .await
            .map_err(|e| TradeError::Terminal(e.to_string()))?;

        let code = ReturnCode::from(result.retcode);
        if !code.is_success() {
            return Err(TradeError::Rejected {
                code,
                message: result.comment,
            });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTerminalApi;
    use crate::order::PriceQuote;
    use common::models::Direction;
    use mockall::predicate::eq;

    fn sell_signal() -> TradeSignal {
        TradeSignal {
            symbol: "XAUUSD".to_string(),
            action: Direction::Sell,
            stop_loss: 1905.0,
            take_profit: 1890.0,
        }
    }

    fn quote() -> PriceQuote {
        PriceQuote {
            bid: 1899.5,
            ask: 1900.2,
        }
    }

    #[tokio::test]
    async fn successful_trade_reports_execution_price() {
        let mut api = MockTerminalApi::new();
        api.expect_initialize().times(1).returning(|| Ok(()));
        api.expect_ensure_symbol()
            .with(eq("XAUUSD"))
            .times(1)
            .returning(|_| Ok(true));
        api.expect_tick()
            .with(eq("XAUUSD"))
            .times(1)
            .returning(|_| Ok(Some(quote())));
        api.expect_order_send()
            .withf(|r| r.price == 1899.5 && r.sl == 1905.0 && r.tp == 1890.0)
            .times(1)
            .returning(|_| {
                Ok(OrderResult {
                    retcode: 10009,
                    order: 42,
                    price: 1899.5,
                    comment: "Request executed".to_string(),
                })
            });

        let gateway = ExecutionGateway::new(api, TradePolicy::default());
        let result = gateway.execute(&sell_signal()).await.unwrap();
        assert_eq!(result.price, 1899.5);
        assert_eq!(result.order, 42);
    }

    #[tokio::test]
    async fn partial_fill_counts_as_success() {
        let mut api = MockTerminalApi::new();
        api.expect_initialize().returning(|| Ok(()));
        api.expect_ensure_symbol().returning(|_| Ok(true));
        api.expect_tick().returning(|_| Ok(Some(quote())));
        api.expect_order_send().returning(|_| {
            Ok(OrderResult {
                retcode: 10010,
                order: 43,
                price: 1899.5,
                comment: String::new(),
            })
        });

        let gateway = ExecutionGateway::new(api, TradePolicy::default());
        assert!(gateway.execute(&sell_signal()).await.is_ok());
    }

    #[tokio::test]
    async fn init_failure_aborts_before_symbol_lookup() {
        let mut api = MockTerminalApi::new();
        api.expect_initialize()
            .times(1)
            .returning(|| Err(anyhow::anyhow!("bridge down")));
        // No other expectations: any later call would panic the mock.

        let gateway = ExecutionGateway::new(api, TradePolicy::default());
        let err = gateway.execute(&sell_signal()).await.unwrap_err();
        assert!(matches!(err, TradeError::Terminal(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn unknown_symbol_aborts_before_quote() {
        let mut api = MockTerminalApi::new();
        api.expect_initialize().returning(|| Ok(()));
        api.expect_ensure_symbol().returning(|_| Ok(false));

        let gateway = ExecutionGateway::new(api, TradePolicy::default());
        let err = gateway.execute(&sell_signal()).await.unwrap_err();
        assert!(
            matches!(err, TradeError::SymbolUnavailable(ref s) if s == "XAUUSD"),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn missing_quote_aborts_before_submission() {
        let mut api = MockTerminalApi::new();
        api.expect_initialize().returning(|| Ok(()));
        api.expect_ensure_symbol().returning(|_| Ok(true));
        api.expect_tick().returning(|_| Ok(None));

        let gateway = ExecutionGateway::new(api, TradePolicy::default());
        let err = gateway.execute(&sell_signal()).await.unwrap_err();
        assert!(matches!(err, TradeError::QuoteUnavailable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn broker_rejection_carries_code_and_message() {
        let mut api = MockTerminalApi::new();
        api.expect_initialize().returning(|| Ok(()));
        api.expect_ensure_symbol().returning(|_| Ok(true));
        api.expect_tick().returning(|_| Ok(Some(quote())));
        api.expect_order_send().returning(|_| {
            Ok(OrderResult {
                retcode: 10016,
                order: 0,
                price: 0.0,
                comment: "Invalid stops".to_string(),
            })
        });

        let gateway = ExecutionGateway::new(api, TradePolicy::default());
        let err = gateway.execute(&sell_signal()).await.unwrap_err();
        match err {
            TradeError::Rejected { code, message } => {
                assert_eq!(code, ReturnCode::InvalidStops);
                assert_eq!(message, "Invalid stops");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }
}
