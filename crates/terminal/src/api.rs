use async_trait::async_trait;

use crate::order::{OrderRequest, OrderResult, PriceQuote};

/// The trading-terminal surface the gateway drives.
///
/// Kept as a trait so trade execution can be tested against a mock terminal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TerminalApi: Send + Sync {
    /// Ensures a live terminal connection. Idempotent.
    async fn initialize(&self) -> anyhow::Result<()>;

    /// Enables the instrument for quoting. `Ok(false)` means the terminal
    /// does not know the symbol.
    async fn ensure_symbol(&self, symbol: &str) -> anyhow::Result<bool>;

    /// Fetches the current quote. `Ok(None)` means no live price right now.
    async fn tick(&self, symbol: &str) -> anyhow::Result<Option<PriceQuote>>;

    /// Submits the order and returns the terminal's verdict.
    async fn order_send(&self, request: &OrderRequest) -> anyhow::Result<OrderResult>;
}
