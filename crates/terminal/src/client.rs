use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::api::TerminalApi;
use crate::order::{OrderRequest, OrderResult, PriceQuote};

/// HTTP client for the REST bridge in front of the trading terminal.
///
/// Endpoints:
/// - `POST /initialize` (optionally with the terminal installation path)
/// - `POST /symbols/{symbol}/select`
/// - `GET  /symbols/{symbol}/tick` (404 = no quote)
/// - `POST /order`
#[derive(Clone)]
pub struct TerminalClient {
    client: Client,
    base_url: String,
    terminal_path: Option<String>,
}

#[derive(Serialize)]
struct InitializeBody<'a> {
    path: Option<&'a str>,
}

#[derive(Serialize)]
struct SelectBody {
    enable: bool,
}

#[derive(Deserialize)]
struct AckResponse {
    success: bool,
    #[serde(default)]
    message: String,
}

impl TerminalClient {
    pub fn new(base_url: impl Into<String>, terminal_path: Option<String>) -> Self {
        Self {
            // The 10s timeout is the only defence against a hung terminal
            // call stalling a trade worker.
            client: Client::builder()
                .user_agent("signal_copier/0.1.0")
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client."),
            base_url: base_url.into(),
            terminal_path,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TerminalApi for TerminalClient {
    async fn initialize(&self) -> anyhow::Result<()> {
        let url = format!("{}/initialize", self.base_url);
        let body = InitializeBody {
            path: self.terminal_path.as_deref(),
        };

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to reach terminal bridge")?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            error!("Terminal init failed: {}", error_text);
            bail!("terminal init failed: {error_text}");
        }

        let ack = resp
            .json::<AckResponse>()
            .await
            .context("Failed to parse init response")?;
        if !ack.success {
            bail!("terminal init refused: {}", ack.message);
        }
        Ok(())
    }

    async fn ensure_symbol(&self, symbol: &str) -> anyhow::Result<bool> {
        let url = format!("{}/symbols/{}/select", self.base_url, symbol);

        let resp = self
            .client
            .post(&url)
            .json(&SelectBody { enable: true })
            .send()
            .await
            .context("Failed to reach terminal bridge")?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            error!("Symbol select failed: {}", error_text);
            bail!("symbol select failed: {error_text}");
        }

        let ack = resp
            .json::<AckResponse>()
            .await
            .context("Failed to parse select response")?;
        Ok(ack.success)
    }

    async fn tick(&self, symbol: &str) -> anyhow::Result<Option<PriceQuote>> {
        let url = format!("{}/symbols/{}/tick", self.base_url, symbol);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach terminal bridge")?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            error!("Tick fetch failed: {}", error_text);
            bail!("tick fetch failed: {error_text}");
        }

        let quote = resp
            .json::<PriceQuote>()
            .await
            .context("Failed to parse tick response")?;
        debug!("{} quote: bid={} ask={}", symbol, quote.bid, quote.ask);
        Ok(Some(quote))
    }

    async fn order_send(&self, request: &OrderRequest) -> anyhow::Result<OrderResult> {
        let url = format!("{}/order", self.base_url);

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to reach terminal bridge")?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            error!("Order submission failed: {}", error_text);
            bail!("order submission failed: {error_text}");
        }

        let result = resp
            .json::<OrderResult>()
            .await
            .context("Failed to parse order response")?;
        Ok(result)
    }
}
