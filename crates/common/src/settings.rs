use std::env;

use anyhow::Context;

/// Runtime configuration, read once at startup and passed explicitly to the
/// services that need it.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bot_token: String,
    pub channel_id: i64,
    pub terminal_url: String,
    pub terminal_path: Option<String>,
    pub lot_size: f64,
    pub deviation: u32,
    pub max_parallel_trades: usize,
    pub symbol_aliases: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let bot_token = env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN not set")?;
        let channel_id = env::var("TELEGRAM_CHANNEL_ID")
            .context("TELEGRAM_CHANNEL_ID not set")?
            .parse::<i64>()
            .context("TELEGRAM_CHANNEL_ID must be a number")?;

        let terminal_url =
            env::var("TERMINAL_API_URL").unwrap_or_else(|_| "http://127.0.0.1:6542".to_string());
        let terminal_path = env::var("TERMINAL_PATH").ok();

        let lot_size = match env::var("LOT_SIZE") {
            Ok(v) => v.parse::<f64>().context("LOT_SIZE must be a number")?,
            Err(_) => 0.01,
        };
        let deviation = match env::var("MAX_DEVIATION") {
            Ok(v) => v.parse::<u32>().context("MAX_DEVIATION must be an integer")?,
            Err(_) => 20,
        };
        let max_parallel_trades = match env::var("MAX_PARALLEL_TRADES") {
            Ok(v) => v
                .parse::<usize>()
                .context("MAX_PARALLEL_TRADES must be an integer")?,
            Err(_) => 4,
        };

        let symbol_aliases = env::var("SYMBOL_ALIASES").ok();

        Ok(Self {
            bot_token,
            channel_id,
            terminal_url,
            terminal_path,
            lot_size,
            deviation,
            max_parallel_trades,
            symbol_aliases,
        })
    }
}
