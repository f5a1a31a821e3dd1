use std::sync::Arc;

use dotenvy::dotenv;
use tokio::sync::broadcast;
use tracing::{debug, info};

use common::actors::ActorType;
use common::logger;
use common::models::TradeSignal;
use common::settings::Settings;
use signals::{SignalParser, SymbolTable};
use terminal::{ExecutionGateway, TerminalClient, TradePolicy};

use crate::actors::supervisor::Supervisor;
use crate::services::execution_service::ExecutionService;
use crate::services::listener_service::ListenerService;

mod actors;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::setup_logger();
    dotenv().ok();
    debug!("System starting up...");

    let settings = Settings::from_env()?;
    info!("Bot is connecting...");

    let symbols = match settings.symbol_aliases.as_deref() {
        Some(spec) => SymbolTable::parse(spec)?,
        None => SymbolTable::default(),
    };
    let parser = Arc::new(SignalParser::new(symbols));

    let (signal_tx, _) = broadcast::channel::<TradeSignal>(256);

    let client = TerminalClient::new(
        settings.terminal_url.clone(),
        settings.terminal_path.clone(),
    );
    let policy = TradePolicy {
        lot_size: settings.lot_size,
        deviation: settings.deviation,
        ..TradePolicy::default()
    };
    let gateway = Arc::new(ExecutionGateway::new(client, policy));

    let mut supervisor = Supervisor::new();

    let settings_for_listener = settings.clone();
    let parser_for_listener = parser.clone();
    let tx_for_listener = signal_tx.clone();
    supervisor.register_actor(
        ActorType::ListenerActor,
        Box::new(move || {
            Box::new(ListenerService::new(
                &settings_for_listener,
                parser_for_listener.clone(),
                tx_for_listener.clone(),
            ))
        }),
    );

    let gateway_for_exec = gateway.clone();
    let tx_for_exec = signal_tx.clone();
    let max_parallel = settings.max_parallel_trades;
    supervisor.register_actor(
        ActorType::ExecutionActor,
        Box::new(move || {
            Box::new(ExecutionService::new(
                gateway_for_exec.clone(),
                max_parallel,
                tx_for_exec.subscribe(),
            ))
        }),
    );

    supervisor.start().await;
    Ok(())
}
