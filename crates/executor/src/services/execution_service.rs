use std::sync::Arc;

use anyhow::{Context, bail};
use async_trait::async_trait;
use tokio::sync::{Semaphore, broadcast, mpsc};
use tracing::{error, info, warn};
use uuid::Uuid;

use common::actors::{Actor, ActorType, ControlMessage};
use common::models::TradeSignal;
use terminal::{ExecutionGateway, TerminalApi, TerminalClient};

/// Supervised trade executor. Each signal runs on its own task, gated by a
/// semaphore so a burst of signals cannot spawn unbounded work and two
/// close-together signals still execute in parallel.
pub struct ExecutionService {
    gateway: Arc<ExecutionGateway<TerminalClient>>,
    limiter: Arc<Semaphore>,
    signal_rx: broadcast::Receiver<TradeSignal>,
}

impl ExecutionService {
    pub fn new(
        gateway: Arc<ExecutionGateway<TerminalClient>>,
        max_parallel_trades: usize,
        signal_rx: broadcast::Receiver<TradeSignal>,
    ) -> Self {
        Self {
            gateway,
            limiter: Arc::new(Semaphore::new(max_parallel_trades)),
            signal_rx,
        }
    }
}

#[async_trait]
impl Actor for ExecutionService {
    fn name(&self) -> ActorType {
        ActorType::ExecutionActor
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let heartbeat_handle = self.spawn_heartbeat(supervisor_tx.clone());

        info!(
            "Starting Execution Service (terminal at {})",
            self.gateway.api().base_url()
        );

        // Probe the terminal once so a dead bridge shows up before the
        // first signal, not with it.
        match self.gateway.api().initialize().await {
            Ok(()) => info!("Trading terminal reachable"),
            Err(e) => error!("Terminal probe failed: {}", e),
        }

        loop {
            match self.signal_rx.recv().await {
                Ok(signal) => {
                    let permit = self
                        .limiter
                        .clone()
                        .acquire_owned()
                        .await
                        .context("Failed to acquire trade permit")?;

                    let gateway = self.gateway.clone();
                    let tx = supervisor_tx.clone();

                    tokio::spawn(async move {
                        let trade_id = Uuid::new_v4();
                        info!(
                            "[{}] Executing {} {} (SL {}, TP {})",
                            trade_id,
                            signal.action,
                            signal.symbol,
                            signal.stop_loss,
                            signal.take_profit
                        );

                        match gateway.execute(&signal).await {
                            Ok(result) => {
                                info!(
                                    "[{}] EXECUTED {} on {} | Price: {} | Order #{}",
                                    trade_id, signal.action, signal.symbol, result.price, result.order
                                );
                            }
                            Err(e) => {
                                error!("[{}] TRADE FAILED: {}", trade_id, e);
                                let _ = tx
                                    .send(ControlMessage::Error(
                                        ActorType::ExecutionActor,
                                        format!("trade {}: {}", trade_id, e),
                                    ))
                                    .await;
                            }
                        }
                        drop(permit);
                    });
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Execution service lagged: missed {} signals", n);
                }
                Err(_) => {
                    heartbeat_handle.abort();
                    supervisor_tx
                        .send(ControlMessage::Error(
                            self.name(),
                            "Signal channel closed unexpectedly.".to_string(),
                        ))
                        .await?;
                    bail!("Signal channel closed unexpectedly.");
                }
            }
        }
    }
}
