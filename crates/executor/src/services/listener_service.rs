use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use teloxide::{dptree, prelude::*};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use common::actors::{Actor, ActorType, ControlMessage};
use common::models::TradeSignal;
use common::settings::Settings;
use signals::SignalParser;

/// Supervised Telegram listener. Receives posts on the configured channel,
/// runs the parser, and publishes detected signals for the execution service.
pub struct ListenerService {
    bot_token: String,
    channel: ChatId,
    parser: Arc<SignalParser>,
    signal_tx: broadcast::Sender<TradeSignal>,
}

struct ListenerCtx {
    channel: ChatId,
    parser: Arc<SignalParser>,
    signal_tx: broadcast::Sender<TradeSignal>,
}

impl ListenerService {
    pub fn new(
        settings: &Settings,
        parser: Arc<SignalParser>,
        signal_tx: broadcast::Sender<TradeSignal>,
    ) -> Self {
        Self {
            bot_token: settings.bot_token.clone(),
            channel: ChatId(settings.channel_id),
            parser,
            signal_tx,
        }
    }
}

async fn on_incoming(msg: Message, ctx: Arc<ListenerCtx>) -> ResponseResult<()> {
    if msg.chat.id != ctx.channel {
        return Ok(());
    }
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let preview: String = text.chars().take(48).collect();
    info!("New message: {}...", preview);

    match ctx.parser.parse(text) {
        Some(signal) => {
            info!("SIGNAL DETECTED: {:?}", signal);
            if ctx.signal_tx.send(signal).is_err() {
                warn!("No execution service subscribed; signal dropped");
            }
        }
        None => debug!("No signal in message"),
    }
    Ok(())
}

#[async_trait]
impl Actor for ListenerService {
    fn name(&self) -> ActorType {
        ActorType::ListenerActor
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let heartbeat_handle = self.spawn_heartbeat(supervisor_tx.clone());

        info!("Starting Telegram Listener (channel {})", self.channel);

        let bot = Bot::new(self.bot_token.clone());
        let ctx = Arc::new(ListenerCtx {
            channel: self.channel,
            parser: self.parser.clone(),
            signal_tx: self.signal_tx.clone(),
        });

        // Channels deliver posts, groups deliver messages; treat both alike.
        let handler = dptree::entry()
            .branch(Update::filter_channel_post().endpoint(on_incoming))
            .branch(Update::filter_message().endpoint(on_incoming));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![ctx])
            .default_handler(|_| async {})
            .build()
            .dispatch()
            .await;

        heartbeat_handle.abort();
        supervisor_tx
            .send(ControlMessage::Error(
                self.name(),
                "Telegram dispatcher stopped unexpectedly.".to_string(),
            ))
            .await?;
        bail!("Telegram dispatcher stopped unexpectedly.");
    }
}
