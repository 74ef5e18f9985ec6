//! Wiring & DI. Entry point: load config, build adapters and the bus, start handlers, poll.
//! No business logic here.

use dotenv::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use tg_bridge::adapters::social::HttpSocialClient;
use tg_bridge::adapters::telegram::{TeloxideChat, run_polling};
use tg_bridge::ports::{ChatPlatform, EventHandler, SocialClient};
use tg_bridge::pubsub::Bus;
use tg_bridge::shared::config::AppConfig;
use tg_bridge::usecases::handlers::telegram::BroadcastConfig;
use tg_bridge::usecases::{
    ChatBroadcastHandler, CommandRouter, ErrorSink, HandlersManager, RouterConfig, SocialHandler,
    spawn_album_pipeline,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found, using process environment"),
    }

    let cfg = AppConfig::load()?;
    cfg.validate()?;
    info!(
        admins = cfg.admins.len(),
        broadcast_channel = cfg.broadcast_channel(),
        prod = cfg.is_prod(),
        "configuration loaded"
    );

    let cancel = CancellationToken::new();
    let bus = Arc::new(Bus::new());

    // --- Chat platform ---
    let bot = Bot::new(cfg.bot_token());
    let chat: Arc<dyn ChatPlatform> = Arc::new(TeloxideChat::new(bot.clone()));

    // --- Delivery handlers (error sink first so setup failures are logged) ---
    let mut handlers: Vec<Arc<dyn EventHandler>> = vec![
        Arc::new(ErrorSink::new(Arc::clone(&bus))),
        Arc::new(ChatBroadcastHandler::new(
            BroadcastConfig {
                channel: cfg.broadcast_channel(),
            },
            Arc::clone(&chat),
            Arc::clone(&bus),
        )),
    ];
    match cfg.social_access_token() {
        Some(token) => {
            let social: Arc<dyn SocialClient> =
                Arc::new(HttpSocialClient::new(cfg.social_api_url_or_default(), token));
            handlers.push(Arc::new(SocialHandler::new(social, Arc::clone(&bus))));
        }
        None => warn!("BRIDGE_SOCIAL_ACCESS_TOKEN not set, social delivery disabled"),
    }
    let manager = Arc::new(HandlersManager::new(Arc::clone(&bus), handlers));
    let mut tasks = manager.start_handlers(cancel.clone());

    // --- Command router + album pipeline ---
    let (albums, album_tasks) =
        spawn_album_pipeline(Arc::clone(&chat), cfg.broadcast_channel(), cancel.clone());
    tasks.extend(album_tasks);
    let router = Arc::new(CommandRouter::new(
        RouterConfig {
            admins: cfg.admin_set(),
        },
        Arc::clone(&chat),
        Arc::clone(&bus),
        albums,
    ));
    router.start().await?;

    let poll_cancel = cancel.clone();
    let poller = tokio::spawn(run_polling(
        bot,
        Arc::clone(&router),
        cfg.poll_timeout_secs_or_default(),
        poll_cancel,
    ));

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    cancel.cancel();
    bus.close();

    if let Err(e) = poller.await {
        warn!(error = %e, "polling task ended abnormally");
    }
    for task in tasks {
        if let Err(e) = task.await {
            warn!(error = %e, "handler task ended abnormally");
        }
    }
    info!("bye");
    Ok(())
}
