//! Livedesk entry point.
//!
//! Binary name: `livedesk`
//!
//! Parses configuration, wires the relay and counter services to their
//! Telegram, webhook, and file-backed implementations, spawns the
//! background loops (operator bridge, session janitor, counter timer),
//! and serves the HTTP API until Ctrl+C or SIGTERM.

mod bridge;
mod config;
mod http;
mod state;

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use livedesk_core::clock::SystemClock;
use livedesk_core::counter::CounterEngine;
use livedesk_core::relay::RelayService;
use livedesk_core::session::{janitor, SessionStore};
use livedesk_infra::automation::WebhookNotifier;
use livedesk_infra::counter_file::FileCounterRepository;
use livedesk_infra::telegram::{TelegramChannel, TelegramClient};

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Set up tracing based on verbosity
    let filter = match config.verbose {
        0 if config.quiet => "error",
        0 => "info",
        1 => "info,livedesk=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    if config.webhook_secret.is_none() {
        tracing::warn!("no webhook secret configured, /api/chat-reply accepts unsigned requests");
    }
    if config.webhook_url.is_none() {
        tracing::info!("no webhook URL configured, automation notifications disabled");
    }

    let client = TelegramClient::new(config.bot_token.clone());
    let channel = Arc::new(TelegramChannel::new(
        client.clone(),
        config.admin_chat_id.clone(),
    ));
    let notifier = Arc::new(WebhookNotifier::new(
        config.webhook_url.clone(),
        config.webhook_secret.clone(),
    ));

    let store = Arc::new(SessionStore::new());
    let relay = Arc::new(RelayService::new(
        Arc::clone(&store),
        channel,
        notifier,
    ));

    let counter = Arc::new(CounterEngine::new(
        FileCounterRepository::new(config.counter_state.clone()),
        SystemClock,
    ));
    counter.restore().await;

    let cancel = CancellationToken::new();
    let counter_task = tokio::spawn(Arc::clone(&counter).run(cancel.clone()));
    let janitor_task = tokio::spawn(janitor::run(Arc::clone(&store), cancel.clone()));
    let bridge_task = tokio::spawn(bridge::run(
        client,
        Arc::clone(&relay),
        cancel.clone(),
    ));

    let state = AppState {
        relay,
        counter,
        webhook_secret: config.webhook_secret,
    };
    let router = http::router::build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "livedesk listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    cancel.cancel();
    let _ = tokio::join!(counter_task, janitor_task, bridge_task);

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
