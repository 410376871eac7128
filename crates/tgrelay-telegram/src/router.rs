use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use tgrelay_core::{
    config::Config,
    forward::{dispatcher::Dispatcher, queue, worker::ForwardWorker},
};

use crate::{build_bot, webhook, SourceBot, TelegramDestination};

/// Wire both bots, the worker and the webhook server, then serve until
/// `shutdown` fires.
pub async fn run_webhook(cfg: Arc<Config>, shutdown: CancellationToken) -> anyhow::Result<()> {
    let source = SourceBot::new(build_bot(&cfg.source_bot_token, cfg.request_timeout)?);
    let destination = TelegramDestination::new(build_bot(&cfg.dest_bot_token, cfg.request_timeout)?);

    // Basic startup info.
    match source.username().await {
        Ok(name) => info!(bot = %name, "source bot ready"),
        Err(e) => warn!(error = %e, "could not identify source bot"),
    }
    match destination.username().await {
        Ok(name) => info!(bot = %name, "destination bot ready"),
        Err(e) => warn!(error = %e, "could not identify destination bot"),
    }

    match cfg.webhook_url.as_deref() {
        Some(url) => {
            source
                .register_webhook(url)
                .await
                .with_context(|| format!("failed to set webhook to {url}"))?;
            info!(url, "Webhook set");
        }
        None => warn!("WEBHOOK_URL not set; the webhook must be registered externally"),
    }

    let (queue, inbox) = queue::channel();
    let dispatcher = Dispatcher::new(Arc::new(destination), cfg.target_chat_id);
    let worker = ForwardWorker::new(queue.clone(), inbox, dispatcher, cfg.retry_policy());
    let worker_task = tokio::spawn(worker.run(shutdown.clone()));

    let app = webhook::webhook_router(&cfg.webhook_path, queue);
    let addr = cfg.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, path = %cfg.webhook_path, "relay listening");

    let server_shutdown = shutdown.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
        .await
        .context("webhook server error");

    // Whatever ended the server also ends the worker.
    shutdown.cancel();
    if let Err(e) = worker_task.await {
        error!(error = %e, "forward worker task failed");
    }

    served
}
