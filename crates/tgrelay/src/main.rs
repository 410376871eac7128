use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use tgrelay_core::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tgrelay_core::logging::init("tgrelay")?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        target_chat = %cfg.target_chat_id,
        port = cfg.port,
        "tgrelay starting"
    );

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("shutdown requested");
                    shutdown.cancel();
                }
                Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
            }
        });
    }

    tgrelay_telegram::router::run_webhook(cfg, shutdown).await
}
