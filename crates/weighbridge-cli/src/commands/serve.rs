//! Serve command - run the web service.

use std::sync::Arc;

use clap::Args;
use tokio::net::TcpListener;
use tracing::info;

use weighbridge_core::TicketPipeline;

use super::config;
use crate::server::{self, AppState};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides server.bind)
    #[arg(short, long)]
    bind: Option<String>,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = config::load(config_path)?;
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());

    let pipeline = TicketPipeline::from_config(&config)?;
    info!("Reports are stored in {}", pipeline.store().dir().display());

    let state = AppState::new(Arc::new(pipeline));
    let app = server::router(state, config.server.max_upload_bytes);

    let listener = TcpListener::bind(&bind).await?;
    info!("Weighbridge service listening on {}", bind);
    println!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
