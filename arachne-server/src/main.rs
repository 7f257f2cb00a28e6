use anyhow::{Context, Result};
use arachne_core::ControlPlane;
use arachne_server::build_app;
use arachne_server::commands::{bind_address, command_argument_builder, crawl_options, init_tracing};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = command_argument_builder().get_matches();
    init_tracing(matches.get_count("verbose"));

    let options = crawl_options(&matches);
    info!(
        "Fetch timeout {}s, link policy {:?}",
        options.fetch.timeout_secs, options.link_policy
    );

    let control = ControlPlane::from_options(&options).context("Failed to set up page fetcher")?;
    let app = build_app(Arc::new(control));

    let addr = bind_address(&matches);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Arachne server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Arachne server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
