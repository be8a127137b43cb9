mod proxy;
mod settings;

use crate::proxy::{AppState, build_router};
use crate::settings::Settings;
use anyhow::Context;
use log::{error, info};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();
    init_logging();

    let settings = Settings::load();
    let bind = settings.bind.clone();
    info!(
        "upstream timeout {}ms, cache ttl {}s, max {} entries",
        settings.upstream_timeout.as_millis(),
        settings.cache_ttl.as_secs(),
        settings.cache_max_entries
    );

    let app = build_router(Arc::new(AppState::new(settings)));
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("proxy listening on http://{}", listener.local_addr()?);
    info!("  GET /proxy?url=<encoded-url>");
    info!("  GET /team-page");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("proxy server failed")?;

    info!("proxy stopped");
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("teamsync {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "teamsync - caching fetch proxy for athletics team pages

Usage:
  teamsync
  teamsync --help
  teamsync --version

Endpoints (also under /api):
  GET /health
  GET /proxy?url=<encoded-url>
  GET /team-page?fromId=&Team=&SeasonLabel=&siteId=

Environment:
  TEAMSYNC_BIND                  Listen address (default 0.0.0.0:3001)
  TEAMSYNC_UPSTREAM_TIMEOUT_MS   Upstream request bound (default 12000)
  TEAMSYNC_CACHE_TTL_SECS        Cache lifetime per URL (default 300)
  TEAMSYNC_CACHE_MAX_ENTRIES     Cache capacity (default 256)
  TEAMSYNC_TEAM_PAGE_URL         Team page base URL
  TEAMSYNC_TEAM_PAGE_QUERY       Query used when /team-page gets no parameters
  RUST_LOG                       Log filter (default info)"
}
