//! Application entry point for the `krishi-dashboard` service.
//!
//! This binary orchestrates the full startup sequence, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Building the feed client and the dashboard writer
//! - Subscribing to the sensor feed
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Serving requests until Ctrl-C, then releasing the subscription
//!
//! # Environment Variables
//! - `FEED_DATABASE_URL` (**required**) – realtime database base URL
//! - `FEED_PATH` (optional) – feed path (default: `sensorData`)
//! - `FEED_AUTH_TOKEN` (optional) – database auth token appended to the stream URL
//! - `LISTEN_PORT` (optional) – HTTP port (default: 8080)
//! - `EVENT_QUEUE_DEPTH` (optional) – feed to dashboard queue capacity (default: 64)
//! - `DASHBOARD_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `DASHBOARD_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, net::SocketAddr};

use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use anyhow::Result;

use krishi_dashboard::{config, dashboard, routes, FeedClient};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    // Load .env first so it can set the logging variables too
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let client = FeedClient::new(&cfg)
        .map_err(|e| anyhow::anyhow!("Failed to build feed client: {}", e))?;

    let (events, snapshots, writer) = dashboard::spawn(cfg.event_queue_depth);
    let subscription = client.subscribe(events);

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(snapshots);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.listen_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The subscription owns the last feed sender, so releasing it lets the
    // writer drain and exit.
    subscription.unsubscribe().await;
    client.shutdown();
    writer.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Ctrl-C received, shutting down");
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `DASHBOARD_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `DASHBOARD_LOG_LEVEL` env var
///
/// This should be called once at application startup before any logging
/// or tracing macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("DASHBOARD_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to DASHBOARD_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("DASHBOARD_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},hyper=warn,hyper_util=warn,reqwest=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
