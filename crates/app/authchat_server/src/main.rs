//! authchat server binary.
//!
//! Reads configuration from the environment (and `.env`), lets a few
//! settings be overridden on the command line, and serves the router until
//! Ctrl-C.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "authchat_server", about = "authchat HTTP server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
    bind: String,

    /// Base URL of the downstream inference service.
    #[arg(long, env = "FASTAPI_URL")]
    fastapi_url: Option<String>,

    /// Upper bound on a single downstream chat call, in seconds.
    #[arg(long, env = "CHAT_TIMEOUT_SECS")]
    chat_timeout_secs: Option<u64>,

    /// Directory holding the wasm bundle, served under /static.
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Skip TLS certificate verification towards the inference service.
    ///
    /// For local development against self-signed certificates only.
    #[arg(long, env = "DANGER_ACCEPT_INVALID_DOWNSTREAM_CERTS", default_value_t = false)]
    danger_accept_invalid_downstream_certs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,authchat_api=debug,authchat_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = authchat_api::config::ApiConfig::from_env();
    config.bind_addr = args.bind;
    if let Some(url) = args.fastapi_url {
        config.inference.base_url = url;
    }
    if let Some(secs) = args.chat_timeout_secs {
        config.inference.timeout = Duration::from_secs(secs);
    }
    if args.static_dir.is_some() {
        config.static_dir = args.static_dir;
    }
    config.inference.danger_accept_invalid_certs |= args.danger_accept_invalid_downstream_certs;

    if !config.provider_configured() {
        warn!("AUTH0_CLIENT_ID / AUTH0_ISSUER not set; sign-in will fail");
    }
    if config.inference.danger_accept_invalid_certs {
        warn!("downstream TLS certificate verification is DISABLED; do not use in production");
    }

    info!(
        bind = %config.bind_addr,
        public_url = %config.public_url,
        inference = %config.inference.base_url,
        timeout_secs = config.inference.timeout.as_secs(),
        "starting authchat_server"
    );

    let bind_addr = config.bind_addr.clone();
    let state = authchat_api::AppState::new(config)?;
    let cleanup = state.sign_ins.spawn_cleanup_task();
    let app = authchat_api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    cleanup.abort();
    Ok(())
}
