use clap::Parser;
use tokio_util::sync::CancellationToken;

use eventline_engine::bootstrap::Engine;
use eventline_engine::config::EventlineConfig;
use eventline_http::AppState;

#[derive(Parser)]
#[command(name = "eventline-server", about = "Eventline event-processing pipeline server")]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(long, default_value = "config.toml", env = "EVENTLINE_CONFIG")]
    config: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!(config = %cli.config, "loading configuration");
    let config = match EventlineConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to load config");
            std::process::exit(1);
        }
    };

    let engine = match Engine::bootstrap(&config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(error = %e, "failed to bootstrap engine");
            std::process::exit(1);
        }
    };

    let state = AppState {
        ingress: engine.ingress(),
        store: engine.store(),
    };
    let shutdown = CancellationToken::new();
    let mut api = tokio::spawn(eventline_http::run(config.api_port, state, shutdown.clone()));

    tracing::info!(port = config.api_port, "eventline-server started, press Ctrl+C to stop");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down...");
            shutdown.cancel();
            if let Ok(Err(e)) = (&mut api).await {
                tracing::error!(error = %e, "api server error");
            }
        }
        result = &mut api => {
            if let Ok(Err(e)) = result {
                tracing::error!(error = %e, "api server error");
            }
            shutdown.cancel();
        }
    }

    engine.shutdown().await;
}
