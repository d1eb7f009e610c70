use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use journal::api::{create_router, AppState};
use journal::classifier::ClassifierProvider;
use journal::config::{ClassifierConfig, Config};
use journal::db::open_store;

#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "Emotion analysis backend for journal entries")]
struct Args {
    /// Bind host, overrides JOURNAL_HOST
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides JOURNAL_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    init_tracing();

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Opening entry store...");
    let store = open_store(&config.store).await?;
    tracing::info!(backend = store.backend_name(), "Entry store ready");

    tracing::info!("Loading emotion classifier: {}...", config.classifier.model);
    let classifier = load_classifier(config.classifier.clone()).await;

    let state = AppState::new(config.clone(), classifier, store);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Journal starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  API docs:     http://{}/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Journal shut down");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "journal=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let (json_layer, fmt_layer) = if json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(fmt_layer)
        .init();
}

/// Model loading blocks on downloads and file IO. A failure leaves the
/// classifier unavailable instead of stopping the service.
async fn load_classifier(config: ClassifierConfig) -> ClassifierProvider {
    let result = tokio::task::spawn_blocking(move || ClassifierProvider::new(&config)).await;

    match result {
        Ok(Ok(classifier)) => classifier,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Emotion classifier failed to load; /analyze_emotion will return 503");
            ClassifierProvider::unavailable(e.to_string())
        }
        Err(e) => {
            tracing::error!(error = %e, "Emotion classifier loader panicked");
            ClassifierProvider::unavailable(format!("Classifier loader failed: {e}"))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
