use asset_uploader::config::{ServerConfig, StorageConfig};
use asset_uploader::infrastructure::storage;
use asset_uploader::services::clock::SystemClock;
use asset_uploader::services::upload_service::UploadService;
use asset_uploader::{AppState, create_app};
use clap::Parser;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Accepts multipart uploads and stores them in S3", long_about = None)]
struct Args {
    /// Listen address, overrides HOST/PORT
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asset_uploader=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Asset Uploader...");

    let mut server_config = ServerConfig::from_env()?;
    if let Some(listen) = args.listen {
        server_config.bind_addr = listen;
    }
    let storage_config = StorageConfig::from_env();

    info!(
        "🛡️  Upload Config: Max Size={}MB, Name Policy={:?}, Credentials={}",
        server_config.max_file_size / 1024 / 1024,
        server_config.name_policy,
        if storage_config.has_credentials() {
            "present"
        } else {
            "missing"
        }
    );

    let storage_service = storage::setup_storage(&storage_config).await;
    let upload_service = Arc::new(UploadService::new(
        storage_service,
        storage_config,
        server_config.name_policy,
        Arc::new(SystemClock::new()),
    ));

    let state = AppState {
        upload_service,
        config: server_config.clone(),
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    let app = create_app(state).layer(trace_layer);

    let listener = tokio::net::TcpListener::bind(server_config.bind_addr).await?;
    info!("✅ Server ready at http://{}", server_config.bind_addr);
    info!("📖 Swagger UI: http://{}/swagger-ui", server_config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
