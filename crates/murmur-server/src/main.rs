mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use murmur_api::gemini::{GeminiClient, UnconfiguredGenerator};
use murmur_api::mailer::{HttpMailer, LogMailer, Mailer};
use murmur_api::{AppState, AppStateInner, create_router};
use murmur_types::genai::TextGenerator;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "murmur=debug,murmur_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = murmur_db::Database::open(&config.db_path)?;

    let mailer: Arc<dyn Mailer> = match config.mail {
        Some(mail) => {
            info!("Sending verification mail via {}", mail.endpoint);
            Arc::new(HttpMailer::new(mail.endpoint, mail.api_key, mail.from))
        }
        None => {
            info!("No mail relay configured; verification codes will be logged");
            Arc::new(LogMailer)
        }
    };

    let generator: Arc<dyn TextGenerator> = match config.gemini {
        Some(gemini) => Arc::new(GeminiClient::new(gemini.api_key, gemini.model)),
        None => Arc::new(UnconfiguredGenerator),
    };

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret,
        session_ttl: config.session_ttl,
        verify_code_ttl: config.verify_code_ttl,
        mailer,
        generator,
    });

    let app = create_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Murmur server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, shutting down...");
    }
}
