pub mod handlers;
mod types;

pub use types::{ErrorResponse, HealthResponse, ProcessImageResponse};

use crate::{
    Result,
    config::Config,
    llm::OpenAiClient,
    ocr::GoogleVisionClient,
    pipeline::InvoicePipeline,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/process-image", post(handlers::process_image))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    // Initialize OCR client
    let extractor = GoogleVisionClient::new(&config.ocr, config.ocr.credentials()?)?;
    info!("Vision OCR client initialized ({})", config.ocr.endpoint);

    // Initialize LLM client
    let generator = OpenAiClient::new(&config.llm)?;
    info!("LLM client initialized (model: {})", generator.model());

    let pipeline = InvoicePipeline::new(
        Arc::new(extractor),
        Arc::new(generator),
        config.llm.template()?,
    );

    let app_state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let app = router(app_state, config.server.max_upload_bytes);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
