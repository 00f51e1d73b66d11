use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();
    let audio = ServeDir::new(state.audio_dir.clone());

    Router::new()
        .route(
            "/settings",
            get(handlers::get_settings).post(handlers::update_settings),
        )
        .route("/articles", get(handlers::list_articles))
        .route("/summaries", get(handlers::list_summaries))
        .route("/process", post(handlers::process))
        .route("/voices/:provider", get(handlers::list_voices))
        .nest_service("/audio", audio)
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, addr: SocketAddr) -> nn_core::Result<()> {
    let app = create_app(state).await;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 API listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use nn_core::{Error, Result};
}
