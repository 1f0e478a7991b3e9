use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/briefs", get(handlers::list_briefs))
        .route(
            "/api/briefs/:date",
            get(handlers::get_brief).post(handlers::synthesize_brief),
        )
        .route("/api/articles", post(handlers::create_article))
        .route("/api/articles/:date", get(handlers::list_articles))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, addr: &str) -> brief_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Serving briefs on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use brief_core::{Article, Brief, Error, Result};
    pub use crate::{create_app, serve, AppState};
}
