pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use crate::adapters::http::JsonPlaceholderClient;
use crate::config::ServiceConfig;
use crate::utils::error::Result;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/posts", get(routes::list_posts).post(routes::create_post))
        .route("/posts-paginated", get(routes::list_posts_paginated))
        .route("/posts-n-plus-1", get(routes::posts_n_plus_1))
        .route("/posts-with-comments", get(routes::posts_with_comments))
        .route(
            "/posts/{id}",
            get(routes::get_post)
                .patch(routes::patch_post)
                .put(routes::put_post)
                .delete(routes::delete_post),
        )
        .route("/posts/{id}/comments", get(routes::get_post_comments))
        .route("/users/{id}/posts", get(routes::get_user_posts));

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api", api)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds the configured port and serves until Ctrl+C or SIGTERM.
pub async fn serve(config: ServiceConfig) -> Result<()> {
    let client = JsonPlaceholderClient::new(&config)?;
    tracing::info!("Proxying upstream {}", client.base_url());
    if !config.require_auth {
        tracing::warn!("Bearer token check is disabled for mutating routes");
    }

    let address = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(Arc::new(client), config);
    let app = build_router(state);

    tracing::info!("Binding to {}", address);
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Backend listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
