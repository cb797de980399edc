pub mod context;
pub mod error;
pub mod routes;
pub mod state;

use anyhow::Context;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use mailbox_core::config::ServiceConfig;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the axum Router with all routes and middleware around `state`.
/// Used by [`serve`] and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(routes::status::get_status))
        .route(
            "/registerDelayedAction",
            post(routes::actions::register_action),
        )
        .route("/actions", get(routes::actions::list_actions))
        .route(
            "/queryDelayedActions",
            post(routes::actions::query_actions),
        )
        .route(
            "/delayedActions/{id}",
            delete(routes::actions::delete_action),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            context::request_context,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("handler panicked: {detail}");
    let body = serde_json::json!({ "error": "internal server error" });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
}

/// Start the mailbox server on the configured port.
pub async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let port = config.require_port()?;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    let actual_port = listener.local_addr()?.port();
    let app = build_router(AppState::new(config));

    tracing::info!("delayed action mailbox listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
