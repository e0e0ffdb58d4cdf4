//! HTTP surface of the custom handler.
//!
//! The Functions host posts every invocation to `/{FunctionName}` and expects
//! a JSON invocation response back. Known functions always answer 200 so the
//! host acknowledges the queue message.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use queue_relay_core::contract::InvocationRequest;
use queue_relay_core::RelayError;
use tracing::{info, warn};

use crate::handlers::router::{rejected_envelope, FunctionRouter};

pub fn build_app(router: FunctionRouter) -> Router {
    Router::new()
        .route("/:function", post(invoke))
        .with_state(Arc::new(router))
}

pub async fn serve(addr: SocketAddr, router: FunctionRouter) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, functions = ?router.function_names(), "relay host listening");

    axum::serve(listener, build_app(router))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn invoke(
    Path(function): Path<String>,
    State(router): State<Arc<FunctionRouter>>,
    body: Bytes,
) -> Response {
    if !router.contains(&function) {
        warn!(function = %function, "invocation for unknown function");
        return (
            StatusCode::NOT_FOUND,
            format!("no function named '{function}'"),
        )
            .into_response();
    }

    let request = match serde_json::from_slice::<InvocationRequest>(&body) {
        Ok(value) => value,
        Err(error) => {
            let response = rejected_envelope(&function, RelayError::Envelope(error.to_string()));
            return Json(response).into_response();
        }
    };

    match router.dispatch(&function, &request) {
        Some(response) => Json(response).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(error = %error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, stopping relay host");
}
