//! Test utilities for luma-core
//!
//! Provides a mock Gemini server that speaks the `generateContent` API, for
//! integration tests and for running the CLI offline.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// API key the mock server rejects with a 400
pub const INVALID_API_KEY: &str = "invalid-key";

#[derive(Clone, Default)]
struct ServerState {
    reply: Option<String>,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// Mock Gemini server for testing and development
pub struct MockGeminiServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Value>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGeminiServer {
    /// Start the mock server on an available port
    ///
    /// Replies echo the last user turn.
    pub async fn start() -> Self {
        Self::spawn(ServerState::default()).await
    }

    /// Start a server that always answers with `reply`
    pub async fn with_reply(reply: &str) -> Self {
        Self::spawn(ServerState {
            reply: Some(reply.to_string()),
            ..Default::default()
        })
        .await
    }

    async fn spawn(state: ServerState) -> Self {
        let requests = state.requests.clone();
        let app = Router::new()
            .route(
                "/v1beta/models/:model",
                get(handle_model).post(handle_generate),
            )
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request bodies received so far
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn invalid_key() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })),
    )
        .into_response()
}

/// Model metadata endpoint (health check)
async fn handle_model(
    Path(model): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if query.get("key").map(String::as_str) == Some(INVALID_API_KEY) {
        return invalid_key();
    }
    Json(json!({
        "name": format!("models/{}", model),
        "displayName": model,
    }))
    .into_response()
}

/// `{model}:generateContent` endpoint
async fn handle_generate(
    State(state): State<ServerState>,
    Path(model_action): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    state.requests.lock().unwrap().push(body.clone());

    if query.get("key").map(String::as_str) == Some(INVALID_API_KEY) {
        return invalid_key();
    }
    if !model_action.ends_with(":generateContent") {
        return (StatusCode::NOT_FOUND, "unknown action").into_response();
    }

    let text = state.reply.clone().unwrap_or_else(|| {
        let last_user = body["contents"]
            .as_array()
            .and_then(|turns| turns.iter().rev().find(|t| t["role"] == "user"))
            .and_then(|t| t["parts"][0]["text"].as_str())
            .unwrap_or_default();
        format!("Eco: {}", last_user)
    });

    Json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }]
    }))
    .into_response()
}
