//! Test utilities for arka-core
//!
//! Provides a mock Groq chat-completions server with a canned response,
//! used by the AI pipeline tests. The server counts requests so tests can
//! assert that the credential check short-circuits before any network I/O.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use tokio::sync::oneshot;

/// Mock chat-completions server serving one canned response.
pub struct MockChatServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    hits: Arc<AtomicUsize>,
}

struct ServerState {
    status: StatusCode,
    body: String,
    hits: Arc<AtomicUsize>,
}

impl MockChatServer {
    /// Serve a 200 envelope whose assistant message content is `content`.
    pub async fn with_content(content: &str) -> Self {
        let body = serde_json::json!({
            "choices": [ { "message": { "content": content } } ]
        })
        .to_string();
        Self::start(StatusCode::OK, body).await
    }

    /// Serve a 200 response with a raw body (for malformed envelopes).
    pub async fn with_body(body: &str) -> Self {
        Self::start(StatusCode::OK, body.to_string()).await
    }

    /// Serve an arbitrary status code and body.
    pub async fn with_response(status: u16, body: &str) -> Self {
        let status =
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::start(status, body.to_string()).await
    }

    async fn start(status: StatusCode, body: String) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let state = Arc::new(ServerState {
            status,
            body,
            hits: hits.clone(),
        });

        let app = Router::new()
            .route("/v1/chat/completions", post(handle_completion))
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
            shutdown_tx: Some(shutdown_tx),
            hits,
        }
    }

    /// Base URL for this mock server (pass to `GroqClient::with_base_url`).
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of completion requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_completion(State(state): State<Arc<ServerState>>) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (state.status, state.body.clone())
}
