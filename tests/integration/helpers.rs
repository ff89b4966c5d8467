//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use relay_core::config::AppConfig;
use relay_core::error::AppError;
use relay_core::events::AccountStatus;
use relay_core::types::Identity;
use relay_gateway::MemorySession;
use relay_realtime::TrackerState;
use relay_realtime::server::RealtimeEngine;

/// Account ID of the tracked contact.
pub const TARGET_ID: i64 = 4242;

/// Client side of an observer socket.
pub type ObserverSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Engine behind the router
    pub engine: Arc<RealtimeEngine>,
    /// Scriptable account session
    pub session: Arc<MemorySession>,
    /// Application config
    pub config: Arc<AppConfig>,
}

impl TestApp {
    /// Create an app whose target starts with `status`.
    pub fn new(status: AccountStatus) -> Self {
        Self::with_config(status, |_| {})
    }

    /// Same as [`TestApp::new`] with config overrides.
    pub fn with_config(status: AccountStatus, customize: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.target.identifier = "@alice".to_string();
        config.target.name = "Alice".to_string();
        config.web.static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string();
        customize(&mut config);
        let config = Arc::new(config);

        let session = Arc::new(MemorySession::new().with_contact(
            "@alice",
            Identity::new(TARGET_ID).with_display_name("Alice"),
            status,
        ));
        let engine = Arc::new(RealtimeEngine::new(Arc::clone(&config)));
        let state = relay_api::AppState::new(Arc::clone(&config), Arc::clone(&engine));
        let router = relay_api::build_router(state);

        Self {
            router,
            engine,
            session,
            config,
        }
    }

    /// Start the tracker and wait until it is consuming events.
    pub async fn start_tracker(&self) -> JoinHandle<Result<(), AppError>> {
        let handle = self.engine.spawn_tracker(self.session.clone());
        let mut state = self.engine.tracker_state_receiver();
        tokio::time::timeout(
            Duration::from_secs(5),
            state.wait_for(|s| *s == TrackerState::Running),
        )
        .await
        .expect("tracker did not start in time")
        .expect("tracker state channel closed");
        handle
    }

    /// Make a one-shot request against the router
    pub async fn request(&self, method: &str, path: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            content_type,
            text,
            body,
        }
    }

    /// Serve the router on an ephemeral local port.
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("local addr");
        let router = self.router.clone();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        addr
    }

    /// Wait until the hub holds `count` observers.
    pub async fn wait_for_observers(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.engine.hub.observer_count() != count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("observer count did not settle");
    }
}

/// Response captured from a one-shot request
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: String,
    /// Raw body
    pub text: String,
    /// Parsed JSON body (`Null` when not JSON)
    pub body: Value,
}

/// Connect an observer to a served app.
pub async fn connect(addr: SocketAddr) -> ObserverSocket {
    let (socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("Failed to connect observer");
    socket
}

/// Next snapshot pushed to an observer.
pub async fn next_snapshot(socket: &mut ObserverSocket) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("no snapshot within 5s")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("snapshot json");
        }
    }
}

/// Assert that nothing is pushed for `wait`.
pub async fn assert_silent(socket: &mut ObserverSocket, wait: Duration) {
    if let Ok(frame) = tokio::time::timeout(wait, socket.next()).await {
        panic!("unexpected frame: {frame:?}");
    }
}
