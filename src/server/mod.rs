// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Web orchestrator
//!
//! Runs scans as background tasks and exposes their progress over HTTP and
//! server-sent events. Session state lives in an explicit [`SessionStore`]
//! handed to every handler and task.

pub mod events;
pub mod handlers;
pub mod results;
pub mod sessions;

pub use events::{CompletionSummary, ServerEvent};
pub use results::ScanResults;
pub use sessions::{ScanSession, ScanStatus, SessionStore};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::browser::BrowserConfig;
use crate::error::Result;
use crate::scanner::ScanOptions;

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Idle time after which a session is dropped
    pub session_ttl: Duration,
    /// How often expired sessions are swept
    pub sweep_interval: Duration,
    /// Buffered events per session
    pub event_capacity: usize,
    /// Template for every scan's browser session
    pub browser: BrowserConfig,
    pub options: ScanOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            session_ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
            event_capacity: 256,
            browser: BrowserConfig::default(),
            options: ScanOptions::default(),
        }
    }
}

/// Shared state for handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(config.session_ttl, config.event_capacity)),
            config: Arc::new(config),
        }
    }
}

/// Build the router with all endpoint routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/scans", post(handlers::start_scan))
        .route("/api/scans/{id}/status", get(handlers::scan_status))
        .route("/api/scans/{id}/results", get(handlers::scan_results))
        .route("/api/scans/{id}/stop", post(handlers::stop_scan))
        .route("/api/scans/{id}/events", get(handlers::scan_events))
        .route("/api/markup/frame-locators", post(handlers::frame_locators))
        .with_state(state)
}

/// Periodically drop expired sessions
pub fn spawn_sweeper(sessions: Arc<SessionStore>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = sessions.sweep();
            if removed > 0 {
                debug!(removed, remaining = sessions.len(), "expired scan sessions removed");
            }
        }
    })
}

/// Serve until Ctrl-C
pub async fn serve(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind).await?;
    let local_addr = listener.local_addr()?;
    let sweep_interval = config.sweep_interval;

    let state = AppState::new(config);
    let sweeper = spawn_sweeper(Arc::clone(&state.sessions), sweep_interval);

    info!(addr = %local_addr, "HTTP server starting");
    let served = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await;

    sweeper.abort();
    served?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> (Router, AppState) {
        let config = ServerConfig {
            browser: BrowserConfig::for_testing(),
            ..Default::default()
        };
        let state = AppState::new(config);
        (build_router(state.clone()), state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let (app, _) = app();
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn start_scan_validates_input() {
        let (app, state) = app();

        let (status, body) = send(&app, post_json("/api/scans", json!({ "search_text": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Either URL or HTML source is required");

        let (status, body) = send(
            &app,
            post_json("/api/scans", json!({ "html_source": "<p>x</p>", "search_text": " " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Search text is required");
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn scan_runs_to_completion() {
        let (app, _) = app();
        let (status, body) = send(
            &app,
            post_json(
                "/api/scans",
                json!({
                    "html_source": "<iframe id='a' srcdoc='<p>Hello</p>'></iframe>",
                    "search_text": "Hello"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["session_id"].as_str().unwrap().to_string();

        let mut finished = Value::Null;
        for _ in 0..100 {
            let (_, status) = send(&app, get(&format!("/api/scans/{}/status", id))).await;
            if status["status"] == "completed" {
                finished = status;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(finished["progress"], 100);

        let (status, body) = send(&app, get(&format!("/api/scans/{}/results", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"]["summary"]["total_iframes"], 1);
        assert!(body["results"]["summary"]["total_matches"].as_u64().unwrap() >= 1);
        assert_eq!(body["scan_info"]["search_text"], "Hello");
    }

    #[tokio::test]
    async fn results_unavailable_until_completed() {
        let (app, state) = app();
        let id = state.sessions.create(
            &crate::browser::ScanInput::Url("https://example.com".into()),
            "x",
        );
        let (status, body) = send(&app, get(&format!("/api/scans/{}/results", id))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Scan not completed yet");

        let (status, _) = send(&app, post_json(&format!("/api/scans/{}/stop", id), json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.sessions.get(&id).unwrap().status, ScanStatus::Stopped);

        let (status, _) = send(&app, get("/api/scans/not-a-session/status")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stopped_scan_ends_without_error() {
        let (_, state) = app();
        let input = crate::browser::ScanInput::Html("<iframe srcdoc='<p>x</p>'></iframe>".into());
        let id = state.sessions.create(&input, "x");
        let cancel = state.sessions.cancel_token(&id).unwrap();
        let mut rx = state.sessions.subscribe(&id).unwrap();
        assert!(state.sessions.stop(&id));

        handlers::run_background(
            Arc::clone(&state.sessions),
            id,
            BrowserConfig::for_testing(),
            ScanOptions::default(),
            input,
            "x".into(),
            cancel,
        )
        .await;

        let session = state.sessions.get(&id).unwrap();
        assert_eq!(session.status, ScanStatus::Stopped);
        assert!(session.error.is_none());
        assert!(session.results.is_none());

        let mut names = Vec::new();
        while let Ok(event) = rx.try_recv() {
            names.push(event.name());
        }
        assert!(names.contains(&"scan_stopped"));
        assert!(!names.contains(&"scan_error"));
        assert!(!names.contains(&"scan_completed"));
    }

    #[tokio::test]
    async fn frame_locators_endpoint() {
        let (app, _) = app();
        let (status, body) = send(
            &app,
            post_json(
                "/api/markup/frame-locators",
                json!({
                    "html_source": "<iframe alt='WMS report'></iframe>",
                    "search_text": "wms"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["xpaths"][0], "/html/body/iframe");

        let (status, _) = send(
            &app,
            post_json("/api/markup/frame-locators", json!({ "html_source": "<p></p>" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
