// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP endpoint handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use futures::stream;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::browser::{BrowserConfig, ScanInput};
use crate::error::Error;
use crate::markup::find_frame_locators;
use crate::scanner::{run_scan_until, EventSink, ScanEvent, ScanOptions};

use super::events::{to_sse, ServerEvent};
use super::results::ScanResults;
use super::sessions::{ScanStatus, SessionStore};
use super::AppState;

/// Maps an [`Error`] to an HTTP status code and JSON error body
pub fn error_to_response(err: &Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::HtmlParse(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "success": false, "error": err.to_string() })))
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Session not found" }))).into_response()
}

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": "ok", "version": crate::VERSION })),
    )
}

// ---------------------------------------------------------------------------
// Scans
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StartScanRequest {
    pub url: Option<String>,
    pub html_source: Option<String>,
    pub search_text: Option<String>,
    pub headless: Option<bool>,
}

pub async fn start_scan(
    State(state): State<AppState>,
    Json(body): Json<StartScanRequest>,
) -> Response {
    let input = match ScanInput::from_parts(non_blank(body.url), non_blank(body.html_source)) {
        Ok(input) => input,
        Err(_) => return bad_request("Either URL or HTML source is required"),
    };
    let Some(search_text) = non_blank(body.search_text) else {
        return bad_request("Search text is required");
    };

    let mut browser = state.config.browser.clone();
    if let Some(headless) = body.headless {
        browser = browser.headless(headless);
    }

    let id = state.sessions.create(&input, &search_text);
    let cancel = state.sessions.cancel_token(&id).unwrap_or_default();
    tokio::spawn(run_background(
        Arc::clone(&state.sessions),
        id,
        browser,
        state.config.options.clone(),
        input,
        search_text,
        cancel,
    ));

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "session_id": id,
            "message": "Scan started successfully"
        })),
    )
        .into_response()
}

/// Run one scan and record its outcome in the store
pub async fn run_background(
    sessions: Arc<SessionStore>,
    id: Uuid,
    browser: BrowserConfig,
    options: ScanOptions,
    input: ScanInput,
    search_text: String,
    cancel: CancellationToken,
) {
    let (tx, rx) = broadcast::channel(sessions.event_capacity());
    let forwarder = tokio::spawn(forward_events(Arc::clone(&sessions), id, rx));

    sessions.publish(
        &id,
        ServerEvent::Started {
            session_id: id,
            input_type: if input.url().is_some() { "url" } else { "html_source" },
        },
    );

    let outcome = run_scan_until(
        browser,
        options,
        &input,
        Some(&search_text),
        EventSink::new(tx),
        cancel,
    )
    .await;
    // The sink is gone; drain what is left before the final status
    let _ = forwarder.await;

    match outcome {
        Ok(report) => sessions.complete(&id, ScanResults::from(&report)),
        Err(Error::Cancelled) => info!(session = %id, "scan cancelled"),
        Err(e) => {
            error!(session = %id, error = %e, "scan failed");
            sessions.fail(&id, e.to_string());
        }
    }
}

/// Relay scanner events to the session until the scanner hangs up
async fn forward_events(
    sessions: Arc<SessionStore>,
    id: Uuid,
    mut rx: broadcast::Receiver<ScanEvent>,
) {
    loop {
        match rx.recv().await {
            Ok(ScanEvent::Phase {
                phase,
                progress,
                message,
            }) => sessions.update(&id, ScanStatus::from(phase), progress, message),
            Ok(ScanEvent::Log {
                level,
                message,
                timestamp,
            }) => {
                sessions.touch(&id);
                sessions.publish(
                    &id,
                    ServerEvent::Log {
                        message,
                        level,
                        timestamp: timestamp.with_timezone(&Local).format("%H:%M:%S").to_string(),
                    },
                );
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(session = %id, missed, "scan events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

pub async fn scan_status(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let Some(session) = parse_id(&raw).and_then(|id| state.sessions.get(&id)) else {
        return not_found();
    };
    Json(json!({
        "session_id": session.id,
        "status": session.status,
        "progress": session.progress,
        "message": session.message,
        "phase": session.phase,
        "start_time": session.start_time.to_rfc3339(),
        "error": session.error,
    }))
    .into_response()
}

pub async fn scan_results(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let Some(session) = parse_id(&raw).and_then(|id| state.sessions.get(&id)) else {
        return not_found();
    };
    if session.status != ScanStatus::Completed {
        return bad_request("Scan not completed yet");
    }
    Json(json!({
        "session_id": session.id,
        "results": session.results,
        "scan_info": {
            "url": session.url,
            "html_source_preview": session.html_source_preview,
            "search_text": session.search_text,
            "start_time": session.start_time.to_rfc3339(),
        }
    }))
    .into_response()
}

pub async fn stop_scan(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let stopped = parse_id(&raw).map(|id| state.sessions.stop(&id)).unwrap_or(false);
    if !stopped {
        return not_found();
    }
    Json(json!({ "success": true, "message": "Scan stopped" })).into_response()
}

/// Server-sent event stream of one session
///
/// Starts with the current status, then relays live events up to and
/// including the one that finishes the scan.
pub async fn scan_events(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let Some(id) = parse_id(&raw) else {
        return not_found();
    };
    let (Some(rx), Some(session)) = (state.sessions.subscribe(&id), state.sessions.get(&id)) else {
        return not_found();
    };

    let current = ServerEvent::Status {
        session_id: id,
        status: session.status,
        progress: session.progress,
        message: session.message,
    };
    let live = stream::unfold(
        (BroadcastStream::new(rx), session.status.is_terminal()),
        |(mut rx, done)| async move {
            if done {
                return None;
            }
            loop {
                // Lagged receivers skip what they missed
                if let Ok(event) = rx.next().await? {
                    let last = event.is_final();
                    return Some((event, (rx, last)));
                }
            }
        },
    );

    let events = tokio_stream::once(current)
        .chain(live)
        .map(|event| to_sse(&event));
    Sse::new(events).keep_alive(KeepAlive::default()).into_response()
}

// ---------------------------------------------------------------------------
// Static markup
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct FrameLocatorRequest {
    pub html_source: Option<String>,
    pub search_text: Option<String>,
}

pub async fn frame_locators(Json(body): Json<FrameLocatorRequest>) -> Response {
    let Some(html) = non_blank(body.html_source) else {
        return bad_request("html_source is required");
    };
    let Some(search_text) = non_blank(body.search_text) else {
        return bad_request("search_text is required");
    };

    match find_frame_locators(&html, &search_text) {
        Ok(xpaths) => Json(json!({
            "success": true,
            "count": xpaths.len(),
            "xpaths": xpaths,
        }))
        .into_response(),
        Err(e) => error_to_response(&e).into_response(),
    }
}
