// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan session store
//!
//! Sessions are created when a scan starts, updated by its background task
//! and removed by the expiry sweep once idle for longer than the TTL.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::browser::ScanInput;
use crate::scanner::ScanPhase;

use super::events::ServerEvent;
use super::results::ScanResults;

/// Characters of submitted HTML kept for display
pub const HTML_PREVIEW_CHARS: usize = 500;

/// Lifecycle state of a scan session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Initializing,
    Loading,
    Discovering,
    Searching,
    Finalizing,
    Completed,
    Error,
    Stopped,
}

impl ScanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Initializing => "initializing",
            ScanStatus::Loading => "loading",
            ScanStatus::Discovering => "discovering",
            ScanStatus::Searching => "searching",
            ScanStatus::Finalizing => "finalizing",
            ScanStatus::Completed => "completed",
            ScanStatus::Error => "error",
            ScanStatus::Stopped => "stopped",
        }
    }

    /// Whether the session has finished one way or another
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Error | ScanStatus::Stopped)
    }
}

impl From<ScanPhase> for ScanStatus {
    fn from(phase: ScanPhase) -> Self {
        match phase {
            ScanPhase::Initializing => ScanStatus::Initializing,
            ScanPhase::Loading => ScanStatus::Loading,
            ScanPhase::Discovering => ScanStatus::Discovering,
            ScanPhase::Searching => ScanStatus::Searching,
            ScanPhase::Finalizing => ScanStatus::Finalizing,
            ScanPhase::Completed => ScanStatus::Completed,
        }
    }
}

/// Submitted HTML shortened for display
pub fn html_preview(html: &str) -> String {
    if html.chars().count() > HTML_PREVIEW_CHARS {
        let head: String = html.chars().take(HTML_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        html.to_string()
    }
}

/// One scan as seen by clients
#[derive(Debug, Clone)]
pub struct ScanSession {
    pub id: Uuid,
    pub status: ScanStatus,
    pub progress: u8,
    pub message: String,
    pub phase: String,
    pub start_time: DateTime<Utc>,
    pub url: String,
    pub html_source_preview: String,
    pub search_text: String,
    pub results: Option<ScanResults>,
    pub error: Option<String>,
    events: broadcast::Sender<ServerEvent>,
    cancel: Option<CancellationToken>,
    touched: Instant,
}

/// Concurrent map of scan sessions
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<Uuid, ScanSession>,
    ttl: Duration,
    event_capacity: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, event_capacity: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            event_capacity: event_capacity.max(1),
        }
    }

    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Register a new session for `input`
    pub fn create(&self, input: &ScanInput, search_text: &str) -> Uuid {
        let id = Uuid::new_v4();
        let (events, _) = broadcast::channel(self.event_capacity);
        let session = ScanSession {
            id,
            status: ScanStatus::Initializing,
            progress: 0,
            message: "Preparing scan...".to_string(),
            phase: "init".to_string(),
            start_time: Utc::now(),
            url: input.url().unwrap_or_default().to_string(),
            html_source_preview: input.html().map(html_preview).unwrap_or_default(),
            search_text: search_text.to_string(),
            results: None,
            error: None,
            events,
            cancel: None,
            touched: Instant::now(),
        };
        self.sessions.insert(id, session);
        info!(session = %id, "scan session created");
        id
    }

    /// Snapshot of a session
    pub fn get(&self, id: &Uuid) -> Option<ScanSession> {
        self.sessions.get(id).map(|s| s.clone())
    }

    pub fn subscribe(&self, id: &Uuid) -> Option<broadcast::Receiver<ServerEvent>> {
        self.sessions.get(id).map(|s| s.events.subscribe())
    }

    /// Send an event to the session's subscribers
    pub fn publish(&self, id: &Uuid, event: ServerEvent) {
        if let Some(session) = self.sessions.get(id) {
            let _ = session.events.send(event);
        }
    }

    /// Token that stops the session's scan
    ///
    /// The scan closes its browser session once the token fires.
    pub fn cancel_token(&self, id: &Uuid) -> Option<CancellationToken> {
        let mut session = self.sessions.get_mut(id)?;
        let token = session.cancel.get_or_insert_with(CancellationToken::new).clone();
        if session.status.is_terminal() {
            token.cancel();
        }
        Some(token)
    }

    /// Move a running session to another phase
    ///
    /// Finished sessions are left alone.
    pub fn update(&self, id: &Uuid, status: ScanStatus, progress: u8, message: impl Into<String>) {
        let Some(mut session) = self.sessions.get_mut(id) else {
            return;
        };
        if session.status.is_terminal() {
            return;
        }
        let message = message.into();
        session.status = status;
        session.phase = status.as_str().to_string();
        session.progress = progress;
        session.message = message.clone();
        session.touched = Instant::now();
        let _ = session.events.send(ServerEvent::Status {
            session_id: *id,
            status,
            progress,
            message,
        });
    }

    /// Mark the session as active
    pub fn touch(&self, id: &Uuid) {
        if let Some(mut session) = self.sessions.get_mut(id) {
            session.touched = Instant::now();
        }
    }

    /// Store the results of a finished scan
    pub fn complete(&self, id: &Uuid, results: ScanResults) {
        self.update(id, ScanStatus::Completed, 100, "Scan completed successfully!");
        let Some(mut session) = self.sessions.get_mut(id) else {
            return;
        };
        if session.status != ScanStatus::Completed {
            return;
        }
        let summary = results.completion_summary();
        session.results = Some(results);
        session.cancel = None;
        let _ = session.events.send(ServerEvent::Completed {
            session_id: *id,
            summary,
        });
    }

    /// Record a fatal scan error
    pub fn fail(&self, id: &Uuid, error: impl Into<String>) {
        let Some(mut session) = self.sessions.get_mut(id) else {
            return;
        };
        if session.status.is_terminal() {
            return;
        }
        let error = error.into();
        session.status = ScanStatus::Error;
        session.message = format!("Error: {}", error);
        session.error = Some(error.clone());
        session.cancel = None;
        session.touched = Instant::now();
        let _ = session.events.send(ServerEvent::Failed {
            session_id: *id,
            error,
        });
    }

    /// Cancel a session's scan
    ///
    /// Returns false when the session does not exist.
    pub fn stop(&self, id: &Uuid) -> bool {
        let Some(mut session) = self.sessions.get_mut(id) else {
            return false;
        };
        if let Some(cancel) = session.cancel.take() {
            cancel.cancel();
        }
        if !session.status.is_terminal() {
            session.status = ScanStatus::Stopped;
            session.message = "Scan stopped by user".to_string();
        }
        session.touched = Instant::now();
        let _ = session.events.send(ServerEvent::Stopped { session_id: *id });
        info!(session = %id, "scan stopped");
        true
    }

    /// Drop sessions idle for longer than the TTL, cancelling their scans
    pub fn sweep(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|id, session| {
            if session.touched.elapsed() < self.ttl {
                return true;
            }
            if let Some(cancel) = session.cancel.take() {
                cancel.cancel();
            }
            debug!(session = %id, "scan session expired");
            false
        });
        before - self.sessions.len()
    }
}
