// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Server-sent events for scan sessions

use std::convert::Infallible;

use axum::response::sse::Event;
use serde::Serialize;
use uuid::Uuid;

use crate::scanner::LogLevel;

use super::sessions::ScanStatus;

/// Counts sent with `scan_completed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionSummary {
    pub total_iframes: usize,
    pub accessible_iframes: usize,
    pub total_matches: usize,
}

/// Notification pushed to the clients of one session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ServerEvent {
    Status {
        session_id: Uuid,
        status: ScanStatus,
        progress: u8,
        message: String,
    },
    Log {
        message: String,
        level: LogLevel,
        /// Wall-clock time, `HH:MM:SS`
        timestamp: String,
    },
    Started {
        session_id: Uuid,
        input_type: &'static str,
    },
    Completed {
        session_id: Uuid,
        summary: CompletionSummary,
    },
    Failed {
        session_id: Uuid,
        error: String,
    },
    Stopped {
        session_id: Uuid,
    },
}

impl ServerEvent {
    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Status { .. } => "status_update",
            ServerEvent::Log { .. } => "log_message",
            ServerEvent::Started { .. } => "scan_started",
            ServerEvent::Completed { .. } => "scan_completed",
            ServerEvent::Failed { .. } => "scan_error",
            ServerEvent::Stopped { .. } => "scan_stopped",
        }
    }

    /// Whether no further events follow this one
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            ServerEvent::Completed { .. } | ServerEvent::Failed { .. } | ServerEvent::Stopped { .. }
        )
    }
}

/// Convert a [`ServerEvent`] into an SSE frame
pub fn to_sse(event: &ServerEvent) -> Result<Event, Infallible> {
    let data = serde_json::to_string(event).unwrap_or_default();
    Ok(Event::default().event(event.name()).data(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let id = Uuid::new_v4();
        let status = ServerEvent::Status {
            session_id: id,
            status: ScanStatus::Loading,
            progress: 15,
            message: "Loading".into(),
        };
        assert_eq!(status.name(), "status_update");
        assert!(!status.is_final());
        assert_eq!(ServerEvent::Stopped { session_id: id }.name(), "scan_stopped");
        assert!(ServerEvent::Failed { session_id: id, error: "x".into() }.is_final());
    }

    #[test]
    fn test_payload_is_flat() {
        let event = ServerEvent::Log {
            message: "Found 2 iframe(s) at depth 0".into(),
            level: LogLevel::Info,
            timestamp: "12:00:00".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["level"], "info");
        assert_eq!(json["message"], "Found 2 iframe(s) at depth 0");
        assert!(to_sse(&event).is_ok());
    }
}
