// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan progress events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Phases of one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Initializing,
    Loading,
    Discovering,
    Searching,
    Finalizing,
    Completed,
}

impl ScanPhase {
    /// Progress percentage reported when the phase starts
    pub fn progress(self) -> u8 {
        match self {
            ScanPhase::Initializing => 5,
            ScanPhase::Loading => 15,
            ScanPhase::Discovering => 30,
            ScanPhase::Searching => 60,
            ScanPhase::Finalizing => 90,
            ScanPhase::Completed => 100,
        }
    }
}

/// Severity of a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// A progress notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    /// Entered a new phase
    Phase {
        phase: ScanPhase,
        progress: u8,
        message: String,
    },
    /// A log line
    Log {
        level: LogLevel,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

/// Optional publisher of [`ScanEvent`]s
///
/// Every message is also written to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<broadcast::Sender<ScanEvent>>,
}

impl EventSink {
    /// Publish on a broadcast channel
    pub fn new(tx: broadcast::Sender<ScanEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Only log, publish nothing
    pub fn none() -> Self {
        Self::default()
    }

    fn send(&self, event: ScanEvent) {
        if let Some(ref tx) = self.tx {
            // No receivers is fine
            let _ = tx.send(event);
        }
    }

    /// Announce a phase change
    pub fn phase(&self, phase: ScanPhase, message: impl Into<String>) {
        let message = message.into();
        info!(phase = ?phase, progress = phase.progress(), "{}", message);
        self.send(ScanEvent::Phase {
            phase,
            progress: phase.progress(),
            message,
        });
    }

    fn log(&self, level: LogLevel, message: String) {
        self.send(ScanEvent::Log {
            level,
            message,
            timestamp: Utc::now(),
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        self.log(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotonic() {
        let phases = [
            ScanPhase::Initializing,
            ScanPhase::Loading,
            ScanPhase::Discovering,
            ScanPhase::Searching,
            ScanPhase::Finalizing,
            ScanPhase::Completed,
        ];
        let progress: Vec<u8> = phases.iter().map(|p| p.progress()).collect();
        assert_eq!(progress, vec![5, 15, 30, 60, 90, 100]);
    }

    #[test]
    fn test_sink_publishes() {
        let (tx, mut rx) = broadcast::channel(8);
        let sink = EventSink::new(tx);
        sink.phase(ScanPhase::Loading, "Loading page");
        sink.warn("careful");

        match tokio_test::block_on(rx.recv()).unwrap() {
            ScanEvent::Phase { progress, .. } => assert_eq!(progress, 15),
            other => panic!("unexpected event: {:?}", other),
        }
        match tokio_test::block_on(rx.recv()).unwrap() {
            ScanEvent::Log { level, message, .. } => {
                assert_eq!(level, LogLevel::Warning);
                assert_eq!(message, "careful");
            }
            other => panic!("unexpected event: {:?}", other),
        }

        // Sending without subscribers must not panic
        EventSink::none().info("nobody listens");
    }
}
