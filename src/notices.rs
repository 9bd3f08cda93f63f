// Copyright 2026 Zillow Client Contributors
// SPDX-License-Identifier: Apache-2.0

//! Non-fatal warning notices.
//!
//! A `tokio::sync::broadcast` channel carries [`Notice`] values so callers
//! can observe conditions that do not fail a call, such as reads through a
//! deprecated field name. When no subscribers exist, notices are silently
//! dropped. Every notice is also mirrored to `tracing` at warn level by its
//! emit site.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tokio::sync::broadcast;

/// Every notice the crate emits. Serialized to JSON for log and telemetry
/// consumers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notice {
    /// A field was read through a deprecated accessor name.
    DeprecatedField { old: String, new: String },
}

/// Broadcast bus for [`Notice`] values.
///
/// Consumers subscribe independently; emitting never blocks and never
/// fails.
pub struct NoticeBus {
    sender: broadcast::Sender<Notice>,
}

impl NoticeBus {
    /// Create a new bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit a notice to all subscribers. Silently ignores if no subscribers.
    pub fn emit(&self, notice: Notice) {
        let _ = self.sender.send(notice);
    }

    /// Subscribe to receive all future notices.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }
}

static BUS: OnceLock<NoticeBus> = OnceLock::new();

/// The process-wide notice bus.
///
/// Entity accessors emit here so callers can observe deprecation notices
/// without threading a bus handle through construction.
pub fn bus() -> &'static NoticeBus {
    BUS.get_or_init(|| NoticeBus::new(64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_does_not_panic() {
        let bus = NoticeBus::new(16);
        bus.emit(Notice::DeprecatedField {
            old: "zestiamte".to_string(),
            new: "zestimate".to_string(),
        });
    }

    #[test]
    fn test_subscribe_receives_emitted_notice() {
        let bus = NoticeBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(Notice::DeprecatedField {
            old: "a".to_string(),
            new: "b".to_string(),
        });

        let notice = rx.try_recv().unwrap();
        match notice {
            Notice::DeprecatedField { old, new } => {
                assert_eq!(old, "a");
                assert_eq!(new, "b");
            }
        }
    }

    #[test]
    fn test_notice_serialization() {
        let notice = Notice::DeprecatedField {
            old: "zestiamte".to_string(),
            new: "zestimate".to_string(),
        };
        let json = serde_json::to_string(&notice).unwrap();
        assert!(json.contains("DeprecatedField"));
        assert!(json.contains("zestiamte"));

        let parsed: Notice = serde_json::from_str(&json).unwrap();
        match parsed {
            Notice::DeprecatedField { new, .. } => assert_eq!(new, "zestimate"),
        }
    }
}
