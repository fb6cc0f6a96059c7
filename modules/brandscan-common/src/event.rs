use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnalysisKey, AnalysisMetrics};

/// A scan's five sequenced phases, with the progress range each owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Discovery,
    ContentExtraction,
    BrandSynthesis,
    Analysis,
    Summary,
}

/// Outbound event stream message. Every variant carries `type` as its tag,
/// matching the NDJSON-like wire contract: one message, one JSON object,
/// one `type` field a client switches on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    ScanStarted {
        scan_id: Uuid,
        mode: String,
        url: String,
    },
    Status {
        message: String,
        phase: ScanPhase,
        progress: u8,
    },
    Activity {
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    ScreenshotReady {
        id: String,
        url: String,
    },
    DiscoveryResult {
        key: AnalysisKey,
        analysis: serde_json::Value,
        metrics: AnalysisMetrics,
    },
    KeyResult {
        key: AnalysisKey,
        score: u8,
        analysis: String,
        evidence: String,
        confidence: u8,
        recommendation: String,
    },
    Summary {
        text: String,
    },
    QuantitativeSummary {
        keys_analyzed: u32,
        strong_keys: u32,
        weak_keys: u32,
    },
    Complete {
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    Error {
        message: String,
    },
}

impl ScanEvent {
    /// Backpressure classification per the Gateway's drop policy: `activity`
    /// drops first, then `status` is coalesced, everything else is never
    /// dropped.
    pub fn is_droppable(&self) -> bool {
        matches!(self, ScanEvent::Activity { .. })
    }

    pub fn is_coalescible(&self) -> bool {
        matches!(self, ScanEvent::Status { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanEvent::Complete { .. } | ScanEvent::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_is_droppable_status_is_coalescible() {
        let activity = ScanEvent::Activity {
            message: "fetching".into(),
            timestamp: chrono::Utc::now(),
        };
        assert!(activity.is_droppable());
        assert!(!activity.is_coalescible());

        let status = ScanEvent::Status {
            message: "discovery".into(),
            phase: ScanPhase::Discovery,
            progress: 10,
        };
        assert!(status.is_coalescible());
        assert!(!status.is_droppable());
    }

    #[test]
    fn complete_and_error_are_terminal_and_never_droppable() {
        let complete = ScanEvent::Complete {
            message: "done".into(),
            timestamp: chrono::Utc::now(),
        };
        let error = ScanEvent::Error {
            message: "nope".into(),
        };
        assert!(complete.is_terminal());
        assert!(error.is_terminal());
        assert!(!complete.is_droppable());
        assert!(!error.is_droppable());
    }

    #[test]
    fn serializes_with_snake_case_type_tag() {
        let event = ScanEvent::Summary {
            text: "hello".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "summary");
        assert_eq!(json["text"], "hello");
    }
}
