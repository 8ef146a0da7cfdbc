use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters collected while arranging and emitting displays.
#[derive(Debug, Default, Clone)]
pub struct LayoutMetrics {
    arrangements: u64,
    propagations: u64,
    blocks_rendered: u64,
    documents_written: u64,
    writes_skipped: u64,
}

impl LayoutMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_arrangement(&mut self) {
        self.arrangements = self.arrangements.saturating_add(1);
    }

    /// One upward walk that re-arranged `depth` ancestors.
    pub fn record_propagation(&mut self, depth: usize) {
        if depth > 0 {
            self.propagations = self.propagations.saturating_add(depth as u64);
        }
    }

    pub fn record_blocks(&mut self, count: usize) {
        self.blocks_rendered = self.blocks_rendered.saturating_add(count as u64);
    }

    pub fn record_write(&mut self, skipped: bool) {
        if skipped {
            self.writes_skipped = self.writes_skipped.saturating_add(1);
        } else {
            self.documents_written = self.documents_written.saturating_add(1);
        }
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            arrangements: self.arrangements,
            propagations: self.propagations,
            blocks_rendered: self.blocks_rendered,
            documents_written: self.documents_written,
            writes_skipped: self.writes_skipped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub arrangements: u64,
    pub propagations: u64,
    pub blocks_rendered: u64,
    pub documents_written: u64,
    pub writes_skipped: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "layout_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("arrangements".to_string(), json!(self.arrangements));
        map.insert("propagations".to_string(), json!(self.propagations));
        map.insert("blocks_rendered".to_string(), json!(self.blocks_rendered));
        map.insert("documents_written".to_string(), json!(self.documents_written));
        map.insert("writes_skipped".to_string(), json!(self.writes_skipped));
        map
    }
}
