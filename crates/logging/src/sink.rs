use std::sync::Mutex;

use tracing::{debug, error, info, warn};

use crate::severity::Severity;

/// Platform log sink. The forwarder performs no I/O beyond this call.
pub trait LogSink: Send + Sync {
    fn emit(&self, tag: &str, severity: Severity, text: &str);
}

/// Default sink: forwards through `tracing` with the tag as a field.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, tag: &str, severity: Severity, text: &str) {
        match severity {
            Severity::Debug => debug!(tag, "{text}"),
            Severity::Info => info!(tag, "{text}"),
            Severity::Warn => warn!(tag, "{text}"),
            Severity::Error => error!(tag, "{text}"),
        }
    }
}

/// One captured emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedRecord {
    pub tag: String,
    pub severity: Severity,
    pub text: String,
}

/// In-memory sink that records emissions, for tests and standalone runs.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<EmittedRecord>>,
}

impl MemorySink {
    /// Drain and return everything emitted so far.
    #[must_use]
    pub fn take(&self) -> Vec<EmittedRecord> {
        match self.records.lock() {
            Ok(mut records) => std::mem::take(&mut *records),
            Err(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn emit(&self, tag: &str, severity: Severity, text: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.push(EmittedRecord {
                tag: tag.to_string(),
                severity,
                text: text.to_string(),
            });
        }
    }
}
