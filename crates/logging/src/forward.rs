use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    severity::classify,
    sink::LogSink,
};

/// One log record as received over the command channel. Optional fields that
/// arrive malformed simply fall back to these defaults upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "stackTrace", skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

/// Compose the final message body: the message itself, then an `ERROR:`
/// section, then a `STACKTRACE:` section. Section order is fixed.
#[must_use]
pub fn compose(message: &str, error: Option<&str>, stack_trace: Option<&str>) -> String {
    let mut full = message.to_string();
    if let Some(error) = error {
        full.push_str("\nERROR: ");
        full.push_str(error);
    }
    if let Some(stack_trace) = stack_trace {
        full.push_str("\nSTACKTRACE: ");
        full.push_str(stack_trace);
    }
    full
}

/// Forwards UI-side log records to the platform sink. Stateless per call;
/// forwarding never fails.
pub struct LogForwarder {
    sink: Arc<dyn LogSink>,
    default_tag: String,
}

impl LogForwarder {
    pub fn new(sink: Arc<dyn LogSink>, default_tag: impl Into<String>) -> Self {
        Self {
            sink,
            default_tag: default_tag.into(),
        }
    }

    /// Classify, compose, and emit one record.
    pub fn forward(&self, request: &LogRequest) {
        let severity = classify(&request.message, request.error.as_deref());
        let text = compose(
            &request.message,
            request.error.as_deref(),
            request.stack_trace.as_deref(),
        );
        let tag = request.tag.as_deref().unwrap_or(&self.default_tag);
        self.sink.emit(tag, severity, &text);
    }
}
