//! Command-channel protocol definitions.
//!
//! The channel is a reliable, ordered request/response substrate between the
//! embedded UI layer and the native host. All frames are JSON.
//!
//! Frame types:
//! - `RequestFrame`  — UI → host command call
//! - `ResponseFrame` — host → UI command result

use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

pub const PROTOCOL_VERSION: u32 = 1;

/// Default channel identifier. Overridable through `channel.name` in config.
pub const DEFAULT_CHANNEL: &str = "hostbridge/commands";

// ── Methods ──────────────────────────────────────────────────────────────────

pub mod methods {
    pub const LOG: &str = "log";
    pub const SAVE_IMAGE: &str = "saveImage";
}

// ── Error codes ──────────────────────────────────────────────────────────────

pub mod error_codes {
    /// A required argument is absent or unreadable.
    pub const ARG: &str = "ARG";
    /// The underlying write failed mid-operation.
    pub const IO: &str = "IO";
}

// ── Error shape ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorShape {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorShape {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

// ── Frames ───────────────────────────────────────────────────────────────────

/// UI → host command call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFrame {
    pub r#type: String, // always "req"
    pub id: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl RequestFrame {
    pub fn new(
        id: impl Into<String>,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
    ) -> Self {
        Self {
            r#type: "req".into(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

/// Host → UI command result.
///
/// Three terminal shapes: success (`ok` with a payload), error (`ok = false`
/// with an [`ErrorShape`]), and not-implemented (`ok = false`, no error,
/// `notImplemented` set) for method names outside the registered set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFrame {
    pub r#type: String, // always "res"
    pub id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
    #[serde(rename = "notImplemented", skip_serializing_if = "Option::is_none")]
    pub not_implemented: Option<bool>,
}

impl ResponseFrame {
    pub fn ok(id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            r#type: "res".into(),
            id: id.into(),
            ok: true,
            payload: Some(payload),
            error: None,
            not_implemented: None,
        }
    }

    pub fn err(id: impl Into<String>, error: ErrorShape) -> Self {
        Self {
            r#type: "res".into(),
            id: id.into(),
            ok: false,
            payload: None,
            error: Some(error),
            not_implemented: None,
        }
    }

    /// Terminal response for an unrecognized method name. Not an error.
    pub fn not_implemented(id: impl Into<String>) -> Self {
        Self {
            r#type: "res".into(),
            id: id.into(),
            ok: false,
            payload: None,
            error: None,
            not_implemented: Some(true),
        }
    }

    pub fn is_not_implemented(&self) -> bool {
        self.not_implemented == Some(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn not_implemented_carries_no_error() {
        let frame = ResponseFrame::not_implemented("r1");
        assert!(!frame.ok);
        assert!(frame.error.is_none());
        assert!(frame.is_not_implemented());

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["notImplemented"], serde_json::json!(true));
        assert!(json.get("error").is_none());
    }

    #[test]
    fn error_frame_omits_not_implemented_marker() {
        let frame = ResponseFrame::err("r2", ErrorShape::new(error_codes::ARG, "bytes is required"));
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["error"]["code"], "ARG");
        assert!(json.get("notImplemented").is_none());
    }
}
