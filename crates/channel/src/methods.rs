use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use {
    base64::Engine as _,
    serde_json::Value,
    tracing::{debug, warn},
};

use {
    hostbridge_logging::LogRequest,
    hostbridge_media::SaveRequest,
    hostbridge_protocol::{ErrorShape, ResponseFrame, error_codes, methods},
};

use crate::state::ChannelState;

// ── Types ────────────────────────────────────────────────────────────────────

/// Context passed to every method handler.
pub struct MethodContext {
    pub request_id: String,
    pub method: String,
    pub params: Value,
    pub state: Arc<ChannelState>,
}

/// The result a method handler produces.
pub type MethodResult = Result<Value, ErrorShape>;

/// A boxed async method handler.
pub type HandlerFn =
    Box<dyn Fn(MethodContext) -> Pin<Box<dyn Future<Output = MethodResult> + Send>> + Send + Sync>;

// ── Method registry ──────────────────────────────────────────────────────────

pub struct MethodRegistry {
    handlers: HashMap<String, HandlerFn>,
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodRegistry {
    pub fn new() -> Self {
        let mut reg = Self {
            handlers: HashMap::new(),
        };
        reg.register_defaults();
        reg
    }

    pub fn register(&mut self, method: impl Into<String>, handler: HandlerFn) {
        self.handlers.insert(method.into(), handler);
    }

    /// Route one call by exact method name. Each dispatch is independent
    /// and runs to completion before the response frame exists.
    pub async fn dispatch(&self, ctx: MethodContext) -> ResponseFrame {
        let method = ctx.method.clone();
        let request_id = ctx.request_id.clone();

        let Some(handler) = self.handlers.get(&method) else {
            debug!(method, request_id = %request_id, "method not implemented");
            return ResponseFrame::not_implemented(&request_id);
        };

        debug!(method, request_id = %request_id, "dispatching method");
        match handler(ctx).await {
            Ok(payload) => {
                debug!(method, request_id = %request_id, "method ok");
                ResponseFrame::ok(&request_id, payload)
            },
            Err(err) => {
                warn!(method, request_id = %request_id, code = %err.code, msg = %err.message, "method error");
                ResponseFrame::err(&request_id, err)
            },
        }
    }

    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    fn register_defaults(&mut self) {
        self.register_log_method();
        self.register_save_image_method();
    }

    // ── log ──────────────────────────────────────────────────────────────

    fn register_log_method(&mut self) {
        // Never fails; malformed optional args fall back field by field.
        self.register(
            methods::LOG,
            Box::new(|ctx| {
                Box::pin(async move {
                    let request = log_request_from_params(&ctx.params);
                    ctx.state.log.forward(&request);
                    Ok(Value::Null)
                })
            }),
        );
    }

    // ── saveImage ────────────────────────────────────────────────────────

    fn register_save_image_method(&mut self) {
        self.register(
            methods::SAVE_IMAGE,
            Box::new(|ctx| {
                Box::pin(async move {
                    // bytes is the one required argument; reject before any
                    // storage side effect.
                    let Some(bytes) = ctx.params.get("bytes").and_then(decode_bytes) else {
                        return Err(ErrorShape::new(error_codes::ARG, "bytes is required"));
                    };

                    let request = SaveRequest {
                        bytes,
                        name: string_arg(&ctx.params, "name"),
                        album: string_arg(&ctx.params, "album"),
                    };

                    match ctx.state.media.save(request).await {
                        Ok(saved) => Ok(Value::Bool(saved)),
                        Err(err) => Err(ErrorShape::new(error_codes::IO, err.to_string())),
                    }
                })
            }),
        );
    }
}

// ── Argument extraction ──────────────────────────────────────────────────────

fn string_arg(params: &Value, key: &str) -> Option<String> {
    params.get(key).and_then(Value::as_str).map(str::to_string)
}

fn log_request_from_params(params: &Value) -> LogRequest {
    LogRequest {
        tag: string_arg(params, "tag"),
        message: string_arg(params, "message").unwrap_or_default(),
        error: string_arg(params, "error"),
        stack_trace: string_arg(params, "stackTrace"),
    }
}

/// Binary args arrive either base64-encoded or as a plain integer array,
/// depending on the channel codec on the UI side.
fn decode_bytes(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::String(encoded) => base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .ok(),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect(),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use base64::Engine as _;

    use super::*;

    #[test]
    fn decode_bytes_accepts_base64_and_arrays() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"abc");
        assert_eq!(
            decode_bytes(&Value::String(encoded)),
            Some(b"abc".to_vec())
        );
        assert_eq!(
            decode_bytes(&serde_json::json!([1, 2, 255])),
            Some(vec![1, 2, 255])
        );
    }

    #[test]
    fn decode_bytes_rejects_null_and_out_of_range() {
        assert_eq!(decode_bytes(&Value::Null), None);
        assert_eq!(decode_bytes(&serde_json::json!([1, 256])), None);
        assert_eq!(decode_bytes(&serde_json::json!({"nested": true})), None);
    }

    #[test]
    fn log_params_fall_back_field_by_field() {
        let request = log_request_from_params(&serde_json::json!({
            "message": "hi",
            "tag": 42, // wrong type, falls back to default tag upstream
        }));
        assert_eq!(request.message, "hi");
        assert!(request.tag.is_none());
        assert!(request.error.is_none());

        let empty = log_request_from_params(&Value::Null);
        assert_eq!(empty.message, "");
    }

    #[test]
    fn registry_exposes_exactly_the_two_methods() {
        let registry = MethodRegistry::new();
        assert_eq!(registry.method_names(), vec!["log", "saveImage"]);
    }
}
