use serde::{Deserialize, Serialize};

/// Log severity derived from message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a record. First matching rule wins, evaluated in order:
/// a `SEVERE:`/`SHOUT:` prefix or a non-null error is Error, then the
/// `WARNING:` and `INFO:` prefixes, and everything else (FINE, FINER,
/// FINEST, CONFIG, unprefixed) is Debug.
#[must_use]
pub fn classify(message: &str, error: Option<&str>) -> Severity {
    if message.starts_with("SEVERE:") || message.starts_with("SHOUT:") || error.is_some() {
        Severity::Error
    } else if message.starts_with("WARNING:") {
        Severity::Warn
    } else if message.starts_with("INFO:") {
        Severity::Info
    } else {
        Severity::Debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severe_and_shout_prefixes_are_error() {
        assert_eq!(classify("SEVERE: it broke", None), Severity::Error);
        assert_eq!(classify("SHOUT: loud", None), Severity::Error);
    }

    #[test]
    fn non_null_error_wins_over_any_prefix() {
        assert_eq!(classify("WARNING: disk low", Some("boom")), Severity::Error);
        assert_eq!(classify("INFO: fine", Some("boom")), Severity::Error);
        assert_eq!(classify("hi", Some("boom")), Severity::Error);
    }

    #[test]
    fn warning_and_info_prefixes() {
        assert_eq!(classify("WARNING: disk low", None), Severity::Warn);
        assert_eq!(classify("INFO: started", None), Severity::Info);
    }

    #[test]
    fn everything_else_is_debug() {
        assert_eq!(classify("FINE: detail", None), Severity::Debug);
        assert_eq!(classify("CONFIG: setup", None), Severity::Debug);
        assert_eq!(classify("plain message", None), Severity::Debug);
        assert_eq!(classify("", None), Severity::Debug);
    }
}
