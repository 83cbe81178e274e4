use thiserror::Error;

/// Everything that can go wrong inside one polling cycle.
///
/// All variants are recovered locally by the watcher's failure handler:
/// logged, surfaced once per streak over the notifier, followed by a
/// backoff sleep. None of them terminate the process.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("status API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("undocumented homework status: {0:?}")]
    UndocumentedStatus(String),

    #[error("required field missing: {0}")]
    MissingField(&'static str),

    #[error("notification delivery failed: {0}")]
    Notify(String),
}

impl WatchError {
    /// Stable label used when logging a failed cycle.
    pub fn classification(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::HttpStatus { .. } => "http-status",
            Self::MalformedResponse(_) => "malformed-response",
            Self::UndocumentedStatus(_) => "undocumented-status",
            Self::MissingField(_) => "missing-field",
            Self::Notify(_) => "notify",
        }
    }
}

/// Startup configuration errors. The only fatal condition: the process
/// exits non-zero before the polling loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<&'static str>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_labels_are_stable() {
        let cases = [
            (WatchError::HttpStatus { status: 503, body: String::new() }, "http-status"),
            (WatchError::MalformedResponse("x".into()), "malformed-response"),
            (WatchError::UndocumentedStatus("bogus".into()), "undocumented-status"),
            (WatchError::MissingField("status"), "missing-field"),
            (WatchError::Notify("x".into()), "notify"),
        ];
        for (err, label) in cases {
            assert_eq!(err.classification(), label);
        }
    }

    #[test]
    fn missing_env_lists_every_variable() {
        let err = ConfigError::MissingEnv(vec!["PRACTICUM_TOKEN", "TELEGRAM_CHAT_ID"]);
        let msg = err.to_string();
        assert!(msg.contains("PRACTICUM_TOKEN"));
        assert!(msg.contains("TELEGRAM_CHAT_ID"));
    }
}
