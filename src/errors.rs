use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote spreadsheet error{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Remote {
        status: Option<u16>,
        message: String,
    },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Whether the retry executor may re-issue the failed remote call.
    ///
    /// Rate-limit/quota responses and transient server faults qualify;
    /// everything else (bad credentials, malformed request, validation)
    /// propagates immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Remote { status, message } => {
                if matches!(status, Some(429 | 500 | 502 | 503)) {
                    return true;
                }
                let msg = message.to_ascii_lowercase();
                msg.contains("rate limit")
                    || msg.contains("quota")
                    || msg.contains("too many requests")
            }
            Error::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || matches!(
                        e.status().map(|s| s.as_u16()),
                        Some(429 | 500 | 502 | 503)
                    )
            }
            _ => false,
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
