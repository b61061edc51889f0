use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImdsError>;

#[derive(Debug, Error)]
pub enum ImdsError {
    #[error("metadata path `{path}` not found")]
    NotFound { path: String },
    #[error("metadata request for `{path}` failed with status {status}")]
    Status { path: String, status: u16 },
    #[error("failed to read metadata response for `{path}`: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("metadata service unreachable at {endpoint}: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unsupported metadata path `{0}`")]
    UnsupportedPath(String),
    #[error("invalid metadata endpoint `{endpoint}`: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build metadata http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("unexpected value at `{path}`: {message}")]
    InvalidValue { path: String, message: String },
    #[error("metadata crawl cancelled")]
    Cancelled,
}

impl ImdsError {
    /// Errors scoped to a single path. The crawler absorbs these through
    /// parent demotion instead of failing the whole crawl.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Status { .. } | Self::Transport { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }
}
