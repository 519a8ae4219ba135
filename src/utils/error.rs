use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("Upstream payload from {url} did not match the expected shape: {source}")]
    UpstreamPayload {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("{message}")]
    AuthError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Upstream,
    Validation,
    Auth,
    Config,
}

impl ProxyError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Upstream(_)
            | Self::UpstreamStatus { .. }
            | Self::UpstreamPayload { .. }
            | Self::Task(_) => ErrorCategory::Upstream,
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::AuthError { .. } => ErrorCategory::Auth,
            Self::IoError(_)
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Config,
        }
    }

    /// Whether the failure came from a network timeout rather than a bad response.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Upstream(e) if e.is_timeout())
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Upstream => {
                format!("The upstream posts service could not be reached or misbehaved: {self}")
            }
            ErrorCategory::Validation => format!("Input was rejected: {self}"),
            ErrorCategory::Auth => format!("Not authorized: {self}"),
            ErrorCategory::Config => {
                format!("The service is misconfigured and cannot start: {self}")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        let status = ProxyError::UpstreamStatus {
            status: 503,
            url: "http://upstream/posts".to_string(),
        };
        assert_eq!(status.category(), ErrorCategory::Upstream);

        let payload = ProxyError::UpstreamPayload {
            url: "http://upstream/posts".to_string(),
            source: serde_json::from_str::<u8>("\"x\"").unwrap_err(),
        };
        assert_eq!(payload.category(), ErrorCategory::Upstream);

        assert_eq!(
            ProxyError::validation("bad").category(),
            ErrorCategory::Validation
        );
        assert_eq!(ProxyError::auth("Missing token").category(), ErrorCategory::Auth);
        assert_eq!(
            ProxyError::MissingConfigError {
                field: "upstream.base_url".to_string()
            }
            .category(),
            ErrorCategory::Config
        );
    }

    #[test]
    fn test_auth_error_displays_bare_message() {
        assert_eq!(ProxyError::auth("Invalid token").to_string(), "Invalid token");
    }

    #[test]
    fn test_user_friendly_message_mentions_cause() {
        let err = ProxyError::ConfigError {
            message: "port must be set".to_string(),
        };
        let msg = err.user_friendly_message();
        assert!(msg.contains("misconfigured"));
        assert!(msg.contains("port must be set"));
    }
}
