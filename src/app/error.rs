use crate::utils::error::{ErrorCategory, ProxyError};
use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flat error envelope returned by every failing route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// A request body axum could not read, such as one over the size limit.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// The client only ever sees `message`; `source` goes to the log.
    #[error("{message}")]
    Upstream {
        message: &'static str,
        #[source]
        source: ProxyError,
    },
}

impl ApiError {
    /// Maps an upstream failure to a 500 carrying a generic route message.
    pub fn upstream(message: &'static str) -> impl FnOnce(ProxyError) -> Self {
        move |source| Self::Upstream { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Rejected { status, .. } => *status,
            Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        match err.category() {
            ErrorCategory::Validation => Self::BadRequest(err.to_string()),
            ErrorCategory::Auth => Self::Unauthorized(err.to_string()),
            ErrorCategory::Upstream | ErrorCategory::Config => Self::Upstream {
                message: "Internal error",
                source: err,
            },
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::Upstream { message, source } => {
                tracing::error!("{}: {}", message, source);
            }
            other => tracing::debug!("Rejected request ({}): {}", status, other),
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
