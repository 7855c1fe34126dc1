use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::sts::broker::BrokerError;
use crate::sts::xml::{self, ErrorDetail, ErrorResponse};

/// STS-compatible error types
#[derive(Debug)]
pub enum StsError {
    /// The tenant refused the request or could not be reached.
    BrokerUnavailable(String),
    BrokerTimeout,
    MalformedBrokerResponse(String),
    InternalError(String),
}

impl StsError {
    fn code(&self) -> &str {
        match self {
            StsError::BrokerUnavailable(_) => "ServiceUnavailable",
            StsError::BrokerTimeout => "RequestTimeout",
            StsError::MalformedBrokerResponse(_) => "InvalidResponse",
            StsError::InternalError(_) => "InternalError",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            StsError::BrokerUnavailable(_) | StsError::MalformedBrokerResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            StsError::BrokerTimeout => StatusCode::GATEWAY_TIMEOUT,
            StsError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            StsError::BrokerUnavailable(m) => m,
            StsError::BrokerTimeout => "Timed out waiting for the tenant STS endpoint",
            StsError::MalformedBrokerResponse(m) => m,
            StsError::InternalError(m) => m,
        }
    }

    fn to_xml(&self) -> String {
        let body = ErrorResponse {
            error: ErrorDetail {
                kind: "Receiver".to_string(),
                code: self.code().to_string(),
                message: self.message().to_string(),
            },
            request_id: uuid::Uuid::new_v4().to_string(),
        };
        // Plain strings only, serialization cannot fail
        xml::to_xml(&body).unwrap_or_default()
    }
}

impl IntoResponse for StsError {
    fn into_response(self) -> Response {
        tracing::error!("STS request failed: {} ({})", self.message(), self.code());
        let status = self.status_code();
        let xml = self.to_xml();
        (status, [("Content-Type", "text/xml")], xml).into_response()
    }
}

impl From<BrokerError> for StsError {
    fn from(err: BrokerError) -> Self {
        match err {
            BrokerError::Timeout => StsError::BrokerTimeout,
            BrokerError::MalformedResponse(_) => StsError::MalformedBrokerResponse(err.to_string()),
            BrokerError::Transport(_) | BrokerError::Rejected { .. } => {
                StsError::BrokerUnavailable(err.to_string())
            }
        }
    }
}

impl From<anyhow::Error> for StsError {
    fn from(err: anyhow::Error) -> Self {
        StsError::InternalError(err.to_string())
    }
}
