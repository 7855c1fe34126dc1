use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Short-lived credentials issued by the tenant for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("STS backend request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("STS backend did not respond in time")]
    Timeout,
    #[error("STS backend rejected AssumeRole ({status}): {code}: {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },
    #[error("STS backend returned a malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for BrokerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BrokerError::Timeout
        } else {
            BrokerError::Transport(err)
        }
    }
}

/// Issues policy-scoped temporary credentials.
/// Implementations hold only immutable configuration and must be safe to call concurrently.
#[async_trait]
pub trait CredentialBroker: Send + Sync {
    /// Exchange the broker's root credentials for temporary ones limited by `policy`.
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
        policy: &serde_json::Value,
    ) -> Result<TemporaryCredentials, BrokerError>;
}
