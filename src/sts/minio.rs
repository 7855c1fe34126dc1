use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::config::TenantConfig;
use crate::sts::broker::{BrokerError, CredentialBroker, TemporaryCredentials};
use crate::sts::signing::{self, SigningParams};
use crate::sts::xml;

const REGION: &str = "ap-northeast-1";
const SERVICE: &str = "sts";
const API_VERSION: &str = "2011-06-15";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything except the AWS unreserved characters `A-Z a-z 0-9 - _ . ~`.
const AWS_FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Calls `AssumeRole` on a MinIO tenant with its root credentials.
pub struct MinioStsBroker {
    endpoint: Url,
    access_key_id: String,
    secret_access_key: String,
    http: reqwest::Client,
}

impl MinioStsBroker {
    pub fn new(tenant: &TenantConfig) -> anyhow::Result<Self> {
        Self::with_timeout(tenant, REQUEST_TIMEOUT)
    }

    /// Like `new`, but bounds each AssumeRole call by `timeout` instead of the default.
    pub fn with_timeout(tenant: &TenantConfig, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: tenant.endpoint.clone(),
            access_key_id: tenant.root_user.clone(),
            secret_access_key: tenant.root_password.clone(),
            http,
        })
    }

    fn signed_headers(&self, body: &str, now: DateTime<Utc>) -> BTreeMap<String, String> {
        let params = SigningParams {
            access_key_id: &self.access_key_id,
            secret_access_key: &self.secret_access_key,
            region: REGION,
            service: SERVICE,
            time: now,
        };
        let payload_hash = signing::sha256_hex(body.as_bytes());

        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), FORM_CONTENT_TYPE.to_string());
        headers.insert("host".to_string(), signing::host_header(&self.endpoint));
        headers.insert("x-amz-content-sha256".to_string(), payload_hash.clone());
        headers.insert("x-amz-date".to_string(), params.amz_date());

        let authorization =
            signing::authorization(&params, "POST", &self.endpoint, &headers, &payload_hash);
        headers.insert("authorization".to_string(), authorization);
        headers
    }
}

#[async_trait]
impl CredentialBroker for MinioStsBroker {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
        policy: &serde_json::Value,
    ) -> Result<TemporaryCredentials, BrokerError> {
        let policy = policy.to_string();
        let body = form_body(&[
            ("Action", "AssumeRole"),
            ("Version", API_VERSION),
            ("RoleArn", role_arn),
            ("RoleSessionName", session_name),
            ("Policy", &policy),
        ]);

        let mut request = self.http.post(self.endpoint.clone());
        for (name, value) in self.signed_headers(&body, Utc::now()) {
            // reqwest derives Host from the URL exactly as signing::host_header does
            if name != "host" {
                request = request.header(name, value);
            }
        }

        tracing::debug!("AssumeRole -> {}", self.endpoint);
        let response = request.body(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(rejected(status.as_u16(), &text));
        }

        parse_assume_role_response(&text)
    }
}

fn form_body(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, AWS_FORM),
                utf8_percent_encode(v, AWS_FORM)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn rejected(status: u16, body: &str) -> BrokerError {
    let parsed = xml::from_xml::<xml::BackendErrorResponse>(body).unwrap_or_default();
    if let Some(request_id) = &parsed.request_id {
        tracing::warn!("AssumeRole rejected with status {}, request id {}", status, request_id);
    }
    BrokerError::Rejected {
        status,
        code: parsed.error.code.unwrap_or_else(|| "Unknown".to_string()),
        message: parsed
            .error
            .message
            .unwrap_or_else(|| body.chars().take(256).collect()),
    }
}

fn parse_assume_role_response(body: &str) -> Result<TemporaryCredentials, BrokerError> {
    let parsed = xml::from_xml::<xml::AssumeRoleResponse>(body)
        .map_err(|e| BrokerError::MalformedResponse(e.to_string()))?;
    let creds = parsed.result.credentials;

    for (field, value) in [
        ("AccessKeyId", &creds.access_key_id),
        ("SecretAccessKey", &creds.secret_access_key),
        ("SessionToken", &creds.session_token),
    ] {
        if value.trim().is_empty() {
            return Err(BrokerError::MalformedResponse(format!("{} is empty", field)));
        }
    }

    let expiration = DateTime::parse_from_rfc3339(creds.expiration.trim())
        .map_err(|e| {
            BrokerError::MalformedResponse(format!(
                "Expiration '{}' is not RFC 3339: {}",
                creds.expiration, e
            ))
        })?
        .with_timezone(&Utc);

    Ok(TemporaryCredentials {
        access_key_id: creds.access_key_id.trim().to_string(),
        secret_access_key: creds.secret_access_key.trim().to_string(),
        session_token: creds.session_token.trim().to_string(),
        expiration,
    })
}
