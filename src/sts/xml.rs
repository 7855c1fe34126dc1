use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::sts::broker::TemporaryCredentials;

// ========== Response types ==========

/// AssumeRoleWithWebIdentity response, credentials only
#[derive(Debug, Serialize)]
#[serde(rename = "AssumeRoleWithWebIdentityResponse")]
pub struct AssumeRoleWithWebIdentityResponse {
    #[serde(rename = "AssumeRoleWithWebIdentityResult")]
    pub result: AssumeRoleWithWebIdentityResult,
}

#[derive(Debug, Serialize)]
pub struct AssumeRoleWithWebIdentityResult {
    #[serde(rename = "Credentials")]
    pub credentials: CredentialsXml,
}

#[derive(Debug, Serialize)]
pub struct CredentialsXml {
    #[serde(rename = "AccessKeyId")]
    pub access_key_id: String,
    #[serde(rename = "SecretAccessKey")]
    pub secret_access_key: String,
    #[serde(rename = "SessionToken")]
    pub session_token: String,
    #[serde(rename = "Expiration")]
    pub expiration: String,
}

impl From<TemporaryCredentials> for AssumeRoleWithWebIdentityResponse {
    fn from(creds: TemporaryCredentials) -> Self {
        Self {
            result: AssumeRoleWithWebIdentityResult {
                credentials: CredentialsXml {
                    access_key_id: creds.access_key_id,
                    secret_access_key: creds.secret_access_key,
                    session_token: creds.session_token,
                    expiration: creds
                        .expiration
                        .to_rfc3339_opts(SecondsFormat::AutoSi, true),
                },
            },
        }
    }
}

/// STS error response
#[derive(Debug, Serialize)]
#[serde(rename = "ErrorResponse")]
pub struct ErrorResponse {
    #[serde(rename = "Error")]
    pub error: ErrorDetail,
    #[serde(rename = "RequestId")]
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message")]
    pub message: String,
}

// ========== Backend types ==========

/// AssumeRole response from the tenant STS endpoint
#[derive(Debug, Deserialize)]
pub struct AssumeRoleResponse {
    #[serde(rename = "AssumeRoleResult")]
    pub result: AssumeRoleResult,
}

#[derive(Debug, Deserialize)]
pub struct AssumeRoleResult {
    #[serde(rename = "Credentials")]
    pub credentials: BackendCredentials,
}

#[derive(Debug, Deserialize)]
pub struct BackendCredentials {
    #[serde(rename = "AccessKeyId")]
    pub access_key_id: String,
    #[serde(rename = "SecretAccessKey")]
    pub secret_access_key: String,
    #[serde(rename = "SessionToken")]
    pub session_token: String,
    #[serde(rename = "Expiration")]
    pub expiration: String,
}

/// Error body returned by the tenant on a rejected request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BackendErrorResponse {
    #[serde(rename = "Error")]
    pub error: BackendError,
    #[serde(rename = "RequestId")]
    pub request_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BackendError {
    #[serde(rename = "Code")]
    pub code: Option<String>,
    #[serde(rename = "Message")]
    pub message: Option<String>,
}

// ========== XML helpers ==========

/// Serialize a struct to an XML string, without declaration
pub fn to_xml<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(quick_xml::se::to_string(value)?)
}

/// Deserialize XML string to a struct
pub fn from_xml<'de, T: Deserialize<'de>>(xml: &'de str) -> anyhow::Result<T> {
    Ok(quick_xml::de::from_str(xml)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};

    #[test]
    fn test_web_identity_response_layout() {
        let creds = TemporaryCredentials {
            access_key_id: "AKIA...".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: "token123".to_string(),
            expiration: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        let xml = to_xml(&AssumeRoleWithWebIdentityResponse::from(creds)).unwrap();
        assert_eq!(
            xml,
            "<AssumeRoleWithWebIdentityResponse>\
             <AssumeRoleWithWebIdentityResult>\
             <Credentials>\
             <AccessKeyId>AKIA...</AccessKeyId>\
             <SecretAccessKey>secret</SecretAccessKey>\
             <SessionToken>token123</SessionToken>\
             <Expiration>2024-01-01T00:00:00Z</Expiration>\
             </Credentials>\
             </AssumeRoleWithWebIdentityResult>\
             </AssumeRoleWithWebIdentityResponse>"
        );
    }

    #[test]
    fn test_expiration_keeps_fractional_seconds() {
        let creds = TemporaryCredentials {
            access_key_id: "AK".to_string(),
            secret_access_key: "s".to_string(),
            session_token: "t".to_string(),
            expiration: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .unwrap()
                .with_nanosecond(987_000_000)
                .unwrap(),
        };
        let xml = to_xml(&AssumeRoleWithWebIdentityResponse::from(creds)).unwrap();
        assert!(xml.contains("<Expiration>2024-01-01T00:00:00.987Z</Expiration>"));
    }

    #[test]
    fn test_special_characters_escaped() {
        let creds = TemporaryCredentials {
            access_key_id: "AK".to_string(),
            secret_access_key: "a<b&c".to_string(),
            session_token: "t".to_string(),
            expiration: Utc.with_ymd_and_hms(2030, 6, 15, 8, 30, 0).unwrap(),
        };
        let xml = to_xml(&AssumeRoleWithWebIdentityResponse::from(creds)).unwrap();
        assert!(xml.contains("<SecretAccessKey>a&lt;b&amp;c</SecretAccessKey>"));
        assert!(xml.contains("<Expiration>2030-06-15T08:30:00Z</Expiration>"));
    }

    #[test]
    fn test_parse_minio_error_response() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ErrorResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <Error>
    <Type></Type>
    <Code>InvalidParameterValue</Code>
    <Message>Policy has invalid resource.</Message>
  </Error>
  <RequestId>17A8F5C6E2B1D3A4</RequestId>
</ErrorResponse>"#;
        let parsed: BackendErrorResponse = from_xml(body).unwrap();
        assert_eq!(parsed.error.code.as_deref(), Some("InvalidParameterValue"));
        assert_eq!(
            parsed.error.message.as_deref(),
            Some("Policy has invalid resource.")
        );
        assert_eq!(parsed.request_id.as_deref(), Some("17A8F5C6E2B1D3A4"));
    }
}
