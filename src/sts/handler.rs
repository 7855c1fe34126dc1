use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::sts::error::StsError;
use crate::sts::policy::build_policy;
use crate::sts::xml::{self, AssumeRoleWithWebIdentityResponse};
use crate::AppState;

/// MinIO ignores both for AssumeRole, any value is accepted.
const ROLE_ARN: &str = "arn:xxx:xxx:xxx:xxxx";
const ROLE_SESSION_NAME: &str = "anything";

/// Handle STS AssumeRoleWithWebIdentity requests (POST, any path)
/// The web identity token in the body is not verified. Each call mints fresh credentials
/// on the tenant, limited to the origin bucket.
pub async fn assume_role_with_web_identity(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, StsError> {
    tracing::debug!("AssumeRoleWithWebIdentity request body: {} bytes", body.len());

    let bucket_name = &state.config.bucket.origin_bucket_name;
    let policy = build_policy(bucket_name);

    let credentials = state
        .broker
        .assume_role(ROLE_ARN, ROLE_SESSION_NAME, &policy)
        .await?;
    tracing::info!(
        "Issued credentials {} for bucket '{}' expiring at {}",
        credentials.access_key_id,
        bucket_name,
        credentials.expiration
    );

    let xml = xml::to_xml(&AssumeRoleWithWebIdentityResponse::from(credentials))?;

    Ok((StatusCode::OK, [("Content-type", "text/xml")], xml).into_response())
}
