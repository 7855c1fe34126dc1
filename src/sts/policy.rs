use serde_json::{json, Value};

/// Grants full S3 access to one bucket and every object inside it.
pub fn build_policy(bucket_name: &str) -> Value {
    let bucket_arn = bucket_arn(bucket_name);
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Action": ["s3:*"],
                "Resource": [&bucket_arn, format!("{}/*", bucket_arn)],
            }
        ]
    })
}

pub fn bucket_arn(bucket_name: &str) -> String {
    format!("arn:aws:s3:::{}", bucket_name)
}
