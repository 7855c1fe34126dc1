use url::Url;

/// Same port as the MinIO operator STS service, which the tenant sidecars dial.
pub const STS_PORT: u16 = 4223;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {0} is empty")]
    Empty(&'static str),
    #[error("environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub tenant: TenantConfig,
    pub bucket: BucketConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection details for the MinIO tenant whose STS endpoint issues the real credentials.
#[derive(Debug, Clone)]
pub struct TenantConfig {
    pub endpoint: Url,
    pub root_user: String,
    pub root_password: String,
}

#[derive(Debug, Clone)]
pub struct BucketConfig {
    pub origin_bucket_name: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = required(&lookup, "MINIO_TENANT_ENDPOINT")?;
        let endpoint = Url::parse(&endpoint).map_err(|e| ConfigError::Invalid {
            name: "MINIO_TENANT_ENDPOINT",
            reason: e.to_string(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name: "MINIO_TENANT_ENDPOINT",
                reason: format!("unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        Ok(Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: STS_PORT,
            },
            tenant: TenantConfig {
                endpoint,
                root_user: required(&lookup, "MINIO_TENANT_ROOT_USER")?,
                root_password: required(&lookup, "MINIO_TENANT_ROOT_PASSWORD")?,
            },
            bucket: BucketConfig {
                origin_bucket_name: required(&lookup, "CHLORIA_ORIGIN_BUCKET_NAME")?,
            },
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Err(ConfigError::Missing(name)),
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(name)),
        Some(value) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full() -> HashMap<String, String> {
        vars(&[
            ("MINIO_TENANT_ENDPOINT", "http://minio.tenant.svc:9000"),
            ("MINIO_TENANT_ROOT_USER", "root"),
            ("MINIO_TENANT_ROOT_PASSWORD", "hunter22"),
            ("CHLORIA_ORIGIN_BUCKET_NAME", "origin"),
        ])
    }

    #[test]
    fn test_loads_all_values() {
        let env = full();
        let config = AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.tenant.endpoint.as_str(), "http://minio.tenant.svc:9000/");
        assert_eq!(config.tenant.root_user, "root");
        assert_eq!(config.tenant.root_password, "hunter22");
        assert_eq!(config.bucket.origin_bucket_name, "origin");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4223);
    }

    #[test]
    fn test_each_variable_is_required() {
        for name in [
            "MINIO_TENANT_ENDPOINT",
            "MINIO_TENANT_ROOT_USER",
            "MINIO_TENANT_ROOT_PASSWORD",
            "CHLORIA_ORIGIN_BUCKET_NAME",
        ] {
            let mut env = full();
            env.remove(name);
            let err = AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
            assert!(
                matches!(err, ConfigError::Missing(missing) if missing == name),
                "unexpected error for {name}: {err}"
            );
        }
    }

    #[test]
    fn test_empty_value_rejected() {
        let mut env = full();
        env.insert("CHLORIA_ORIGIN_BUCKET_NAME".to_string(), "  ".to_string());
        let err = AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Empty("CHLORIA_ORIGIN_BUCKET_NAME")));
    }

    #[test]
    fn test_endpoint_must_be_http_url() {
        let mut env = full();
        env.insert("MINIO_TENANT_ENDPOINT".to_string(), "not a url".to_string());
        let err = AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "MINIO_TENANT_ENDPOINT", .. }));

        env.insert("MINIO_TENANT_ENDPOINT".to_string(), "ftp://minio:21".to_string());
        let err = AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }
}
