use clap::Args;

use crate::error::{CosError, Result};

// Connection flags shared by every COS utility. Each one falls back to its
// environment variable; none is required at the clap level so that `resolve`
// can report all missing values at once.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// COS bucket name, e.g. example-1250000000
    #[arg(long, env = "COS_BUCKET_NAME")]
    pub bucket: Option<String>,
    /// COS region, e.g. ap-singapore
    #[arg(long, env = "COS_REGION")]
    pub region: Option<String>,
    /// Tencent Cloud secret ID
    #[arg(long, env = "COS_SECRET_ID")]
    pub secret_id: Option<String>,
    /// Tencent Cloud secret key
    #[arg(long, env = "COS_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,
    /// Temporary credential token
    #[arg(long, env = "COS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// Override the service endpoint (defaults to https://cos.<region>.myqcloud.com)
    #[arg(long, env = "COS_ENDPOINT")]
    pub endpoint: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub secret_id: String,
    pub secret_key: String,
    pub token: Option<String>,
}

impl Credentials {
    /// Secret ID cut to its first 8 characters, for banners and logs.
    pub fn masked_id(&self) -> String {
        let prefix: String = self.secret_id.chars().take(8).collect();
        format!("{prefix}...")
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_id", &self.masked_id())
            .field("secret_key", &"<redacted>")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CosConfig {
    pub bucket: String,
    pub region: String,
    pub credentials: Credentials,
    pub endpoint: Option<String>,
}

impl CosConfig {
    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cos.{}.myqcloud.com", self.region))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ConnectionArgs {
    pub fn resolve(self) -> Result<CosConfig> {
        let bucket = non_blank(self.bucket);
        let region = non_blank(self.region);
        let secret_id = non_blank(self.secret_id);
        let secret_key = non_blank(self.secret_key);

        let mut missing = Vec::new();
        if bucket.is_none() {
            missing.push("--bucket or COS_BUCKET_NAME");
        }
        if region.is_none() {
            missing.push("--region or COS_REGION");
        }
        if secret_id.is_none() {
            missing.push("--secret-id or COS_SECRET_ID");
        }
        if secret_key.is_none() {
            missing.push("--secret-key or COS_SECRET_KEY");
        }

        match (bucket, region, secret_id, secret_key) {
            (Some(bucket), Some(region), Some(secret_id), Some(secret_key)) => Ok(CosConfig {
                bucket,
                region,
                credentials: Credentials {
                    secret_id,
                    secret_key,
                    token: non_blank(self.token),
                },
                endpoint: non_blank(self.endpoint),
            }),
            _ => Err(CosError::InvalidConfig(format!(
                "missing required configuration: {}",
                missing.join(", ")
            ))),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> CosConfig {
    CosConfig {
        bucket: "example-1250000000".to_string(),
        region: "ap-singapore".to_string(),
        credentials: Credentials {
            secret_id: "AKIDexampleexample".to_string(),
            secret_key: "secret".to_string(),
            token: None,
        },
        endpoint: None,
    }
}
