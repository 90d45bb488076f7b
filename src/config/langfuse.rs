/// Credentials for the Langfuse ingestion API. Only read from the
/// environment so keys never live in a committed config file.
#[derive(Debug, Clone, PartialEq)]
pub struct LangfuseConfig {
    pub public_key: String,
    pub secret_key: String,
    pub host: String,
}

impl LangfuseConfig {
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let public_key = non_empty("LANGFUSE_PUBLIC_KEY")?;
        let secret_key = non_empty("LANGFUSE_SECRET_KEY")?;
        let host = non_empty("LANGFUSE_HOST")
            .unwrap_or_else(|| super::defaults::DEFAULT_LANGFUSE_HOST.to_string());

        Some(Self {
            public_key,
            secret_key,
            host: host.trim_end_matches('/').to_string(),
        })
    }
}
