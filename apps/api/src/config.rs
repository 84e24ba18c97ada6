use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub azure_ai_endpoint: String,
    pub azure_ai_api_key: String,
    pub azure_ai_model: String,
    pub llm_timeout_secs: u64,
    /// Postgres-backed stores when set; in-memory stores otherwise.
    pub database_url: Option<String>,
    /// Enables `s3://bucket/key` blob fetches when set.
    pub s3: Option<S3Config>,
    /// Shared secret expected in `X-API-Key` on backend routes. Unset = dev mode.
    pub ai_api_key: Option<String>,
    pub allowed_origins: Vec<String>,
    pub max_cv_size_mb: usize,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3 = match optional_env("S3_ENDPOINT") {
            Some(endpoint) => Some(S3Config {
                endpoint,
                region: optional_env("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            }),
            None => None,
        };

        Ok(Config {
            azure_ai_endpoint: require_env("AZURE_AI_ENDPOINT")?,
            azure_ai_api_key: require_env("AZURE_AI_API_KEY")?,
            azure_ai_model: optional_env("AZURE_AI_MODEL")
                .unwrap_or_else(|| "grok-4-fast-reasoning".to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 300)?,
            database_url: optional_env("DATABASE_URL"),
            s3,
            ai_api_key: optional_env("AI_API_KEY"),
            allowed_origins: parse_origins(
                &optional_env("ALLOWED_ORIGINS")
                    .unwrap_or_else(|| "http://localhost:3000".to_string()),
            ),
            max_cv_size_mb: parse_env("MAX_CV_SIZE_MB", 10)?,
            port: parse_env("PORT", 8080)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn max_cv_size_bytes(&self) -> usize {
        self.max_cv_size_mb * 1024 * 1024
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and empty are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_drops_empty() {
        assert_eq!(
            parse_origins(" http://a.test, ,http://b.test "),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn test_parse_env_default_when_unset() {
        let port: u16 = parse_env("SIGNALS_API_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }
}
