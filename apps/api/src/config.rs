use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_PRIMARY_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_BACKUP_MODELS: &str = "claude-3-sonnet-20240229";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub s3_bucket: String,
    pub s3_endpoint: Option<String>,
    pub aws_region: String,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    /// When set, artifacts are written under this directory instead of S3.
    pub local_artifact_dir: Option<String>,
    pub anthropic_api_key: String,
    /// Fallback chain, primary first.
    pub inference_models: Vec<String>,
    pub inference_backoff: Duration,
    pub inference_timeout: Duration,
    pub memory_query_limit: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let primary = optional_env("INFERENCE_PRIMARY_MODEL")
            .unwrap_or_else(|| DEFAULT_PRIMARY_MODEL.to_string());
        let backups = optional_env("INFERENCE_BACKUP_MODELS")
            .unwrap_or_else(|| DEFAULT_BACKUP_MODELS.to_string());

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: optional_env("S3_ENDPOINT"),
            aws_region: optional_env("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            aws_access_key_id: optional_env("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY"),
            local_artifact_dir: optional_env("LOCAL_ARTIFACT_DIR"),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            inference_models: model_chain(&primary, &backups),
            inference_backoff: Duration::from_millis(parse_env("INFERENCE_BACKOFF_MS", 1000)?),
            inference_timeout: Duration::from_secs(parse_env("INFERENCE_TIMEOUT_SECS", 120)?),
            memory_query_limit: parse_env("MEMORY_QUERY_LIMIT", 3)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Primary model followed by the comma-separated backups, blanks and duplicates dropped.
fn model_chain(primary: &str, backups: &str) -> Vec<String> {
    let mut chain: Vec<String> = Vec::new();
    for model in std::iter::once(primary).chain(backups.split(',')) {
        let model = model.trim();
        if !model.is_empty() && !chain.iter().any(|m| m == model) {
            chain.push(model.to_string());
        }
    }
    chain
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_chain_orders_primary_first() {
        assert_eq!(
            model_chain("model-a", "model-b, model-c"),
            vec!["model-a", "model-b", "model-c"]
        );
    }

    #[test]
    fn test_model_chain_drops_blanks_and_duplicates() {
        assert_eq!(model_chain("model-a", " ,model-a,, model-b "), vec!["model-a", "model-b"]);
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("AXIS_TEST_SURELY_UNSET_VARIABLE", 8080).unwrap();
        assert_eq!(value, 8080);
    }
}
