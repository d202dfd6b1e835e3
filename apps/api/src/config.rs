use std::str::FromStr;

use anyhow::{Context, Result};

use crate::matching::engine::EngineConfig;
use crate::matching::keywords::ExtractorConfig;
use crate::matching::normalizer::NormalizerConfig;
use crate::matching::vectorizer::VectorizerConfig;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Allowed CORS origins. Empty means permissive.
    pub cors_origins: Vec<String>,
    pub engine: EngineConfig,
    pub max_topk: usize,
    pub batch_limit: usize,
    /// Per-text character limit for JSON requests.
    pub max_text_len: usize,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8000,
            rust_log: "info".to_string(),
            cors_origins: vec![],
            engine: EngineConfig::default(),
            max_topk: 20,
            batch_limit: 100,
            max_text_len: 50_000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let engine = EngineConfig {
            normalizer: NormalizerConfig {
                min_token_len: env_or("MATCH_MIN_TOKEN_LEN", defaults.engine.normalizer.min_token_len)?,
                remove_digits: env_or("MATCH_REMOVE_DIGITS", defaults.engine.normalizer.remove_digits)?,
            },
            vectorizer: VectorizerConfig {
                max_features: env_or("MATCH_MAX_FEATURES", defaults.engine.vectorizer.max_features)?,
                min_df: env_or("MATCH_MIN_DF", defaults.engine.vectorizer.min_df)?,
                max_df: env_or("MATCH_MAX_DF", defaults.engine.vectorizer.max_df)?,
            },
            extractor: ExtractorConfig {
                score_cutoff: env_or("MATCH_FUZZY_CUTOFF", defaults.engine.extractor.score_cutoff)?,
                max_phrase_tokens: env_or(
                    "MATCH_MAX_PHRASE_TOKENS",
                    defaults.engine.extractor.max_phrase_tokens,
                )?,
                ..defaults.engine.extractor.clone()
            },
            default_topk: env_or("MATCH_DEFAULT_TOPK", defaults.engine.default_topk)?,
        };

        let config = Config {
            port: env_or("PORT", defaults.port).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
            engine,
            max_topk: env_or("MATCH_MAX_TOPK", defaults.max_topk)?,
            batch_limit: env_or("MATCH_BATCH_LIMIT", defaults.batch_limit)?,
            max_text_len: env_or("MATCH_MAX_TEXT_LEN", defaults.max_text_len)?,
            max_upload_bytes: env_or("MATCH_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks that single-value parsing cannot catch.
    pub fn validate(&self) -> Result<()> {
        let vectorizer = &self.engine.vectorizer;
        if !(0.0..=1.0).contains(&vectorizer.max_df) {
            anyhow::bail!("MATCH_MAX_DF must be within 0.0..=1.0, got {}", vectorizer.max_df);
        }
        if !(0.0..=100.0).contains(&self.engine.extractor.score_cutoff) {
            anyhow::bail!(
                "MATCH_FUZZY_CUTOFF must be within 0..=100, got {}",
                self.engine.extractor.score_cutoff
            );
        }
        if self.max_topk == 0 {
            anyhow::bail!("MATCH_MAX_TOPK must be at least 1");
        }
        if !(1..=self.max_topk).contains(&self.engine.default_topk) {
            anyhow::bail!(
                "MATCH_DEFAULT_TOPK must be within 1..={}, got {}",
                self.max_topk,
                self.engine.default_topk
            );
        }
        if self.batch_limit == 0 {
            anyhow::bail!("MATCH_BATCH_LIMIT must be at least 1");
        }
        Ok(())
    }
}

/// Reads and parses `key`, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
