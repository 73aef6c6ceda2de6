use std::str::FromStr;

use anyhow::{Context, Result};

use crate::normalizer::rules::TipFamily;

/// Application configuration loaded from environment variables.
/// Every value has a default so the service starts against a local Ollama.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub ollama: OllamaConfig,
    pub city: String,
    pub state: String,
    pub day: String,
    /// Near-duplicate tip families. `None` keeps the built-in rain-gear family.
    pub duplicate_tip_families: Option<Vec<TipFamily>>,
}

/// Tunables for the outbound completion call.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub num_ctx: u32,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "qwen2.5:3b-instruct".to_string(),
            temperature: 0.1,
            num_ctx: 2048,
            timeout_secs: 300,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = OllamaConfig::default();

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
            ollama: OllamaConfig {
                base_url: env_or("OLLAMA_URL", &defaults.base_url),
                model: env_or("OLLAMA_MODEL", &defaults.model),
                temperature: parse_env("OLLAMA_TEMPERATURE", defaults.temperature)?,
                num_ctx: parse_env("OLLAMA_NUM_CTX", defaults.num_ctx)?,
                timeout_secs: parse_env("OLLAMA_TIMEOUT_SECS", defaults.timeout_secs)?,
            },
            city: env_or("CONTEXT_CITY", "Vilhena"),
            state: env_or("CONTEXT_STATE", "RO"),
            day: env_or("CONTEXT_DAY", "amanhã"),
            duplicate_tip_families: std::env::var("DUPLICATE_TIP_KEYWORDS")
                .ok()
                .map(|raw| parse_tip_families(&raw)),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Parses `guarda,capa;sol,protetor` into two families.
/// Blank keywords and families are skipped.
pub fn parse_tip_families(raw: &str) -> Vec<TipFamily> {
    raw.split(';')
        .map(|family| {
            family
                .split(',')
                .map(|kw| kw.trim().to_lowercase())
                .filter(|kw| !kw.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|keywords| !keywords.is_empty())
        .map(TipFamily::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_family() {
        let families = parse_tip_families("guarda, Capa");
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].keywords(), &["guarda", "capa"]);
    }

    #[test]
    fn test_parse_multiple_families_skips_blanks() {
        let families = parse_tip_families("guarda,capa; ;sol,protetor,");
        assert_eq!(families.len(), 2);
        assert_eq!(families[1].keywords(), &["sol", "protetor"]);
    }

    #[test]
    fn test_parse_empty_yields_no_families() {
        assert!(parse_tip_families("").is_empty());
    }

    #[test]
    fn test_ollama_defaults() {
        let cfg = OllamaConfig::default();
        assert_eq!(cfg.base_url, "http://localhost:11434");
        assert_eq!(cfg.model, "qwen2.5:3b-instruct");
        assert_eq!(cfg.num_ctx, 2048);
        assert_eq!(cfg.timeout_secs, 300);
    }
}
