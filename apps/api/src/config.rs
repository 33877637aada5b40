use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Scoring and input limits. Threaded explicitly into the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub japanese_hard_cap: u32,
    pub onsite_hard_cap: u32,
    /// Maximum `jd_text` length in characters.
    pub max_jd_chars: usize,
    /// Maximum request body size in bytes.
    pub max_content_length: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            japanese_hard_cap: 60,
            onsite_hard_cap: 70,
            max_jd_chars: 15_000,
            max_content_length: 30_000,
        }
    }
}

impl AnalyzerConfig {
    /// Missing, unparsable or non-positive values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            japanese_hard_cap: positive_or(&lookup, "JAPANESE_HARD_CAP", defaults.japanese_hard_cap),
            onsite_hard_cap: positive_or(&lookup, "ONSITE_HARD_CAP", defaults.onsite_hard_cap),
            max_jd_chars: positive_or(&lookup, "MAX_JD_CHARS", defaults.max_jd_chars),
            max_content_length: positive_or(
                &lookup,
                "MAX_CONTENT_LENGTH",
                defaults.max_content_length,
            ),
        }
    }
}

/// Optional AI interpretation. Never influences the score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub enabled: bool,
    pub model_id: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

pub const DEFAULT_AI_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_AI_TIMEOUT_MS: u64 = 3_000;

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_id: DEFAULT_AI_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_millis(DEFAULT_AI_TIMEOUT_MS),
        }
    }
}

impl AiConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = !matches!(
            lookup("AI_ENABLED").map(|v| v.trim().to_lowercase()).as_deref(),
            Some("false" | "0" | "no")
        );

        Self {
            enabled,
            model_id: lookup("AI_MODEL_ID")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            api_key: lookup("ANTHROPIC_API_KEY").filter(|v| !v.trim().is_empty()),
            timeout: Duration::from_millis(positive_or(
                &lookup,
                "AI_TIMEOUT_MS",
                DEFAULT_AI_TIMEOUT_MS,
            )),
        }
    }

    /// AI runs only when enabled and a key is configured.
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub profile_path: PathBuf,
    pub analyzer: AnalyzerConfig,
    pub ai: AiConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let env = |key: &str| std::env::var(key).ok();

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            profile_path: std::env::var("PROFILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_profile_path()),
            analyzer: AnalyzerConfig::from_lookup(env),
            ai: AiConfig::from_lookup(env),
        })
    }
}

fn default_profile_path() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data/profile.json"))
}

fn positive_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + Default,
{
    lookup(key)
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .filter(|value| *value > T::default())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_analyzer_defaults_when_missing() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn test_analyzer_overrides() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[
            ("JAPANESE_HARD_CAP", "55"),
            ("ONSITE_HARD_CAP", " 65 "),
            ("MAX_JD_CHARS", "100"),
        ]));
        assert_eq!(config.japanese_hard_cap, 55);
        assert_eq!(config.onsite_hard_cap, 65);
        assert_eq!(config.max_jd_chars, 100);
        assert_eq!(config.max_content_length, 30_000);
    }

    #[test]
    fn test_analyzer_rejects_invalid_and_non_positive() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[
            ("JAPANESE_HARD_CAP", "abc"),
            ("ONSITE_HARD_CAP", "0"),
            ("MAX_JD_CHARS", "-5"),
            ("MAX_CONTENT_LENGTH", "12.5"),
        ]));
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn test_ai_config_defaults() {
        let ai = AiConfig::from_lookup(lookup_from(&[]));
        assert!(ai.enabled);
        assert_eq!(ai.model_id, DEFAULT_AI_MODEL);
        assert_eq!(ai.timeout, Duration::from_millis(3_000));
        assert!(!ai.is_active());
    }

    #[test]
    fn test_ai_config_disabled_and_keyed() {
        let ai = AiConfig::from_lookup(lookup_from(&[
            ("AI_ENABLED", "No"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("AI_TIMEOUT_MS", "1500"),
        ]));
        assert!(!ai.enabled);
        assert!(!ai.is_active());
        assert_eq!(ai.timeout, Duration::from_millis(1_500));

        let ai = AiConfig::from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "sk-test")]));
        assert!(ai.is_active());
    }
}
