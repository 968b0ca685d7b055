use std::collections::BTreeMap;
use std::env;

use crate::types::SourceType;

/// Per-source-type TTLs in seconds (spec §3 CacheEntry, §6 `source_ttls`).
#[derive(Debug, Clone)]
pub struct SourceTtls {
    pub news: u64,
    pub government: u64,
    pub api: u64,
    pub social: u64,
    pub financial: u64,
}

impl Default for SourceTtls {
    fn default() -> Self {
        Self {
            news: 15 * 60,
            government: 2 * 60 * 60,
            api: 30 * 60,
            social: 5 * 60,
            financial: 10 * 60,
        }
    }
}

impl SourceTtls {
    pub fn for_type(&self, source_type: SourceType) -> u64 {
        match source_type {
            SourceType::News => self.news,
            SourceType::Government => self.government,
            SourceType::Api => self.api,
            SourceType::Social => self.social,
            SourceType::Financial => self.financial,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DedupConfig {
    pub window_hours: u32,
    pub max_articles: usize,
    pub threshold_exact: f64,
    pub threshold_near: f64,
    pub threshold_related: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            window_hours: 48,
            max_articles: 50_000,
            threshold_exact: 0.95,
            threshold_near: 0.85,
            threshold_related: 0.70,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringProfile {
    Balanced,
    UrgencyFocused,
    BusinessFocused,
    CredibilityFocused,
    Comprehensive,
}

impl ScoringProfile {
    pub fn from_env_str(s: &str) -> Self {
        match s {
            "urgency_focused" => ScoringProfile::UrgencyFocused,
            "business_focused" => ScoringProfile::BusinessFocused,
            "credibility_focused" => ScoringProfile::CredibilityFocused,
            "comprehensive" => ScoringProfile::Comprehensive,
            _ => ScoringProfile::Balanced,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningMode {
    Off,
    Shadow,
    Active,
}

impl LearningMode {
    pub fn from_env_str(s: &str) -> Self {
        match s {
            "shadow" => LearningMode::Shadow,
            "active" => LearningMode::Active,
            _ => LearningMode::Off,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LearningConfig {
    pub mode: LearningMode,
    pub cycle_interval_seconds: u64,
    pub reputation_update_threshold: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            mode: LearningMode::Shadow,
            cycle_interval_seconds: 3600,
            reputation_update_threshold: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub enabled: bool,
    pub model_id: String,
    pub max_keys: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model_id: "rule-based-fallback".to_string(),
            max_keys: 1,
        }
    }
}

/// Pipeline-wide configuration loaded from the environment, following the
/// `Config::from_env` convention used throughout the teacher workspace.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source_ttls: SourceTtls,
    pub dedup: DedupConfig,
    pub scoring_profile: ScoringProfile,
    pub learning: LearningConfig,
    pub llm: LlmConfig,
    pub per_source_concurrency: usize,
    pub network_timeout_seconds: u64,
    pub llm_timeout_seconds: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_ttls: SourceTtls::default(),
            dedup: DedupConfig::default(),
            scoring_profile: ScoringProfile::Balanced,
            learning: LearningConfig::default(),
            llm: LlmConfig::default(),
            per_source_concurrency: 5,
            network_timeout_seconds: 10,
            llm_timeout_seconds: 30,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = env::var("SCORING_PROFILE") {
            cfg.scoring_profile = ScoringProfile::from_env_str(&v);
        }
        if let Ok(v) = env::var("LEARNING_MODE") {
            cfg.learning.mode = LearningMode::from_env_str(&v);
        }
        if let Some(v) = parse_env("PER_SOURCE_CONCURRENCY") {
            cfg.per_source_concurrency = v;
        }
        if let Some(v) = parse_env("NETWORK_TIMEOUT_SECONDS") {
            cfg.network_timeout_seconds = v;
        }
        if let Some(v) = parse_env("LLM_TIMEOUT_SECONDS") {
            cfg.llm_timeout_seconds = v;
        }
        if let Ok(v) = env::var("LLM_MODEL_ID") {
            cfg.llm.model_id = v;
            cfg.llm.enabled = true;
        }
        cfg
    }

    /// Log the non-secret shape of the config at startup, following
    /// `Config::log_redacted` in the teacher workspace.
    pub fn log_summary(&self) {
        let fields: BTreeMap<&str, String> = [
            ("scoring_profile", format!("{:?}", self.scoring_profile)),
            ("learning_mode", format!("{:?}", self.learning.mode)),
            ("llm_enabled", self.llm.enabled.to_string()),
            (
                "per_source_concurrency",
                self.per_source_concurrency.to_string(),
            ),
        ]
        .into_iter()
        .collect();
        for (k, v) in fields {
            tracing::info!(field = k, value = %v, "pipeline config");
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
