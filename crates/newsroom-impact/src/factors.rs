//! Multi-factor analysis (spec §4.4): five of the six factor axes — severity,
//! source credibility, geographic scope, temporal urgency, volume/momentum.
//! Sector relevance lives in [`crate::sector`] since it needs the dependency
//! graph.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

const MAX_DETECTED_SIGNALS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Crisis,
    High,
    Medium,
    Low,
    Minimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeographicScope {
    International,
    National,
    Regional,
    Local,
}

#[derive(Debug, Clone)]
pub struct FactorScores {
    pub severity_score: f64,
    pub credibility_score: f64,
    pub geographic_score: f64,
    pub temporal_score: f64,
    pub volume_score: f64,
    pub severity_level: EventSeverity,
    pub geographic_scope: GeographicScope,
    pub detected_signals: Vec<String>,
    pub confidence: f64,
}

const CRISIS_KEYWORDS: &[&str] = &[
    "tsunami", "earthquake", "flood", "cyclone", "landslide", "drought", "disaster",
    "catastrophe", "calamity", "state of emergency", "martial law", "curfew", "evacuation",
    "death toll", "casualties", "fatalities", "missing", "currency crash", "bank collapse",
    "default", "bankruptcy", "market crash", "hyperinflation", "economic crisis", "terrorism",
    "attack", "explosion", "war", "conflict",
];

const HIGH_SEVERITY_KEYWORDS: &[&str] = &[
    "impeachment", "resignation", "dissolution", "no confidence", "constitutional crisis",
    "political crisis", "recession", "layoffs", "factory closure", "strike", "fuel shortage",
    "power cut", "blackout", "major reform", "sweeping changes", "landmark decision",
    "historic", "unprecedented",
];

const MEDIUM_SEVERITY_KEYWORDS: &[&str] = &[
    "new policy", "regulation", "circular", "gazette", "amendment", "revision", "tender",
    "procurement", "quarterly results", "merger", "acquisition", "expansion", "investment",
    "partnership", "contract",
];

const SOURCE_CREDIBILITY: &[(&str, f64)] = &[
    ("government", 100.0),
    ("disaster_management", 100.0),
    ("central_bank", 100.0),
    ("president", 95.0),
    ("prime_minister", 95.0),
    ("ministry", 90.0),
    ("wire_service", 85.0),
    ("national_broadcaster", 80.0),
    ("regional_broadcaster", 75.0),
    ("news_outlet", 65.0),
    ("local_media", 60.0),
    ("social_media", 40.0),
    ("twitter", 35.0),
    ("facebook", 30.0),
    ("unverified", 20.0),
    ("unknown", 30.0),
];

const DEFAULT_CREDIBILITY: f64 = 30.0;

const NATIONAL_KEYWORDS: &[&str] = &[
    "nationwide", "national", "country-wide", "across the country", "all districts",
    "island-wide", "entire country",
];

const REGIONAL_KEYWORDS: &[&str] = &[
    "province", "provincial", "multiple districts", "region", "western province",
    "southern province", "central province", "northern province", "eastern province",
];

const INTERNATIONAL_KEYWORDS: &[&str] = &[
    "international", "global", "world", "imf", "world bank", "foreign", "export", "import",
    "bilateral", "multilateral",
];

const BREAKING_KEYWORDS: &[&str] = &["breaking", "just in", "developing", "urgent", "alert"];
const RECENT_KEYWORDS: &[&str] = &["today", "tonight", "this morning", "hours ago", "just now"];
const NEARTERM_KEYWORDS: &[&str] = &["yesterday", "tomorrow", "this week"];
const VIRAL_KEYWORDS: &[&str] = &["trending", "viral", "widespread", "massive response"];

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:,\d{3})*(?:\.\d+)?").unwrap())
}

fn district_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z][a-zA-Z]+ District\b").unwrap())
}

pub struct MultiFactorAnalyzer;

impl Default for MultiFactorAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiFactorAnalyzer {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn analyze(
        &self,
        title: &str,
        content: &str,
        source: &str,
        published_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        mention_count: u32,
    ) -> FactorScores {
        let full_text = format!("{title} {content}").to_lowercase();
        let title_lower = title.to_lowercase();

        let mut detected_signals = Vec::new();

        let (severity_score, severity_level, severity_signals) =
            analyze_severity(&full_text, &title_lower);
        detected_signals.extend(severity_signals);

        let credibility_score = analyze_credibility(source);
        if credibility_score >= 80.0 {
            detected_signals.push(format!("credible_source:{source}"));
        }

        let (geographic_score, geographic_scope, geo_signals) = analyze_geography(&full_text);
        detected_signals.extend(geo_signals);

        let (temporal_score, temporal_signals) =
            analyze_temporal(&full_text, &title_lower, published_at, now);
        detected_signals.extend(temporal_signals);

        let volume_score = analyze_volume(mention_count, &full_text);

        let confidence =
            calculate_confidence(severity_score, credibility_score, detected_signals.len());

        detected_signals.truncate(MAX_DETECTED_SIGNALS);

        FactorScores {
            severity_score,
            credibility_score,
            geographic_score,
            temporal_score,
            volume_score,
            severity_level,
            geographic_scope,
            detected_signals,
            confidence,
        }
    }
}

fn analyze_severity(text: &str, title: &str) -> (f64, EventSeverity, Vec<String>) {
    let mut signals = Vec::new();

    let crisis_matches: Vec<&str> = CRISIS_KEYWORDS.iter().filter(|kw| text.contains(*kw)).copied().collect();
    signals.extend(crisis_matches.iter().take(3).map(|kw| format!("crisis:{kw}")));

    let high_matches: Vec<&str> =
        HIGH_SEVERITY_KEYWORDS.iter().filter(|kw| text.contains(*kw)).copied().collect();
    signals.extend(high_matches.iter().take(3).map(|kw| format!("high:{kw}")));

    let medium_matches: Vec<&str> =
        MEDIUM_SEVERITY_KEYWORDS.iter().filter(|kw| text.contains(*kw)).copied().collect();
    signals.extend(medium_matches.iter().take(2).map(|kw| format!("medium:{kw}")));

    let title_crisis = CRISIS_KEYWORDS.iter().any(|kw| title.contains(kw));
    let title_high = HIGH_SEVERITY_KEYWORDS.iter().any(|kw| title.contains(kw));

    let (score, level) = if !crisis_matches.is_empty() || title_crisis {
        let boost = (crisis_matches.len() as f64 * 5.0).min(15.0);
        ((85.0 + boost).min(100.0), EventSeverity::Crisis)
    } else if !high_matches.is_empty() || title_high {
        let boost = (high_matches.len() as f64 * 5.0).min(15.0);
        ((65.0 + boost).min(80.0), EventSeverity::High)
    } else if !medium_matches.is_empty() {
        let boost = (medium_matches.len() as f64 * 3.0).min(10.0);
        ((45.0 + boost).min(60.0), EventSeverity::Medium)
    } else if number_re().is_match(text) {
        (30.0, EventSeverity::Low)
    } else {
        (15.0, EventSeverity::Minimal)
    };

    (score, level, signals)
}

fn analyze_credibility(source: &str) -> f64 {
    let normalized = source.to_lowercase().replace([' ', '-'], "_");
    if let Some((_, score)) = SOURCE_CREDIBILITY.iter().find(|(name, _)| *name == normalized) {
        return *score;
    }
    for (known, score) in SOURCE_CREDIBILITY {
        if normalized.contains(known) || known.contains(normalized.as_str()) {
            return *score;
        }
    }
    DEFAULT_CREDIBILITY
}

fn analyze_geography(text: &str) -> (f64, GeographicScope, Vec<String>) {
    let mut signals = Vec::new();

    let international = INTERNATIONAL_KEYWORDS.iter().any(|kw| text.contains(kw));
    let national = NATIONAL_KEYWORDS.iter().any(|kw| text.contains(kw));
    let regional = REGIONAL_KEYWORDS.iter().any(|kw| text.contains(kw));
    let district_mentions = district_re().find_iter(text).count();

    if international {
        signals.push("scope:international".to_string());
        (100.0, GeographicScope::International, signals)
    } else if national || district_mentions >= 5 {
        signals.push("scope:national".to_string());
        (90.0, GeographicScope::National, signals)
    } else if regional || district_mentions >= 2 {
        signals.push(format!("scope:regional({district_mentions} districts)"));
        (60.0, GeographicScope::Regional, signals)
    } else {
        if district_mentions > 0 {
            signals.push("scope:local".to_string());
        }
        (30.0, GeographicScope::Local, signals)
    }
}

fn analyze_temporal(
    text: &str,
    title: &str,
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (f64, Vec<String>) {
    let mut signals = Vec::new();

    if BREAKING_KEYWORDS.iter().any(|kw| title.contains(kw)) {
        signals.push("temporal:breaking".to_string());
        return (100.0, signals);
    }

    let mut score = 50.0;

    if RECENT_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        score = 85.0;
        signals.push("temporal:today".to_string());
    }
    if score < 85.0 && NEARTERM_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        score = 70.0;
        signals.push("temporal:near_term".to_string());
    }

    if let Some(published_at) = published_at {
        let age_hours = (now - published_at).num_minutes() as f64 / 60.0;
        if age_hours < 6.0 {
            score = score.max(95.0);
            signals.push("temporal:very_recent".to_string());
        } else if age_hours < 24.0 {
            score = score.max(80.0);
            signals.push("temporal:last_24h".to_string());
        } else if age_hours < 72.0 {
            score = score.max(60.0);
            signals.push("temporal:last_3_days".to_string());
        } else if age_hours < 24.0 * 7.0 {
            score = 45.0;
            signals.push("temporal:last_week".to_string());
        } else {
            score = score.min(25.0);
            signals.push("temporal:old".to_string());
        }
    }

    (score, signals)
}

fn analyze_volume(mention_count: u32, text: &str) -> f64 {
    let mut score = if mention_count >= 50 {
        100.0
    } else if mention_count >= 20 {
        80.0
    } else if mention_count >= 10 {
        60.0
    } else if mention_count >= 5 {
        45.0
    } else if mention_count >= 2 {
        30.0
    } else {
        20.0
    };

    if VIRAL_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        score = (score + 20.0).min(100.0);
    }

    score
}

fn calculate_confidence(severity: f64, credibility: f64, signal_count: usize) -> f64 {
    let credibility_factor = credibility / 100.0;
    let signal_factor = (signal_count as f64 / 5.0).min(1.0);
    let severity_factor = 0.5 + severity / 200.0;

    let confidence = credibility_factor * 0.4 + signal_factor * 0.3 + severity_factor * 0.3;
    (confidence.min(1.0) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> MultiFactorAnalyzer {
        MultiFactorAnalyzer::new()
    }

    #[test]
    fn crisis_keyword_in_title_scores_crisis() {
        let scores = analyzer().analyze(
            "Earthquake hits northern districts",
            "Rescue teams deployed",
            "unknown",
            None,
            Utc::now(),
            1,
        );
        assert_eq!(scores.severity_level, EventSeverity::Crisis);
        assert!(scores.severity_score >= 85.0);
    }

    #[test]
    fn no_severity_signals_with_numbers_is_low() {
        let scores = analyzer().analyze(
            "Quarterly update",
            "Revenue rose to 4.2 this quarter",
            "unknown",
            None,
            Utc::now(),
            1,
        );
        assert_eq!(scores.severity_level, EventSeverity::Low);
    }

    #[test]
    fn no_severity_signals_without_numbers_is_minimal() {
        let scores = analyzer().analyze("Weather update", "Skies were clear", "unknown", None, Utc::now(), 1);
        assert_eq!(scores.severity_level, EventSeverity::Minimal);
    }

    #[test]
    fn known_source_gets_flat_credibility() {
        assert_eq!(analyze_credibility("Ministry of Finance"), 90.0);
        assert_eq!(analyze_credibility("Unknown Blog"), DEFAULT_CREDIBILITY);
    }

    #[test]
    fn international_keyword_outranks_national_and_regional() {
        let (score, scope, _) = analyze_geography("the world bank and the imf issued a nationwide warning");
        assert_eq!(scope, GeographicScope::International);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn breaking_title_forces_max_temporal_score() {
        let (score, _) = analyze_temporal("growth slowed this week", "breaking: growth slowed", None, Utc::now());
        assert_eq!(score, 100.0);
    }

    #[test]
    fn old_publish_time_caps_temporal_score() {
        let now = Utc::now();
        let old = now - chrono::Duration::days(10);
        let (score, _) = analyze_temporal("routine filing", "quarterly filing", Some(old), now);
        assert!(score <= 25.0);
    }

    #[test]
    fn high_mention_count_with_viral_keyword_saturates_at_100() {
        let score = analyze_volume(60, "the story went viral overnight");
        assert_eq!(score, 100.0);
    }
}
