//! Sentiment scoring (spec §4.5 item 2): a two-backend abstraction behind a
//! single `SentimentResult` shape (the Open Question resolution recorded in
//! `DESIGN.md` — no separate `overall`/`overall_level` struct), grounded on
//! `sentiment_analyzer.py`'s `SentimentResult` dataclass and `VaderBackend`.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use newsroom_common::SentimentLevel;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SentimentResult {
    pub score: f64,
    pub score_normalized: f64,
    pub label: SentimentLevel,
    pub confidence: f64,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub backend: &'static str,
}

fn positive_lexicon() -> &'static [&'static str] {
    &[
        "growth", "recovery", "improve", "improved", "improving", "boost", "surge", "record",
        "success", "successful", "gain", "gains", "agreement", "resolved", "stability", "stable",
        "positive", "strong", "expansion", "relief",
    ]
}

fn negative_lexicon() -> &'static [&'static str] {
    &[
        "crisis", "collapse", "shortage", "decline", "crash", "protest", "unrest", "curfew",
        "death", "deaths", "killed", "disaster", "emergency", "warning", "shutdown", "strike",
        "inflation", "devaluation", "outbreak", "violence",
    ]
}

static WORD_RE: OnceLock<Regex> = OnceLock::new();

fn word_re() -> &'static Regex {
    WORD_RE.get_or_init(|| Regex::new(r"[A-Za-z']+").expect("valid word regex"))
}

/// Swappable sentiment backend (spec §6 capability style): the fast lexicon
/// scorer is always available; a deep model is optional and plugged in the
/// same way, mirroring the source's `VaderBackend`/`TransformersBackend`
/// split behind a shared `BaseSentimentBackend`.
pub trait SentimentBackend: Send + Sync {
    fn name(&self) -> &'static str;
    fn analyze(&self, text: &str) -> SentimentResult;
}

/// Lexicon-based scorer: compound score is the normalized (positive −
/// negative) hit ratio over total words scanned, matching VADER's
/// compound-score shape without the full VADER ruleset.
#[derive(Default)]
pub struct LexiconSentimentBackend;

impl LexiconSentimentBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SentimentBackend for LexiconSentimentBackend {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn analyze(&self, text: &str) -> SentimentResult {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = word_re().find_iter(&lowered).map(|m| m.as_str()).collect();
        if words.is_empty() {
            return SentimentResult {
                score: 0.0,
                score_normalized: 50.0,
                label: SentimentLevel::Neutral,
                confidence: 0.0,
                positive: 0.0,
                negative: 0.0,
                neutral: 1.0,
                backend: "lexicon",
            };
        }

        let pos_set = positive_lexicon();
        let neg_set = negative_lexicon();
        let pos_hits = words.iter().filter(|w| pos_set.contains(w)).count() as f64;
        let neg_hits = words.iter().filter(|w| neg_set.contains(w)).count() as f64;
        let total = words.len() as f64;

        let positive = pos_hits / total;
        let negative = neg_hits / total;
        let neutral = (1.0 - positive - negative).max(0.0);

        let score = if pos_hits + neg_hits > 0.0 {
            ((pos_hits - neg_hits) / (pos_hits + neg_hits)).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let score_normalized = ((score + 1.0) / 2.0) * 100.0;
        let confidence = score.abs();

        SentimentResult {
            score,
            score_normalized,
            label: SentimentLevel::from_score(score),
            confidence,
            positive,
            negative,
            neutral,
            backend: "lexicon",
        }
    }
}

/// Blends title and body sentiment for a single article (spec §4.5 item 2):
/// `0.3×title + 0.7×body` when both are present, falling back to whichever
/// is present when the other is empty.
pub fn blend_article_sentiment(title: Option<&SentimentResult>, body: Option<&SentimentResult>) -> SentimentResult {
    match (title, body) {
        (Some(t), Some(b)) => {
            let score = 0.3 * t.score + 0.7 * b.score;
            let confidence = 0.3 * t.confidence + 0.7 * b.confidence;
            let positive = 0.3 * t.positive + 0.7 * b.positive;
            let negative = 0.3 * t.negative + 0.7 * b.negative;
            let neutral = 0.3 * t.neutral + 0.7 * b.neutral;
            SentimentResult {
                score,
                score_normalized: ((score + 1.0) / 2.0) * 100.0,
                label: SentimentLevel::from_score(score),
                confidence,
                positive,
                negative,
                neutral,
                backend: b.backend,
            }
        }
        (Some(t), None) => t.clone(),
        (None, Some(b)) => b.clone(),
        (None, None) => SentimentResult {
            score: 0.0,
            score_normalized: 50.0,
            label: SentimentLevel::Neutral,
            confidence: 0.0,
            positive: 0.0,
            negative: 0.0,
            neutral: 1.0,
            backend: "lexicon",
        },
    }
}

/// Article-level convenience wrapper: scores title and body independently
/// with the given backend, then blends per spec §4.5 item 2.
pub fn analyze_article_sentiment(backend: &dyn SentimentBackend, title: &str, body: &str) -> BTreeMap<&'static str, SentimentResult> {
    let title_result = (!title.trim().is_empty()).then(|| backend.analyze(title));
    let body_result = (!body.trim().is_empty()).then(|| backend.analyze(body));
    let overall = blend_article_sentiment(title_result.as_ref(), body_result.as_ref());

    let mut out = BTreeMap::new();
    if let Some(t) = title_result {
        out.insert("title", t);
    }
    if let Some(b) = body_result {
        out.insert("body", b);
    }
    out.insert("overall", overall);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_words_classify_as_positive() {
        let backend = LexiconSentimentBackend::new();
        let result = backend.analyze("Economic recovery brings growth and stability to the region.");
        assert_eq!(result.label, SentimentLevel::VeryPositive);
        assert!(result.score > 0.0);
    }

    #[test]
    fn negative_words_classify_as_negative() {
        let backend = LexiconSentimentBackend::new();
        let result = backend.analyze("Crisis and shortage trigger protest and curfew amid unrest.");
        assert_eq!(result.label, SentimentLevel::VeryNegative);
        assert!(result.score < 0.0);
    }

    #[test]
    fn no_sentiment_words_is_neutral() {
        let backend = LexiconSentimentBackend::new();
        let result = backend.analyze("The committee meets every Tuesday afternoon.");
        assert_eq!(result.label, SentimentLevel::Neutral);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn empty_text_is_neutral_with_zero_confidence() {
        let backend = LexiconSentimentBackend::new();
        let result = backend.analyze("");
        assert_eq!(result.label, SentimentLevel::Neutral);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn blend_weights_body_more_than_title() {
        let backend = LexiconSentimentBackend::new();
        let title = backend.analyze("Routine update");
        let body = backend.analyze("Crisis deepens as shortage and unrest spread nationwide.");
        let blended = blend_article_sentiment(Some(&title), Some(&body));
        assert!((blended.score - (0.3 * title.score + 0.7 * body.score)).abs() < 1e-9);
    }

    #[test]
    fn analyze_article_sentiment_includes_overall_key() {
        let backend = LexiconSentimentBackend::new();
        let results = analyze_article_sentiment(&backend, "Growth continues", "Stability and recovery reported across sectors.");
        assert!(results.contains_key("overall"));
        assert!(results.contains_key("title"));
        assert!(results.contains_key("body"));
    }
}
