//! Keyword matching (spec §4.6): word-boundary matches against an
//! indicator's keyword list, banded into a match score.

use regex::Regex;

/// `≥3 keywords ⇒ 1.0, ≥2 ⇒ 0.8, ≥1 ⇒ 0.4, 0 ⇒ no match (0.0, excluded).`
pub fn match_score(matches: usize) -> f64 {
    match matches {
        0 => 0.0,
        1 => 0.4,
        2 => 0.8,
        _ => 1.0,
    }
}

/// A match score below this is treated as "no match" and the article is
/// excluded from the indicator's matched set (spec §4.6: "<0.3 ⇒ no
/// match" — unreachable via `match_score`'s bands other than the 0.0 case,
/// kept as an explicit named constant so the exclusion rule reads the
/// same as the spec).
pub const NO_MATCH_THRESHOLD: f64 = 0.3;

pub fn matches_keyword(text: &str, keyword: &str) -> bool {
    let escaped = regex::escape(keyword);
    let pattern = format!(r"(?i)\b{escaped}\b");
    Regex::new(&pattern).map(|re| re.is_match(text)).unwrap_or(false)
}

/// Counts how many of `keywords` appear (word-boundary, case-insensitive)
/// anywhere in `text`, then bands the count into a match score.
pub fn score_article(text: &str, keywords: &[String]) -> f64 {
    let matches = keywords.iter().filter(|kw| matches_keyword(text, kw)).count();
    match_score(matches)
}

pub fn is_matched(score: f64) -> bool {
    score >= NO_MATCH_THRESHOLD
}
