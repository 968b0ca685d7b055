//! Bounded typed claim extraction (spec §4.3 "ClaimExtractor"): numeric,
//! attribution, and event claims, each carrying a fingerprint for
//! cross-article matching in [`crate::corroboration`].

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimKind {
    Numeric,
    Attribution,
    Event,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub kind: ClaimKind,
    pub text: String,
    pub fingerprint: String,
    pub numeric_value: Option<f64>,
}

fn numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(%|percent|bp|basis points|million|billion|rs\.?|usd|\$)")
            .unwrap()
    })
}

fn attribution_to_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)according to ([A-Za-z][\w .&]{2,40})").unwrap())
}

fn attribution_said_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Z][\w .&]{2,40}?) (?:said|stated|announced)\b").unwrap())
}

const EVENT_VERBS: &[&str] = &[
    "protest", "strike", "raise", "cut", "announce", "ban", "resign", "collapse", "default",
    "suspend", "devalue", "shortage", "blackout", "boycott", "nationalize",
];

fn event_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alternation = EVENT_VERBS.join("|");
        Regex::new(&format!(r"(?i)\b({alternation})(s|ed|ing)?\b")).unwrap()
    })
}

pub struct ClaimExtractor;

impl Default for ClaimExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> Vec<Claim> {
        let mut claims = Vec::new();
        claims.extend(extract_numeric(text));
        claims.extend(extract_attribution(text));
        claims.extend(extract_event(text));
        claims
    }
}

fn extract_numeric(text: &str) -> Vec<Claim> {
    numeric_re()
        .captures_iter(text)
        .filter_map(|c| {
            let value: f64 = c[1].parse().ok()?;
            let unit = c[2].to_ascii_lowercase().replace('.', "");
            Some(Claim {
                kind: ClaimKind::Numeric,
                text: c[0].to_string(),
                fingerprint: format!("numeric:{unit}"),
                numeric_value: Some(value),
            })
        })
        .collect()
}

fn extract_attribution(text: &str) -> Vec<Claim> {
    let to_claims = attribution_to_re().captures_iter(text).filter_map(|c| {
        let speaker = c.get(1)?.as_str().trim();
        attribution_claim(speaker, &c[0])
    });
    let said_claims = attribution_said_re().captures_iter(text).filter_map(|c| {
        let speaker = c.get(1)?.as_str().trim();
        attribution_claim(speaker, &c[0])
    });
    to_claims.chain(said_claims).collect()
}

fn attribution_claim(speaker: &str, matched_text: &str) -> Option<Claim> {
    if speaker.is_empty() {
        return None;
    }
    let normalized = speaker.trim_end_matches(',').to_ascii_lowercase();
    Some(Claim {
        kind: ClaimKind::Attribution,
        text: matched_text.to_string(),
        fingerprint: format!("attribution:{normalized}"),
        numeric_value: None,
    })
}

fn extract_event(text: &str) -> Vec<Claim> {
    event_re()
        .captures_iter(text)
        .filter_map(|c| {
            let verb = c.get(1)?.as_str().to_ascii_lowercase();
            Some(Claim {
                kind: ClaimKind::Event,
                text: c[0].to_string(),
                fingerprint: format!("event:{verb}"),
                numeric_value: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_numeric_claim_with_unit() {
        let claims = ClaimExtractor::new().extract("Central bank raises rates 50 bp this quarter");
        let numeric = claims.iter().find(|c| c.kind == ClaimKind::Numeric).unwrap();
        assert_eq!(numeric.numeric_value, Some(50.0));
        assert_eq!(numeric.fingerprint, "numeric:bp");
    }

    #[test]
    fn extracts_attribution_claim() {
        let claims = ClaimExtractor::new().extract("According to the Ministry of Finance, growth slowed.");
        assert!(claims.iter().any(|c| c.kind == ClaimKind::Attribution));
    }

    #[test]
    fn extracts_event_claim() {
        let claims = ClaimExtractor::new().extract("Workers went on strike outside the factory gates");
        assert!(claims.iter().any(|c| c.kind == ClaimKind::Event && c.fingerprint == "event:strike"));
    }

    #[test]
    fn no_claims_in_unrelated_text() {
        let claims = ClaimExtractor::new().extract("The weather was pleasant today.");
        assert!(claims.is_empty());
    }
}
