//! Content normalization ahead of signature hashing (spec §4.1c): strip
//! timestamps, session tokens, random ids, collapse whitespace.

use regex::Regex;
use std::sync::OnceLock;

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})?").unwrap()
    })
}

fn session_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(session|token|csrf|nonce)=[a-z0-9\-_.]+").unwrap()
    })
}

fn random_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[0-9a-f]{16,40}\b").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Normalize a raw byte sample into a stable string for signature hashing.
/// Idempotent: normalizing an already-normalized sample is a no-op.
pub fn normalize_sample(raw: &str) -> String {
    let step1 = timestamp_re().replace_all(raw, "<ts>");
    let step2 = session_token_re().replace_all(&step1, "<token>");
    let step3 = random_id_re().replace_all(&step2, "<id>");
    whitespace_re().replace_all(&step3, " ").trim().to_string()
}

/// MD5 content signature of a normalized sample (spec §4.1c).
pub fn content_signature(raw: &str) -> String {
    let normalized = normalize_sample(raw);
    format!("{:x}", md5::compute(normalized.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_ignores_timestamp_changes() {
        let a = "Published 2024-01-01T10:00:00Z — breaking news about rates";
        let b = "Published 2024-01-02T11:30:00Z — breaking news about rates";
        assert_eq!(content_signature(a), content_signature(b));
    }

    #[test]
    fn signature_changes_with_real_content() {
        let a = content_signature("Central bank raises rates 50bp");
        let b = content_signature("Central bank cuts rates 25bp");
        assert_ne!(a, b);
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_sample("a   b\n\tc"), "a b c");
    }
}
