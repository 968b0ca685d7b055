//! Change detection capability: conditional HTTP HEAD, byte-range content
//! sampling, and an RSS-specialised comparator (spec §4.1b/c/d). Modeled
//! as a capability trait so tests can substitute a fake without touching
//! the network (spec §9 "Polymorphism over ... change detectors").

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

use newsroom_core::CapabilityError;

#[derive(Debug, Clone, Default)]
pub struct HeadResult {
    pub not_modified: bool,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RssMeta {
    pub last_build_date: Option<String>,
    pub first_guid: Option<String>,
    pub item_count: usize,
}

#[async_trait]
pub trait ChangeDetector: Send + Sync {
    /// Conditional `HEAD` per RFC 7232 using `If-None-Match` /
    /// `If-Modified-Since`. A `304` maps to `not_modified = true`.
    async fn conditional_head(
        &self,
        url: &str,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> Result<HeadResult, CapabilityError>;

    /// Download up to `max_bytes` via `Range: bytes=0-N`, falling back to a
    /// full GET truncated to `max_bytes` if the server ignores `Range`.
    async fn fetch_sample(&self, url: &str, max_bytes: usize) -> Result<String, CapabilityError>;

    /// RSS-specialised detector: `<lastBuildDate>`, first `<guid>`, item count.
    async fn fetch_rss_meta(&self, url: &str) -> Result<RssMeta, CapabilityError>;
}

/// Default HTTP implementation backing [`ChangeDetector`].
pub struct HttpChangeDetector {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpChangeDetector {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl ChangeDetector for HttpChangeDetector {
    async fn conditional_head(
        &self,
        url: &str,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> Result<HeadResult, CapabilityError> {
        let mut req = self.client.head(url).timeout(self.timeout);
        if let Some(etag) = etag {
            req = req.header(reqwest::header::IF_NONE_MATCH, etag);
        }
        if let Some(lm) = last_modified {
            req = req.header(reqwest::header::IF_MODIFIED_SINCE, lm);
        }
        let response = req
            .send()
            .await
            .map_err(|e| CapabilityError::Upstream(e.to_string()))?;

        let not_modified = response.status() == reqwest::StatusCode::NOT_MODIFIED;
        let new_etag = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let new_last_modified = response
            .headers()
            .get(reqwest::header::LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(HeadResult {
            not_modified,
            etag: new_etag,
            last_modified: new_last_modified,
        })
    }

    async fn fetch_sample(&self, url: &str, max_bytes: usize) -> Result<String, CapabilityError> {
        let range = format!("bytes=0-{}", max_bytes.saturating_sub(1));
        let response = self
            .client
            .get(url)
            .header(reqwest::header::RANGE, range)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CapabilityError::Upstream(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CapabilityError::Upstream(e.to_string()))?;
        let truncated = &bytes[..bytes.len().min(max_bytes)];
        Ok(String::from_utf8_lossy(truncated).into_owned())
    }

    async fn fetch_rss_meta(&self, url: &str) -> Result<RssMeta, CapabilityError> {
        let body = self.fetch_sample(url, 64 * 1024).await?;
        Ok(parse_rss_meta(&body))
    }
}

fn last_build_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<lastBuildDate>(.*?)</lastBuildDate>").unwrap())
}

fn guid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<guid[^>]*>(.*?)</guid>").unwrap())
}

fn item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<item[\s>]").unwrap())
}

/// Parse the fields the RSS change detector needs out of a raw feed
/// sample. Deliberately minimal — full feed parsing is a scraper concern,
/// out of scope here (spec §1).
pub fn parse_rss_meta(body: &str) -> RssMeta {
    let last_build_date = last_build_date_re()
        .captures(body)
        .map(|c| c[1].trim().to_string());
    let first_guid = guid_re().captures(body).map(|c| c[1].trim().to_string());
    let item_count = item_re().find_iter(body).count();
    RssMeta {
        last_build_date,
        first_guid,
        item_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rss_fields() {
        let body = r#"<rss><channel><lastBuildDate>Mon, 01 Jan 2024 10:00:00 GMT</lastBuildDate>
            <item><guid>abc-123</guid></item>
            <item><guid>def-456</guid></item>
            </channel></rss>"#;
        let meta = parse_rss_meta(body);
        assert_eq!(meta.last_build_date.as_deref(), Some("Mon, 01 Jan 2024 10:00:00 GMT"));
        assert_eq!(meta.first_guid.as_deref(), Some("abc-123"));
        assert_eq!(meta.item_count, 2);
    }
}
