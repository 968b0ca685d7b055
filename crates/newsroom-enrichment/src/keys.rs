//! API-key rotation manager shared by LLM-backed enrichment stages (spec
//! §4.5 "LLM-backed stages share a single API-key rotation manager"): each
//! key is rate-limited individually, a 429/quota error marks the key
//! limited with a `retry_after`, and rotation moves to the next available
//! key. When every key is limited the manager returns the deterministic
//! rule-based fallback — it never raises, mirroring
//! `newsroom_core::capability::LlmClient`'s `LlmResponseSource::Fallback`
//! contract (spec §7 DependencyUnavailable / §8).

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::EnrichmentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    RateLimited,
    QuotaExceeded,
    Success,
}

struct KeyState {
    id: String,
    limited_until: Option<DateTime<Utc>>,
}

/// Rotates across a fixed pool of API keys, skipping any currently rate
/// limited. Never blocks and never errors: callers that exhaust the pool
/// get `None` and are expected to fall back to the rule-based path.
pub struct KeyRotationManager {
    keys: Mutex<Vec<KeyState>>,
    next_index: Mutex<usize>,
}

impl KeyRotationManager {
    pub fn new(key_ids: impl IntoIterator<Item = String>) -> Self {
        let keys = key_ids.into_iter().map(|id| KeyState { id, limited_until: None }).collect();
        Self { keys: Mutex::new(keys), next_index: Mutex::new(0) }
    }

    pub fn key_count(&self) -> usize {
        self.keys.lock().expect("key rotation lock poisoned").len()
    }

    /// Returns the id of the next available (not currently limited) key,
    /// rotating round-robin across the pool. `None` means every key is
    /// presently limited — callers should use the rule-based fallback.
    pub fn next_available(&self, now: DateTime<Utc>) -> Option<String> {
        let keys = self.keys.lock().expect("key rotation lock poisoned");
        if keys.is_empty() {
            return None;
        }
        let mut idx = self.next_index.lock().expect("key rotation index lock poisoned");
        for _ in 0..keys.len() {
            let candidate = &keys[*idx % keys.len()];
            let this_idx = *idx;
            *idx = (*idx + 1) % keys.len();
            let available = match candidate.limited_until {
                Some(limit) => limit <= now,
                None => true,
            };
            if available {
                return Some(keys[this_idx].id.clone());
            }
        }
        None
    }

    /// Marks a key limited until `retry_after`. Called on 429/quota errors
    /// from the underlying provider.
    pub fn mark_limited(&self, key_id: &str, retry_after: DateTime<Utc>) {
        let mut keys = self.keys.lock().expect("key rotation lock poisoned");
        if let Some(k) = keys.iter_mut().find(|k| k.id == key_id) {
            k.limited_until = Some(retry_after);
        }
    }

    pub fn mark_outcome(&self, key_id: &str, outcome: KeyOutcome, now: DateTime<Utc>) {
        match outcome {
            KeyOutcome::RateLimited => self.mark_limited(key_id, now + chrono::Duration::seconds(60)),
            KeyOutcome::QuotaExceeded => self.mark_limited(key_id, now + chrono::Duration::hours(1)),
            KeyOutcome::Success => {
                let mut keys = self.keys.lock().expect("key rotation lock poisoned");
                if let Some(k) = keys.iter_mut().find(|k| k.id == key_id) {
                    k.limited_until = None;
                }
            }
        }
    }

    pub fn all_limited(&self, now: DateTime<Utc>) -> bool {
        let keys = self.keys.lock().expect("key rotation lock poisoned");
        !keys.is_empty() && keys.iter().all(|k| k.limited_until.is_some_and(|limit| limit > now))
    }

    /// Enrichment stages that require a genuine model call (rather than
    /// tolerating the rule-based fallback) check this before invoking the
    /// LLM client at all — an empty pool is a configuration error, not a
    /// runtime rate-limit condition.
    pub fn require_configured(&self) -> Result<(), EnrichmentError> {
        if self.key_count() == 0 {
            return Err(EnrichmentError::NoKeysConfigured);
        }
        Ok(())
    }
}
