//! Two-tier per-key result cache (C11): an in-process map consulted first,
//! falling through to an on-disk JSON file per fingerprint. Writes are
//! best-effort; reads enforce the TTL strictly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::warn;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct OnDiskEntry {
    payload: serde_json::Value,
    ttl_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct InProcessEntry {
    payload: serde_json::Value,
    ttl_expires_at: DateTime<Utc>,
}

/// `sha256(text || prompt_template || schema || prompt_version)`, hex
/// encoded — the cache key. Any one of the four inputs changing flips it.
pub fn fingerprint(text: &str, prompt_template: &str, schema: &serde_json::Value, prompt_version: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(prompt_template.as_bytes());
    hasher.update(schema.to_string().as_bytes());
    hasher.update(prompt_version.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct ResultCache {
    cache_dir: PathBuf,
    ttl: chrono::Duration,
    in_process: Mutex<HashMap<String, InProcessEntry>>,
}

impl ResultCache {
    pub fn new(cache_dir: impl Into<PathBuf>, ttl_seconds: u64) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ttl: chrono::Duration::seconds(ttl_seconds as i64),
            in_process: Mutex::new(HashMap::new()),
        }
    }

    fn entry_path(&self, key_name: &str, fingerprint: &str) -> PathBuf {
        self.cache_dir.join(key_name).join(format!("{fingerprint}.json"))
    }

    /// Returns the cached payload if present and unexpired. Checks the
    /// in-process tier first, then falls through to disk.
    pub async fn get(&self, key_name: &str, fingerprint: &str) -> Option<serde_json::Value> {
        let cache_key = format!("{key_name}/{fingerprint}");
        if let Some(entry) = self.in_process.lock().unwrap_or_else(|e| e.into_inner()).get(&cache_key) {
            if entry.ttl_expires_at > Utc::now() {
                return Some(entry.payload.clone());
            }
        }

        let path = self.entry_path(key_name, fingerprint);
        let bytes = tokio::fs::read(&path).await.ok()?;
        let on_disk: OnDiskEntry = serde_json::from_slice(&bytes).ok()?;
        if on_disk.ttl_expires_at <= Utc::now() {
            return None;
        }

        self.in_process.lock().unwrap_or_else(|e| e.into_inner()).insert(
            cache_key,
            InProcessEntry { payload: on_disk.payload.clone(), ttl_expires_at: on_disk.ttl_expires_at },
        );
        Some(on_disk.payload)
    }

    /// Writes to both tiers. The disk write is best-effort: a failure is
    /// logged and swallowed, never surfaced to the caller.
    pub async fn put(&self, key_name: &str, fingerprint: &str, payload: serde_json::Value) {
        let ttl_expires_at = Utc::now() + self.ttl;
        let cache_key = format!("{key_name}/{fingerprint}");

        self.in_process.lock().unwrap_or_else(|e| e.into_inner()).insert(
            cache_key,
            InProcessEntry { payload: payload.clone(), ttl_expires_at },
        );

        let path = self.entry_path(key_name, fingerprint);
        if let Err(e) = write_disk_entry(&path, &OnDiskEntry { payload, ttl_expires_at }).await {
            warn!(path = %path.display(), error = %e, "result cache disk write failed");
        }
    }
}

async fn write_disk_entry(path: &Path, entry: &OnDiskEntry) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec(entry).map_err(std::io::Error::other)?;
    tokio::fs::write(path, bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_changes_when_any_input_changes() {
        let schema = serde_json::json!({"type": "object"});
        let base = fingerprint("text", "template", &schema, "v1");
        assert_ne!(base, fingerprint("other text", "template", &schema, "v1"));
        assert_ne!(base, fingerprint("text", "other template", &schema, "v1"));
        assert_ne!(base, fingerprint("text", "template", &schema, "v2"));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let schema = serde_json::json!({"type": "object"});
        assert_eq!(
            fingerprint("text", "template", &schema, "v1"),
            fingerprint("text", "template", &schema, "v1")
        );
    }

    #[tokio::test]
    async fn round_trips_through_disk_when_in_process_tier_is_cold() {
        let dir = std::env::temp_dir().join(format!("brandscan-cache-test-{}", std::process::id()));
        let cache = ResultCache::new(&dir, 3600);
        let payload = serde_json::json!({"themes": []});
        cache.put("positioning_themes", "abc123", payload.clone()).await;

        cache.in_process.lock().unwrap().clear();
        let fetched = cache.get("positioning_themes", "abc123").await;
        assert_eq!(fetched, Some(payload));

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn miss_returns_none() {
        let dir = std::env::temp_dir().join(format!("brandscan-cache-test-miss-{}", std::process::id()));
        let cache = ResultCache::new(&dir, 3600);
        assert_eq!(cache.get("positioning_themes", "does-not-exist").await, None);
    }
}
