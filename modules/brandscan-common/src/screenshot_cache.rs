//! Process-wide screenshot blob store: written once by the scan that
//! captured a screenshot, read many times by the Gateway's screenshot
//! endpoint. A `DashMap` gives lock-free reads across the many concurrent
//! HTTP GETs a single `cache_id` might see, matching the result cache's
//! concurrency shape.

use dashmap::DashMap;

use crate::model::{Screenshot, ScreenshotMime};

#[derive(Debug, Clone)]
pub struct CachedScreenshot {
    pub bytes: Vec<u8>,
    pub mime: ScreenshotMime,
    pub cached_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Default)]
pub struct ScreenshotCache {
    blobs: DashMap<String, CachedScreenshot>,
}

impl ScreenshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a screenshot under its own `cache_id`, last-write-wins on a
    /// collision.
    pub fn put(&self, screenshot: &Screenshot) {
        self.blobs.insert(
            screenshot.cache_id.clone(),
            CachedScreenshot {
                bytes: screenshot.bytes.clone(),
                mime: screenshot.mime,
                cached_at: chrono::Utc::now(),
            },
        );
    }

    pub fn get(&self, cache_id: &str) -> Option<CachedScreenshot> {
        self.blobs.get(cache_id).map(|entry| entry.clone())
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let cache = ScreenshotCache::new();
        let shot = Screenshot { cache_id: "abc".into(), bytes: vec![1, 2, 3], mime: ScreenshotMime::Png };
        cache.put(&shot);
        let got = cache.get("abc").unwrap();
        assert_eq!(got.bytes, vec![1, 2, 3]);
        assert_eq!(got.mime, ScreenshotMime::Png);
    }

    #[test]
    fn unknown_id_returns_none() {
        let cache = ScreenshotCache::new();
        assert!(cache.get("missing").is_none());
    }
}
