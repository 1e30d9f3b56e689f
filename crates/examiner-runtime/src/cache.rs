//! Feedback caching.
//!
//! Regrading an unchanged submission re-renders the identical prompt, so
//! parsed oracle feedback is cached in memory, keyed by model and prompt
//! hash, to avoid repeated inference costs.

use std::hash::{Hash, Hasher};
use std::time::Duration;

use moka::future::Cache;

use crate::feedback::ParsedFeedback;

/// Cache key for oracle feedback.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    model: String,
    prompt_hash: u64,
}

impl CacheKey {
    /// Build a key from the model identifier and the rendered prompt.
    pub fn new(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            prompt_hash: hash_prompt(prompt),
        }
    }
}

/// In-memory feedback cache using moka.
pub struct FeedbackCache {
    cache: Cache<CacheKey, ParsedFeedback>,
}

impl FeedbackCache {
    /// Create a cache with the given capacity and time-to-live.
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Get cached feedback.
    pub async fn get(&self, key: &CacheKey) -> Option<ParsedFeedback> {
        self.cache.get(key).await
    }

    /// Store feedback in the cache.
    pub async fn insert(&self, key: CacheKey, feedback: ParsedFeedback) {
        self.cache.insert(key, feedback).await;
    }

    /// Clear the cache.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Number of cached entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for FeedbackCache {
    fn default() -> Self {
        Self::new(10_000, Duration::from_secs(3600))
    }
}

fn hash_prompt(prompt: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    let mut hasher = DefaultHasher::new();
    prompt.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use examiner_core::ModelOutput;

    fn feedback() -> ParsedFeedback {
        ParsedFeedback {
            output: ModelOutput::default(),
            narrative: "Missing Points: None".to_string(),
        }
    }

    #[tokio::test]
    async fn test_cache_miss_then_hit() {
        let cache = FeedbackCache::default();
        let key = CacheKey::new("mixtral", "prompt body");

        assert!(cache.get(&key).await.is_none());

        cache.insert(key.clone(), feedback()).await;
        let cached = cache.get(&key).await;
        assert_eq!(cached, Some(feedback()));
    }

    #[test]
    fn test_keys_distinguish_model_and_prompt() {
        let a = CacheKey::new("mixtral", "prompt");
        let b = CacheKey::new("mixtral", "different prompt");
        let c = CacheKey::new("other-model", "prompt");

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, CacheKey::new("mixtral", "prompt"));
    }
}
