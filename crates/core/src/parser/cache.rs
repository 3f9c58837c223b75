use crate::error::Result;
use crate::pointcut::GlobPattern;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

const DEFAULT_CAPACITY: usize = 256;

/// Bounded cache of compiled name patterns keyed by their source text
#[derive(Debug)]
pub struct PatternCache {
    patterns: Mutex<LruCache<String, GlobPattern>>,
}

impl PatternCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            patterns: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Compiled pattern for `source`, compiling it on first use
    pub fn get_or_compile(&self, source: &str) -> Result<GlobPattern> {
        let mut patterns = self.patterns.lock();
        if let Some(pattern) = patterns.get(source) {
            return Ok(pattern.clone());
        }
        let pattern = GlobPattern::new(source)?;
        patterns.put(source.to_string(), pattern.clone());
        Ok(pattern)
    }

    pub fn len(&self) -> usize {
        self.patterns.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_compiled_pattern() {
        let cache = PatternCache::new(4);
        cache.get_or_compile("get*").unwrap();
        cache.get_or_compile("get*").unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recent() {
        let cache = PatternCache::new(2);
        for source in ["a*", "b*", "c*"] {
            cache.get_or_compile(source).unwrap();
        }
        assert_eq!(cache.len(), 2);
    }
}
