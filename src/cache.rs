//! Batch-scan cache: a prebuilt procedure mapping stays valid until its
//! timeout elapses or any contributing source file's content hash
//! changes. Invalidation drops the whole mapping; there is no partial
//! refresh.

use crate::model::ProcedureMapping;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub struct NavigationCache {
    timeout: Duration,
    built_at: Option<Instant>,
    hashes: BTreeMap<PathBuf, String>,
    mapping: ProcedureMapping,
}

impl NavigationCache {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            built_at: None,
            hashes: BTreeMap::new(),
            mapping: ProcedureMapping::new(),
        }
    }

    /// Store a freshly built mapping along with content hashes of every
    /// file that contributed to it. Files that cannot be read are left
    /// untracked; their later appearance or absence does not invalidate.
    pub fn set(&mut self, mapping: ProcedureMapping, tracked: &[PathBuf]) {
        self.hashes.clear();
        for path in tracked {
            match hash_file(path) {
                Some(hash) => {
                    self.hashes.insert(path.clone(), hash);
                }
                None => {
                    tracing::debug!(path = %path.display(), "untrackable file, not hashed");
                }
            }
        }
        self.mapping = mapping;
        self.built_at = Some(Instant::now());
    }

    /// The cached mapping if still valid; validity is checked at read
    /// time, not on a background schedule.
    pub fn get(&mut self) -> Option<&ProcedureMapping> {
        if !self.is_valid() {
            self.clear();
            return None;
        }
        Some(&self.mapping)
    }

    pub fn is_valid(&self) -> bool {
        let Some(built_at) = self.built_at else {
            return false;
        };
        if built_at.elapsed() >= self.timeout {
            tracing::debug!("cache expired by timeout");
            return false;
        }
        for (path, expected) in &self.hashes {
            if hash_file(path).as_deref() != Some(expected.as_str()) {
                tracing::debug!(path = %path.display(), "cache invalidated by content change");
                return false;
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.built_at = None;
        self.hashes.clear();
        self.mapping = ProcedureMapping::new();
    }
}

fn hash_file(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    Some(blake3::hash(&bytes).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NavigationTarget, TargetKind};
    use std::fs;

    fn mapping_with(path: &str) -> ProcedureMapping {
        let mut mapping = ProcedureMapping::new();
        mapping.insert(
            path.to_string(),
            NavigationTarget {
                file: "router.ts".to_string(),
                line: 1,
                column: 1,
                byte_offset: 0,
                length: 9,
                kind: TargetKind::Router,
                procedure_name: None,
            },
        );
        mapping
    }

    #[test]
    fn fresh_cache_is_empty() {
        let mut cache = NavigationCache::new(Duration::from_secs(30));
        assert!(cache.get().is_none());
    }

    #[test]
    fn valid_cache_returns_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("router.ts");
        fs::write(&file, "export const appRouter = router({});\n").unwrap();
        let mut cache = NavigationCache::new(Duration::from_secs(30));
        cache.set(mapping_with("api"), &[file]);
        assert!(cache.get().unwrap().contains_key("api"));
    }

    #[test]
    fn content_change_invalidates_before_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("router.ts");
        fs::write(&file, "export const appRouter = router({});\n").unwrap();
        let mut cache = NavigationCache::new(Duration::from_secs(3600));
        cache.set(mapping_with("api"), &[file.clone()]);
        fs::write(&file, "export const appRouter = router({ a: x });\n").unwrap();
        assert!(cache.get().is_none());
    }

    #[test]
    fn timeout_expires_cache() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("router.ts");
        fs::write(&file, "export const appRouter = router({});\n").unwrap();
        let mut cache = NavigationCache::new(Duration::from_millis(0));
        cache.set(mapping_with("api"), &[file]);
        assert!(cache.get().is_none());
    }

    #[test]
    fn missing_tracked_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.ts");
        let mut cache = NavigationCache::new(Duration::from_secs(30));
        cache.set(mapping_with("api"), &[missing]);
        assert!(cache.get().unwrap().contains_key("api"));
    }
}
