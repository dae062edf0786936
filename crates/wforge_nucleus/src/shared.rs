//! In-process shared handle to the pattern store.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::NucleusResult;
use crate::pattern::{FixAction, FixPattern};
use crate::store::{LearnOutcome, PatternStore, StoreStats};

/// Cloneable handle shared by the build loop and fix strategies.
///
/// Each call is a lock-mutate-flush cycle. The lock is never held across an
/// `.await`, so the handle is safe to use from async code.
#[derive(Debug, Clone)]
pub struct SharedNucleus {
    inner: Arc<Mutex<PatternStore>>,
}

impl SharedNucleus {
    pub fn new(store: PatternStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Self {
        Self::new(PatternStore::load(path))
    }

    pub fn in_memory() -> Self {
        Self::new(PatternStore::in_memory())
    }

    pub fn match_fixes(&self, diagnostic: &str) -> Vec<FixPattern> {
        self.inner.lock().match_fixes(diagnostic)
    }

    pub fn record_outcome(&self, id: &str, success: bool) -> NucleusResult<f64> {
        self.inner.lock().record_outcome(id, success)
    }

    pub fn learn(
        &self,
        error_text: &str,
        description: impl Into<String>,
        fix: FixAction,
        success: bool,
    ) -> NucleusResult<LearnOutcome> {
        self.inner.lock().learn(error_text, description, fix, success)
    }

    pub fn get(&self, id: &str) -> Option<FixPattern> {
        self.inner.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.lock().stats()
    }

    /// Run `f` with shared access to the store.
    pub fn with<R>(&self, f: impl FnOnce(&PatternStore) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Run `f` with exclusive access to the store.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut PatternStore) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl From<PatternStore> for SharedNucleus {
    fn from(store: PatternStore) -> Self {
        Self::new(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_outcomes() {
        let nucleus = SharedNucleus::in_memory();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let nucleus = nucleus.clone();
                thread::spawn(move || {
                    for _ in 0..5 {
                        nucleus.record_outcome("builtin-missing-dev-script", false).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let pattern = nucleus.get("builtin-missing-dev-script").unwrap();
        assert_eq!(pattern.failure_count, 20);
        assert!((pattern.confidence - 0.1).abs() < 1e-9);
    }
}
