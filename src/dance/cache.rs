// Animation length cache - Measured clip durations, shared for one client session
// Writes are idempotent (a clip always measures the same), so last writer wins

use super::host::ClipRef;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared clip reference -> length (seconds) map
/// Cloning shares the same underlying cache
#[derive(Debug, Clone, Default)]
pub struct AnimationLengthCache {
    inner: Arc<RwLock<HashMap<ClipRef, f64>>>,
}

impl AnimationLengthCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached length for a clip
    pub fn get(&self, clip: &ClipRef) -> Option<f64> {
        let lengths = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        lengths.get(clip).copied()
    }

    /// Store a measured length; zero or invalid lengths are never cached
    pub fn insert(&self, clip: ClipRef, length: f64) -> bool {
        if !(length.is_finite() && length > 0.0) {
            return false;
        }
        let mut lengths = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        lengths.insert(clip, length);
        true
    }

    /// Drop all entries (end of client session)
    pub fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
