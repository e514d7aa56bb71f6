use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const DEFAULT_STRIPES: usize = 64;

/// Fixed pool of write locks, one picked per person id by hashing.
///
/// Two identifiers may share a stripe; that only costs some parallelism.
/// The same identifier always lands on the same stripe, so its
/// read-merge-write cycles never interleave.
pub struct StripedLocks {
    stripes: Vec<Mutex<()>>,
}

impl StripedLocks {
    pub fn new(num_stripes: usize) -> Self {
        let num_stripes = num_stripes.max(1);
        Self {
            stripes: (0..num_stripes).map(|_| Mutex::new(())).collect(),
        }
    }

    pub fn stripe_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }

    /// Blocks until the stripe owning `key` is free.
    pub fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        // The guarded unit carries no state, so a poisoned stripe is still usable.
        self.stripes[self.stripe_for(key)]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.stripes.len()
    }
}

impl Default for StripedLocks {
    fn default() -> Self {
        Self::new(DEFAULT_STRIPES)
    }
}
