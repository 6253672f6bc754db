//! UID registry implementation.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Namespaces UIDs are unique within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UidNamespace {
    Chapter,
    Edition,
}

/// Source of fresh UIDs for the chapter and tag algorithms.
pub trait UidAllocator {
    /// Return a non-zero UID not previously handed out or registered in
    /// `namespace`. Untracked namespaces skip the duplicate check.
    fn allocate(&mut self, namespace: UidNamespace) -> u64;

    /// Record an externally supplied UID.
    ///
    /// Returns `false` when the UID is 0 or already known in a tracked
    /// namespace.
    fn register(&mut self, namespace: UidNamespace, uid: u64) -> bool;

    /// Edition UID shared by every caller of this registry.
    ///
    /// Allocated on first use and stable afterwards.
    fn shared_edition_uid(&mut self) -> u64;
}

#[derive(Debug)]
struct NamespaceState {
    tracking: bool,
    used: HashSet<u64>,
}

impl NamespaceState {
    fn new() -> Self {
        Self {
            tracking: true,
            used: HashSet::new(),
        }
    }
}

/// Per-session UID registry.
///
/// Each editing session owns one. Sessions that run concurrently build
/// their own registries instead of sharing state; use
/// [`SharedUidRegistry`] when sharing is actually wanted.
#[derive(Debug)]
pub struct UidRegistry {
    rng: StdRng,
    chapters: NamespaceState,
    editions: NamespaceState,
    shared_edition: Option<u64>,
}

impl Default for UidRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UidRegistry {
    /// Create a registry seeded from OS entropy with tracking enabled.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a registry with a fixed seed, for reproducible UIDs.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Create a registry that tracks nothing in either namespace.
    pub fn untracked() -> Self {
        let mut registry = Self::new();
        registry.disable(UidNamespace::Chapter);
        registry.disable(UidNamespace::Edition);
        registry
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            chapters: NamespaceState::new(),
            editions: NamespaceState::new(),
            shared_edition: None,
        }
    }

    fn state(&self, namespace: UidNamespace) -> &NamespaceState {
        match namespace {
            UidNamespace::Chapter => &self.chapters,
            UidNamespace::Edition => &self.editions,
        }
    }

    fn state_mut(&mut self, namespace: UidNamespace) -> &mut NamespaceState {
        match namespace {
            UidNamespace::Chapter => &mut self.chapters,
            UidNamespace::Edition => &mut self.editions,
        }
    }

    /// Stop duplicate tracking for `namespace` and forget known UIDs.
    pub fn disable(&mut self, namespace: UidNamespace) {
        let state = self.state_mut(namespace);
        state.tracking = false;
        state.used.clear();
        tracing::debug!("UID tracking disabled for {:?}", namespace);
    }

    pub fn is_tracking(&self, namespace: UidNamespace) -> bool {
        self.state(namespace).tracking
    }

    /// Whether `uid` is already known in `namespace`.
    pub fn contains(&self, namespace: UidNamespace, uid: u64) -> bool {
        self.state(namespace).used.contains(&uid)
    }

    /// Number of UIDs tracked in `namespace`.
    pub fn tracked_count(&self, namespace: UidNamespace) -> usize {
        self.state(namespace).used.len()
    }
}

impl UidAllocator for UidRegistry {
    fn allocate(&mut self, namespace: UidNamespace) -> u64 {
        loop {
            let candidate: u64 = self.rng.gen();
            if candidate == 0 {
                continue;
            }
            let state = self.state_mut(namespace);
            if !state.tracking || state.used.insert(candidate) {
                return candidate;
            }
        }
    }

    fn register(&mut self, namespace: UidNamespace, uid: u64) -> bool {
        if uid == 0 {
            return false;
        }
        let state = self.state_mut(namespace);
        !state.tracking || state.used.insert(uid)
    }

    fn shared_edition_uid(&mut self) -> u64 {
        if let Some(uid) = self.shared_edition {
            return uid;
        }
        let uid = self.allocate(UidNamespace::Edition);
        self.shared_edition = Some(uid);
        uid
    }
}

/// Thread-safe handle to one registry shared between sessions.
#[derive(Debug, Clone, Default)]
pub struct SharedUidRegistry {
    inner: Arc<Mutex<UidRegistry>>,
}

impl SharedUidRegistry {
    pub fn new(registry: UidRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Disable tracking for `namespace` on the shared registry.
    pub fn disable(&self, namespace: UidNamespace) {
        self.inner.lock().disable(namespace);
    }

    pub fn contains(&self, namespace: UidNamespace, uid: u64) -> bool {
        self.inner.lock().contains(namespace, uid)
    }
}

impl UidAllocator for SharedUidRegistry {
    fn allocate(&mut self, namespace: UidNamespace) -> u64 {
        self.inner.lock().allocate(namespace)
    }

    fn register(&mut self, namespace: UidNamespace, uid: u64) -> bool {
        self.inner.lock().register(namespace, uid)
    }

    fn shared_edition_uid(&mut self) -> u64 {
        self.inner.lock().shared_edition_uid()
    }
}
