//! Deterministic seed hierarchy for reproducible runs.
//!
//! [`SeedHierarchy`] provides a 3-level derivation tree:
//!
//! ```text
//! Run seed
//! └── Episode seed (per episode within a run)
//!     └── Subsystem seed (sim noise, policy, scene init)
//! ```
//!
//! Child seeds are derived deterministically via hashing, ensuring that a
//! whole run is reproducible from a single root seed.

use std::hash::{DefaultHasher, Hash, Hasher};

/// Derive a child seed from a parent seed and a string key.
///
/// Uses `DefaultHasher` (SipHash-1-3) for fast, deterministic mixing.
///
/// # Example
///
/// ```
/// use armkit_core::seed::derive_seed;
///
/// let child = derive_seed(42, "policy");
/// assert_ne!(child, 42); // derived, not identical
/// let child2 = derive_seed(42, "policy");
/// assert_eq!(child, child2); // deterministic
/// ```
#[must_use]
pub fn derive_seed(parent: u64, key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    parent.hash(&mut hasher);
    key.hash(&mut hasher);
    hasher.finish()
}

/// Derive a child seed from a parent seed and a numeric index.
///
/// Convenience wrapper for indexed children (episode numbers, sweep IDs).
#[must_use]
pub fn derive_seed_indexed(parent: u64, index: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    parent.hash(&mut hasher);
    index.hash(&mut hasher);
    hasher.finish()
}

/// Hierarchical seed manager for reproducible runs.
///
/// Stores the root (run-level) seed and derives deterministic child seeds
/// for each episode and named subsystem.
///
/// # Example
///
/// ```
/// use armkit_core::seed::SeedHierarchy;
///
/// let seeds = SeedHierarchy::new(42);
/// let ep_seed = seeds.episode_seed(5);
/// let noise_seed = seeds.subsystem_seed(5, "sim_noise");
/// // All deterministic from root seed 42
/// ```
#[derive(Debug, Clone)]
pub struct SeedHierarchy {
    root: u64,
}

impl SeedHierarchy {
    /// Create a new hierarchy from a root seed.
    #[must_use]
    pub const fn new(root: u64) -> Self {
        Self { root }
    }

    /// The root (run-level) seed.
    #[must_use]
    pub const fn root(&self) -> u64 {
        self.root
    }

    /// Derive a seed for a specific episode.
    #[must_use]
    pub fn episode_seed(&self, episode_number: u64) -> u64 {
        derive_seed_indexed(self.root, episode_number)
    }

    /// Derive a seed for a named subsystem within an episode.
    #[must_use]
    pub fn subsystem_seed(&self, episode_number: u64, subsystem: &str) -> u64 {
        derive_seed(self.episode_seed(episode_number), subsystem)
    }

    /// Create a `ChaCha8Rng` from the root seed.
    #[must_use]
    pub fn root_rng(&self) -> rand_chacha::ChaCha8Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha8Rng::seed_from_u64(self.root)
    }

    /// Create a `ChaCha8Rng` from an episode-level seed.
    #[must_use]
    pub fn episode_rng(&self, episode_number: u64) -> rand_chacha::ChaCha8Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha8Rng::seed_from_u64(self.episode_seed(episode_number))
    }
}

impl Default for SeedHierarchy {
    fn default() -> Self {
        Self::new(0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
