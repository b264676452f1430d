use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash whatever `f` feeds into a fresh hasher.
pub fn stable_hash_with(f: impl FnOnce(&mut DefaultHasher)) -> u64 {
    let mut hasher = DefaultHasher::new();
    f(&mut hasher);
    hasher.finish()
}

/// Derive a child seed so sub-splits do not replay the parent permutation.
pub fn derive_seed(seed: u64, offset: u64, round: usize) -> u64 {
    stable_hash_with(|hasher| {
        seed.hash(hasher);
        offset.hash(hasher);
        round.hash(hasher);
    })
}
