//! Stable element identity and identity hashing.
//!
//! Element ids are already hashes (or small integers), so maps keyed by
//! them skip re-hashing through [`IdentityHasher`].

use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hash, Hasher};

/// Stable identity of a retained element.
///
/// Name variants are hashed eagerly with wyhash (seed 0), so an id is
/// always a plain 8-byte payload plus its discriminant. Equality compares
/// both; the hash is the payload itself. Cross-variant collisions are
/// prevented by the equality check, not the hash.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElementId {
    Named(u64),
    Integer(u64),
    FocusHandle(u64),
}

impl ElementId {
    /// An id derived from a human-readable name.
    pub fn named(name: &str) -> Self {
        ElementId::Named(wyhash::wyhash(name.as_bytes(), 0))
    }

    /// An id derived from a caller-managed integer (e.g. a list index).
    pub fn integer(value: u64) -> Self {
        ElementId::Integer(value)
    }

    /// An id tied to a focus handle.
    pub fn focus_handle(handle: u64) -> Self {
        ElementId::FocusHandle(handle)
    }

    /// The 8-byte payload, regardless of variant.
    pub fn payload(self) -> u64 {
        match self {
            ElementId::Named(hash) => hash,
            ElementId::Integer(value) => value,
            ElementId::FocusHandle(handle) => handle,
        }
    }
}

impl Hash for ElementId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.payload());
    }
}

/// A pass-through hasher for keys that are already hashes.
#[derive(Default)]
pub struct IdentityHasher {
    hash: u64,
}

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        // Only fixed-width integer keys are expected; fold anything else so
        // the hasher stays total.
        for &byte in bytes {
            self.hash = self.hash.rotate_left(8) ^ u64::from(byte);
        }
    }

    fn write_u64(&mut self, value: u64) {
        self.hash = value;
    }
}

pub type IdentityBuildHasher = BuildHasherDefault<IdentityHasher>;

/// A hash map keyed by [`ElementId`] without redundant re-hashing.
pub type ElementIdMap<V> = HashMap<ElementId, V, IdentityBuildHasher>;
