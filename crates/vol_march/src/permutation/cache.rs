//! Rebuild cache for the active permutation.
//!
//! One renderer holds one live permutation. The cache compares flag
//! fingerprints to decide whether a rebuild is needed, and always drops the
//! previous permutation before building its replacement so two live
//! permutations never coexist.
use crate::error::{Error, Result};
use crate::permutation::builder::{fingerprint, Permutation, PermutationBuilder, SamplerKind};
use crate::permutation::options::RenderOptions;

struct CacheEntry {
    fingerprint: u64,
    permutation: Permutation,
}

/// Single-slot permutation cache keyed by the flag fingerprint.
pub struct PermutationCache {
    entry: Option<CacheEntry>,
}

impl PermutationCache {
    pub fn new() -> Self {
        Self { entry: None }
    }

    /// The live permutation, if one has been built.
    pub fn current(&self) -> Option<&Permutation> {
        self.entry.as_ref().map(|e| &e.permutation)
    }

    /// Drops the live permutation.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Returns the live permutation for `options`, rebuilding only when the
    /// flag fingerprint changed. A failed rebuild leaves the cache empty.
    pub fn get_or_build(
        &mut self,
        options: &RenderOptions,
        sampler: SamplerKind,
    ) -> Result<&Permutation> {
        let fp = fingerprint(options, sampler);
        let stale = match &self.entry {
            Some(entry) => entry.fingerprint != fp,
            None => true,
        };

        if stale {
            // Release the previous permutation before building the new one.
            self.entry = None;
            let permutation = PermutationBuilder::build(options, sampler)?;
            self.entry = Some(CacheEntry {
                fingerprint: fp,
                permutation,
            });
        }

        match &self.entry {
            Some(entry) => Ok(&entry.permutation),
            None => Err(Error::Other("entry missing after insert".to_string())),
        }
    }
}

impl Default for PermutationCache {
    fn default() -> Self {
        Self::new()
    }
}
