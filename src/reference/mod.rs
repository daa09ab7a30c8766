//! Canonical per-phoneme reference fingerprints.
//!
//! Reference data is process-wide and read-only during scoring. The store
//! hands out immutable snapshot `Arc`s and replaces the whole snapshot on
//! reload, so concurrent scoring calls never observe a partial update; each
//! pipeline invocation binds to one snapshot for its entire run.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use ndarray::Array1;
use once_cell::sync::Lazy;
use tracing::info;

use crate::error::{Result, ScoreError};
use crate::phoneme::Phoneme;

/// Synthetic 13-dimensional embeddings per ARPABET phoneme, derived from
/// broad acoustic-phonetic properties. A placeholder until references are
/// re-derived from recorded exemplar audio through the same feature path.
const RAW_EMBEDDINGS: &str = include_str!("../../assets/reference/embeddings.json");

static BUILTIN: Lazy<Arc<ReferenceSnapshot>> = Lazy::new(|| {
    let snapshot = ReferenceSnapshot::from_json(RAW_EMBEDDINGS, 1)
        .unwrap_or_else(|err| panic!("bundled reference embeddings are invalid: {err}"));
    Arc::new(snapshot)
});

/// Immutable, versioned set of reference vectors.
#[derive(Debug, Clone)]
pub struct ReferenceSnapshot {
    version: u64,
    dim: usize,
    entries: HashMap<Phoneme, Array1<f32>>,
}

impl ReferenceSnapshot {
    /// Parses a `{"AA": [..], ...}` JSON table, requiring every vector to
    /// share one dimensionality.
    pub fn from_json(raw: &str, version: u64) -> Result<Self> {
        let parsed: HashMap<Phoneme, Vec<f32>> = serde_json::from_str(raw).map_err(|err| {
            ScoreError::invalid_config(format!("reference table is not valid JSON: {err}"))
        })?;
        let entries = parsed
            .into_iter()
            .map(|(phoneme, values)| (phoneme, Array1::from_vec(values)))
            .collect();
        Self::from_entries(entries, version)
    }

    pub fn from_entries(entries: HashMap<Phoneme, Array1<f32>>, version: u64) -> Result<Self> {
        let mut dims = entries.values().map(|v| v.len());
        let dim = dims
            .next()
            .ok_or_else(|| ScoreError::invalid_config("reference table is empty"))?;
        if dim == 0 || dims.any(|d| d != dim) {
            return Err(ScoreError::invalid_config(
                "reference vectors must share one non-zero dimensionality",
            ));
        }
        if entries
            .values()
            .any(|vector| vector.iter().any(|v| !v.is_finite()))
        {
            return Err(ScoreError::invalid_config(
                "reference vectors must be finite",
            ));
        }
        Ok(Self {
            version,
            dim,
            entries,
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Dimensionality shared by every entry.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, phoneme: Phoneme) -> Option<&Array1<f32>> {
        self.entries.get(&phoneme)
    }

    /// Exactly one vector per input phoneme, in order, or a lookup failure.
    pub fn vectors_for(&self, phonemes: &[Phoneme]) -> Result<Vec<&Array1<f32>>> {
        phonemes
            .iter()
            .map(|&phoneme| {
                self.get(phoneme).ok_or_else(|| ScoreError::UnknownPhoneme {
                    symbol: phoneme.as_str().to_string(),
                })
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Phoneme, &Array1<f32>)> {
        self.entries.iter().map(|(&phoneme, vector)| (phoneme, vector))
    }
}

/// Copy-and-swap holder for the current [`ReferenceSnapshot`].
#[derive(Debug)]
pub struct ReferenceStore {
    current: RwLock<Arc<ReferenceSnapshot>>,
}

impl ReferenceStore {
    /// Store seeded with the bundled synthetic table.
    pub fn builtin() -> Self {
        Self {
            current: RwLock::new(Arc::clone(&BUILTIN)),
        }
    }

    /// The snapshot in effect right now. In-flight holders keep their own
    /// `Arc` and are unaffected by later reloads.
    pub fn snapshot(&self) -> Arc<ReferenceSnapshot> {
        Arc::clone(
            &self
                .current
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Swaps in a new reference set, bumping the version.
    pub fn reload(&self, entries: HashMap<Phoneme, Array1<f32>>) -> Result<u64> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let version = guard.version() + 1;
        let snapshot = ReferenceSnapshot::from_entries(entries, version)?;
        *guard = Arc::new(snapshot);
        info!(version, "reference snapshot reloaded");
        Ok(version)
    }
}

impl Default for ReferenceStore {
    fn default() -> Self {
        Self::builtin()
    }
}
