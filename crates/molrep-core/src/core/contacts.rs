//! Inter-chain contact detection over residue positions.
//!
//! Finds every pair of residues from *different* chains whose representative
//! points lie within a distance cutoff, grouped by ordered chain pair. The
//! search runs through the shared spatial index, so it scales as an
//! O(N log N) spatial join rather than an all-pairs scan.

use crate::core::models::record::{RecordError, StructureRecord};
use crate::core::models::resolution::Resolution;
use crate::core::spatial::{NeighborMode, SpatialError, SpatialIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Default contact cutoff in Ångström.
pub const DEFAULT_CUTOFF: f64 = 6.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContactError {
    #[error("invalid contact cutoff {cutoff}: {reason}")]
    InvalidCutoff { cutoff: f64, reason: &'static str },

    #[error("malformed record: {source}")]
    Record {
        #[from]
        source: RecordError,
    },

    #[error("spatial query failed: {source}")]
    Spatial {
        #[from]
        source: SpatialError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Inclusive inter-residue distance cutoff in Ångström.
    pub cutoff: f64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
        }
    }
}

impl ContactConfig {
    pub fn new(cutoff: f64) -> Self {
        Self { cutoff }
    }

    pub fn validate(&self) -> Result<(), ContactError> {
        if !self.cutoff.is_finite() || self.cutoff < 0.0 {
            return Err(ContactError::InvalidCutoff {
                cutoff: self.cutoff,
                reason: "the cutoff must be a non-negative finite distance",
            });
        }
        Ok(())
    }
}

/// One structure's inter-chain contacts, keyed by ordered `(chain_a, chain_b)`
/// and listing `(position-within-chain-a, position-within-chain-b)` pairs.
/// Both orientations of every contact are present.
pub type ChainPairContacts = BTreeMap<(String, String), Vec<(usize, usize)>>;

/// Detects inter-chain residue contacts in one record.
///
/// Every residue is queried against the index; matches sharing the query's
/// chain id are discarded (the residue itself included), and survivors are
/// grouped by ordered chain pair with chain-local positions. Positions count
/// occurrences of the chain id in record order. A record without residues
/// yields an empty map.
///
/// # Errors
///
/// Fails on an invalid cutoff or a record lacking a residue partition.
pub fn detect(
    record: &StructureRecord,
    config: &ContactConfig,
) -> Result<ChainPairContacts, ContactError> {
    config.validate()?;
    let frame = record.frame(Resolution::Residue)?;
    if frame.is_empty() {
        return Ok(ChainPairContacts::new());
    }

    let chain_ids = frame.chain_ids();
    let local = chain_local_positions(chain_ids);
    let index = SpatialIndex::build(frame.positions())?;
    let mode = NeighborMode::Radius {
        radius: config.cutoff,
    };

    let mut grouped = ChainPairContacts::new();
    for (i, chain_a) in chain_ids.iter().enumerate() {
        for neighbor in index.neighbors_of(i, mode) {
            let chain_b = &chain_ids[neighbor.index];
            if chain_a == chain_b {
                continue;
            }
            grouped
                .entry((chain_a.clone(), chain_b.clone()))
                .or_default()
                .push((local[i], local[neighbor.index]));
        }
    }
    for pairs in grouped.values_mut() {
        pairs.sort_unstable();
    }
    Ok(grouped)
}

/// Per-residue interface membership: `true` iff the residue has at least one
/// contact partner on another chain. Record order matches the residue frame,
/// so the flags can be attached as a scalar column after a `0.0`/`1.0` cast.
///
/// # Errors
///
/// Fails on an invalid cutoff or a record lacking a residue partition.
pub fn interface_flags(
    record: &StructureRecord,
    config: &ContactConfig,
) -> Result<Vec<bool>, ContactError> {
    config.validate()?;
    let frame = record.frame(Resolution::Residue)?;
    if frame.is_empty() {
        return Ok(Vec::new());
    }

    let chain_ids = frame.chain_ids();
    let index = SpatialIndex::build(frame.positions())?;
    let mode = NeighborMode::Radius {
        radius: config.cutoff,
    };
    Ok((0..frame.len())
        .map(|i| {
            index
                .neighbors_of(i, mode)
                .iter()
                .any(|n| chain_ids[n.index] != chain_ids[i])
        })
        .collect())
}

/// Chain-local positions in record order: the n-th residue of chain `C` gets
/// position `n`, regardless of how chains interleave.
fn chain_local_positions(chain_ids: &[String]) -> Vec<usize> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    chain_ids
        .iter()
        .map(|id| {
            let slot = seen.entry(id.as_str()).or_insert(0);
            let position = *slot;
            *slot += 1;
            position
        })
        .collect()
}

/// Inter-chain contacts across a whole source, keyed
/// `structure-id → chain-id → chain-id → pairs`.
///
/// Contact-free structures are absent rather than present-but-empty, so
/// membership checks double as "does this structure have an interface".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceMap {
    structures: BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<(usize, usize)>>>>,
}

impl InterfaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files one structure's detection result; an empty result is dropped.
    pub fn insert(&mut self, id: &str, contacts: ChainPairContacts) {
        if contacts.is_empty() {
            return;
        }
        let entry = self.structures.entry(id.to_string()).or_default();
        for ((chain_a, chain_b), pairs) in contacts {
            entry.entry(chain_a).or_default().insert(chain_b, pairs);
        }
    }

    /// Number of structures with at least one inter-chain contact.
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    pub fn contains_structure(&self, id: &str) -> bool {
        self.structures.contains_key(id)
    }

    pub fn structure_ids(&self) -> impl Iterator<Item = &str> {
        self.structures.keys().map(String::as_str)
    }

    /// Contact pairs between two chains of one structure, if any.
    pub fn contacts(&self, id: &str, chain_a: &str, chain_b: &str) -> Option<&[(usize, usize)]> {
        self.structures
            .get(id)?
            .get(chain_a)?
            .get(chain_b)
            .map(Vec::as_slice)
    }

    /// Chains in contact with `chain`, in sorted order.
    pub fn partners(&self, id: &str, chain: &str) -> Vec<&str> {
        self.structures
            .get(id)
            .and_then(|chains| chains.get(chain))
            .map(|partners| partners.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
