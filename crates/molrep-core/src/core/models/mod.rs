//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent protein
//! structure records, providing the foundation for all representation building.
//!
//! ## Overview
//!
//! A structure record arrives from an external parser as a set of same-length
//! attribute columns grouped by resolution, plus a structure-level attribute
//! partition. The models here give that shape a typed, validated form:
//!
//! - **Represent the record** - Positions, type symbols, chain ids, and optional
//!   scalar annotation columns per resolution
//! - **Guarantee invariants** - Column lengths are checked once, at the boundary
//! - **Stay immutable** - Builders read records; only annotation columns may be
//!   attached afterwards
//!
//! ## Key Components
//!
//! - [`record`] - `StructureRecord`, its partitions, and construction-time validation
//! - [`resolution`] - The residue/atom granularity tag
//!
//! ## Usage
//!
//! ```ignore
//! use molrep::core::models::record::{ProteinMeta, ResolutionFrame, StructureRecord};
//!
//! let frame = ResolutionFrame::new(positions, types, chain_ids)?;
//! let record = StructureRecord::new(ProteinMeta::new("1abc"), Some(frame), None)?;
//! ```

pub mod record;
pub mod resolution;
