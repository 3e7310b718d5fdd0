//! # Representation Builders Module
//!
//! This module converts one structure record at a time into a
//! machine-learning-ready representation.
//!
//! ## Overview
//!
//! All builders share one contract: input is a record plus an explicit
//! configuration object; output is a [`DatasetItem`] holding the constructed
//! representation together with the originating record, so downstream
//! consumers keep access to annotations. Builders never mutate the record
//! they consume, and building the same record with the same configuration
//! twice yields bit-identical output.
//!
//! ## Key Components
//!
//! - [`graph`] - Labeled graphs with k-nearest-neighbor or radius adjacency
//! - [`point`] - Raw point sets: coordinates plus an integer label per element
//! - [`voxel`] - Dense voxel tensors with dataset-wide fixed grid dimensions
//!
//! ## Error Taxonomy
//!
//! Input invariant violations (empty structures, unknown type symbols,
//! missing partitions) and configuration violations fail at build time with
//! [`BuildError`]; degenerate geometry that can be recovered locally (too few
//! points for `k`, isolated nodes) never errors.

pub mod graph;
pub mod point;
pub mod voxel;

use super::encoding::EncodingError;
use super::models::record::{RecordError, StructureRecord};
use super::models::resolution::Resolution;
use super::spatial::SpatialError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid value {value} for {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum BuildError {
    #[error("invalid builder configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("malformed record: {source}")]
    Record {
        #[from]
        source: RecordError,
    },

    #[error("label encoding failed: {source}")]
    Encoding {
        #[from]
        source: EncodingError,
    },

    #[error("spatial query failed: {source}")]
    Spatial {
        #[from]
        source: SpatialError,
    },

    #[error("structure '{id}' has no {resolution} elements to build from")]
    EmptyStructure { id: String, resolution: Resolution },
}

/// One dataset item: a constructed representation paired with the record it
/// was built from. This is the unit the memoizing conversion layer persists
/// and serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetItem<R> {
    pub representation: R,
    pub record: StructureRecord,
}

impl<R> DatasetItem<R> {
    pub fn new(representation: R, record: StructureRecord) -> Self {
        Self {
            representation,
            record,
        }
    }
}
