//! # Core Module
//!
//! This module provides the fundamental building blocks for turning protein structure
//! records into machine-learning-ready representations, serving as the computational
//! core of the library.
//!
//! ## Overview
//!
//! The core module implements the essential data structures and stateless algorithms
//! required to describe a structure at a chosen resolution, encode its categorical
//! labels, query its geometry, and construct graph, point-cloud, and voxel
//! representations from it.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules that handle different aspects
//! of representation construction:
//!
//! - **Record Model** ([`models`]) - Typed structure records with per-resolution column frames
//! - **Record Streams** ([`source`]) - The length-known, re-iterable record source seam
//! - **Categorical Encoding** ([`encoding`]) - Fixed alphabets, tokenization, and one-hot labels
//! - **Spatial Queries** ([`spatial`]) - k-nearest-neighbor and radius adjacency over a k-d tree
//! - **Representation Builders** ([`represent`]) - Graph, point, and voxel construction
//! - **Contact Detection** ([`contacts`]) - Inter-chain residue contacts and interface maps
//!
//! ## Key Capabilities
//!
//! - **Validated record construction** rejecting mismatched column lengths at the boundary
//! - **Deterministic builders** producing bit-identical output for identical inputs
//! - **Degenerate-geometry tolerance** (k clamping, single-point structures, isolated nodes)
//! - **Dataset-wide voxel grids** so every item of a dataset yields stackable tensors

pub mod contacts;
pub mod encoding;
pub mod models;
pub mod represent;
pub mod source;
pub mod spatial;
