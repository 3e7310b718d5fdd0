//! # MolRep Core Library
//!
//! A high-performance library for converting raw 3D protein structure records into
//! machine-learning-ready representations — labeled graphs, point clouds, and voxel
//! grids — with reproducible, at-most-once-per-configuration on-disk caching.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`StructureRecord`),
//!   the categorical encoders, the spatial index adapter, the representation builders,
//!   and inter-chain contact detection. Everything here is a pure function of its inputs.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer owns the memoizing conversion
//!   machinery: the on-disk `ArtifactStore` with atomic marker files, pipeline
//!   fingerprinting, filter/transform hooks, and the `ConvertedDataset` random-access
//!   handle.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing layer.
//!   It ties the `engine` and `core` together to execute complete conversions, such as
//!   materializing a whole record source as a voxel dataset or computing an interface
//!   map. It provides a simple and powerful entry point for end-users of the library.

pub mod core;
pub mod engine;
pub mod workflows;
