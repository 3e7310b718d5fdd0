//! # Engine Module
//!
//! This module implements the memoizing conversion layer, providing the stateful
//! machinery that materializes representation datasets to disk exactly once per
//! configuration.
//!
//! ## Overview
//!
//! The engine module drives a record source through a representation builder and
//! persists every surviving item to an indexed on-disk store. A completed store is
//! reused on subsequent constructions after validating that it was built with an
//! identical hook pipeline; a mismatch fails loudly rather than serving stale data.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules that handle different aspects
//! of the conversion lifecycle:
//!
//! - **Artifact Storage** ([`store`]) - The per-configuration cache directory with atomic writes
//! - **Fingerprinting** ([`fingerprint`]) - Canonical identity of the hook pipeline
//! - **Pipeline Hooks** ([`hooks`]) - Filter and transform seams between building and persisting
//! - **Dataset Handle** ([`dataset`]) - Open-or-build construction and random access
//! - **Progress Monitoring** ([`progress`]) - Progress reporting and user feedback mechanisms
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation
//!
//! ## Key Capabilities
//!
//! - **At-most-once conversion** detected through end-of-build marker files
//! - **All-or-nothing visibility** with markers written only after every item succeeds
//! - **Fingerprint validation** rejecting reuse under a different hook configuration
//! - **Parallel item construction** with deterministic sequential persistence
//! - **Random access** with broadcast indexing and an optional runtime transform

pub mod dataset;
pub mod error;
pub mod fingerprint;
pub mod hooks;
pub mod progress;
pub mod store;
