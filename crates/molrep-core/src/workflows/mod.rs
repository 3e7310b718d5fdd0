//! # Workflows Module
//!
//! This module provides high-level workflow implementations that orchestrate complete
//! dataset conversions, from a record source to a persisted, random-access dataset.
//!
//! ## Overview
//!
//! Workflows are the top-level entry points for users of the library. Each one wires
//! a representation builder through the memoizing conversion engine: it derives the
//! cache directory from the configuration, runs any preparatory passes (such as the
//! voxel extent scan), and hands back a [`ConvertedDataset`](crate::engine::dataset::ConvertedDataset)
//! handle, reusing a previously completed cache whenever the configuration matches.
//!
//! ## Architecture
//!
//! The module is organized around the conversion entry points:
//!
//! - **Conversion Workflows** ([`convert`]) - Graph, point, and voxel dataset
//!   materialization plus whole-source interface-map computation.
//!
//! ## Key Capabilities
//!
//! - **End-to-end conversion** from record source to indexed on-disk dataset
//! - **Deterministic cache layout** keyed by representation kind and parameters
//! - **Two-pass voxel pipeline** computing the dataset-wide grid before building
//! - **Progress monitoring** with per-stage and per-item reporting
//! - **Error handling** carrying the offending configuration values

pub mod convert;
