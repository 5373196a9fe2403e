//! # atomgeo Core Library
//!
//! Geometry routines for atomic point clouds: pairwise and periodic distances, contact
//! strengths, internal (Z-matrix) coordinates, spherical coordinates and the linear map
//! between two frames that describe the same atoms.
//!
//! ## Architectural Philosophy
//!
//! The library is split in two layers with a strict one-way dependency.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`PointCloud`, `Lattice`,
//!   `Element`) and the leaf vector math every other component builds on.
//!
//! - **[`engine`]: The Algorithms.** Distance and contact matrices, the Z-matrix builder,
//!   spherical conversions and the frame aligner, together with their shared
//!   configuration and error types.
//!
//! Every operation is a pure function of its arguments. Inputs are borrowed and never
//! modified, and nothing is cached between calls, so all entry points can be used from
//! several threads at once without coordination.

pub mod core;
pub mod engine;
