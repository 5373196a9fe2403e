//! # Engine Module
//!
//! The geometric algorithms of atomgeo. Each component turns a point cloud (or a pair of
//! frames) into a derived artifact and keeps no state between calls.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Degeneracy thresholds, contact exponents and the
//!   Z-matrix reference strategy
//! - **Error Handling** ([`error`]) - `GeometryError`, wrapping the lower-level errors
//! - **Distances** ([`distance`]) - Distance matrices with optional minimum image and
//!   distance changes under displacements
//! - **Contacts** ([`contact`]) - Covalent-radius based contact matrices
//! - **Internal Coordinates** ([`zmatrix`]) - Z-matrix construction with shared variables
//! - **Spherical Coordinates** ([`spherical`]) - Cartesian/spherical conversions
//! - **Frame Alignment** ([`alignment`]) - Linear maps between two frames of the same atoms
//!
//! ## Usage
//!
//! ```
//! use atomgeo::core::models::cloud::PointCloud;
//! use atomgeo::engine::distance::distance_matrix;
//! use atomgeo::engine::zmatrix::ZMatrixBuilder;
//!
//! let cloud = PointCloud::from(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
//! let distances = distance_matrix(&cloud);
//! assert_eq!(distances[(0, 0)], 0.0);
//!
//! let zmatrix = ZMatrixBuilder::new().build(&cloud)?;
//! assert_eq!(zmatrix.len(), 3);
//! # Ok::<(), atomgeo::engine::error::GeometryError>(())
//! ```

pub mod alignment;
pub mod config;
pub mod contact;
pub mod distance;
pub mod error;
pub mod spherical;
pub mod zmatrix;
