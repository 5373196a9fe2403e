//! # Core Models Module
//!
//! Data structures describing the point clouds the engine works on.
//!
//! ## Key Components
//!
//! - [`cloud`] - `PointCloud` and its periodic `Lattice`, built once at the API boundary
//!   from points, raw triples or flat coordinate buffers
//! - [`element`] - Element identities and the `CovalentRadii` lookup with its built-in table
//!
//! ## Usage
//!
//! ```
//! use atomgeo::core::models::cloud::{Lattice, PointCloud};
//!
//! let cloud = PointCloud::from(vec![[0.0, 0.0, 0.0], [0.96, 0.0, 0.0], [-0.24, 0.93, 0.0]])
//!     .with_symbols(&["O", "H", "H"])?
//!     .with_lattice(Lattice::orthorhombic(10.0, 10.0, 10.0));
//! assert_eq!(cloud.len(), 3);
//! # Ok::<(), atomgeo::core::models::cloud::CloudError>(())
//! ```

pub mod cloud;
pub mod element;
