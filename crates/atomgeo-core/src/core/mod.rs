//! # Core Module
//!
//! Stateless building blocks shared by the engine.
//!
//! - **Point-cloud representation** ([`models`]) - Ordered positions with optional lattice
//!   and element identities, plus the covalent-radius lookup
//! - **Vector math** ([`utils`]) - Normalization, angles, dihedrals, degree-aware
//!   trigonometry and Rodrigues rotation matrices

pub mod models;
pub mod utils;
