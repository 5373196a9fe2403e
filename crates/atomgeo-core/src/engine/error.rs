use super::config::ConfigError;
use crate::core::models::cloud::CloudError;
use crate::core::utils::geometry::VectorError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Invalid point cloud: {0}")]
    Cloud(#[from] CloudError),

    #[error("Numerical error: {0}")]
    Vector(#[from] VectorError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Contact matrix needs either element identities or a bonding-distance matrix")]
    MissingElements,

    #[error("No usable covalent radius for element {element}")]
    MissingRadius { element: String },

    #[error("Cannot build the {coordinate} reference for atom {atom}: no eligible earlier atom")]
    Construction {
        atom: usize,
        coordinate: &'static str,
    },
}
