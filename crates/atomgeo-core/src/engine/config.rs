use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SPHERICAL_MIN_RADIUS: f64 = 0.01;
pub const DEFAULT_AZIMUTH_MIN_PROJECTION: f64 = 0.05;
pub const DEFAULT_BASIS_DET_THRESHOLD: f64 = 0.01;
pub const DEFAULT_CONTACT_N: i32 = 6;
pub const DEFAULT_CONTACT_M: i32 = 12;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Parameter '{name}' must be positive and finite, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("Contact exponents must be positive and distinct, got n = {n}, m = {m}")]
    InvalidExponents { n: i32, m: i32 },
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// How the Z-matrix builder picks default reference atoms.
///
/// The two requirements on default references conflict. The construction rule bonds
/// every atom to atom 0 and takes the lowest unused indices for the angle and dihedral
/// ([`LowestIndex`](Self::LowestIndex)). A three-atom chain, however, must have atom 2
/// bonded to atom 1, which only the chain behaviour of [`Preceding`](Self::Preceding)
/// gives. `Preceding` is the default; `LowestIndex` keeps the atom-0 rule available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceSelection {
    /// Bond to the closest preceding atom index, then walk further back for the
    /// angle and dihedral references (a chain-style Z-matrix).
    #[default]
    Preceding,
    /// Bond to atom 0, then take the lowest unused indices for angle and dihedral.
    LowestIndex,
}

/// Exponents of the contact switching function `(1 - r^n) / (1 - r^m)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactParams {
    pub n: i32,
    pub m: i32,
}

impl Default for ContactParams {
    fn default() -> Self {
        Self {
            n: DEFAULT_CONTACT_N,
            m: DEFAULT_CONTACT_M,
        }
    }
}

impl ContactParams {
    /// Both exponents must be positive and distinct for the kernel to be 1 at zero
    /// distance and finite at the bonding distance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self { n, m } = *self;
        if n <= 0 || m <= 0 || n == m {
            return Err(ConfigError::InvalidExponents { n, m });
        }
        Ok(())
    }
}

/// Numerical thresholds and strategy switches shared by the engine components.
///
/// All values are fixed for the lifetime of a config; components copy what they need.
/// Missing TOML keys fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    /// Separations below this collapse to the degenerate spherical triple `(0, 0, 0)`.
    pub spherical_min_radius: f64,
    /// Projected xy-lengths below this leave the azimuth undefined (reported as 0).
    pub azimuth_min_projection: f64,
    /// Minimum determinant for a candidate basis in the frame aligner.
    pub basis_det_threshold: f64,
    pub contact: ContactParams,
    pub reference_selection: ReferenceSelection,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            spherical_min_radius: DEFAULT_SPHERICAL_MIN_RADIUS,
            azimuth_min_projection: DEFAULT_AZIMUTH_MIN_PROJECTION,
            basis_det_threshold: DEFAULT_BASIS_DET_THRESHOLD,
            contact: ContactParams::default(),
            reference_selection: ReferenceSelection::default(),
        }
    }
}

impl GeometryConfig {
    pub fn builder() -> GeometryConfigBuilder {
        GeometryConfigBuilder::new()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("spherical_min_radius", self.spherical_min_radius)?;
        check_positive("azimuth_min_projection", self.azimuth_min_projection)?;
        check_positive("basis_det_threshold", self.basis_det_threshold)?;
        self.contact.validate()
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

#[derive(Default)]
pub struct GeometryConfigBuilder {
    spherical_min_radius: Option<f64>,
    azimuth_min_projection: Option<f64>,
    basis_det_threshold: Option<f64>,
    contact: Option<ContactParams>,
    reference_selection: Option<ReferenceSelection>,
}

impl GeometryConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spherical_min_radius(mut self, radius: f64) -> Self {
        self.spherical_min_radius = Some(radius);
        self
    }
    pub fn azimuth_min_projection(mut self, length: f64) -> Self {
        self.azimuth_min_projection = Some(length);
        self
    }
    pub fn basis_det_threshold(mut self, threshold: f64) -> Self {
        self.basis_det_threshold = Some(threshold);
        self
    }
    pub fn contact_exponents(mut self, n: i32, m: i32) -> Self {
        self.contact = Some(ContactParams { n, m });
        self
    }
    pub fn reference_selection(mut self, selection: ReferenceSelection) -> Self {
        self.reference_selection = Some(selection);
        self
    }

    pub fn build(self) -> Result<GeometryConfig, ConfigError> {
        let defaults = GeometryConfig::default();
        let config = GeometryConfig {
            spherical_min_radius: self
                .spherical_min_radius
                .unwrap_or(defaults.spherical_min_radius),
            azimuth_min_projection: self
                .azimuth_min_projection
                .unwrap_or(defaults.azimuth_min_projection),
            basis_det_threshold: self
                .basis_det_threshold
                .unwrap_or(defaults.basis_det_threshold),
            contact: self.contact.unwrap_or(defaults.contact),
            reference_selection: self
                .reference_selection
                .unwrap_or(defaults.reference_selection),
        };
        config.validate()?;
        Ok(config)
    }
}
