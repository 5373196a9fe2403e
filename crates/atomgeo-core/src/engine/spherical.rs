use super::config::GeometryConfig;
use super::error::GeometryError;
use crate::core::utils::geometry::{AngleUnit, acos, cos, sin};
use nalgebra::{Point3, Vector3};

/// Polar (from +z) and azimuthal (from +x, towards +y) angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SphericalAngles {
    pub polar: f64,
    pub azimuth: f64,
}

impl SphericalAngles {
    pub fn new(polar: f64, azimuth: f64) -> Self {
        Self { polar, azimuth }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spherical {
    pub radius: f64,
    pub polar: f64,
    pub azimuth: f64,
}

impl Spherical {
    pub fn angles(&self) -> SphericalAngles {
        SphericalAngles::new(self.polar, self.azimuth)
    }
}

/// Cartesian to spherical conversion relative to an origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalTransform {
    min_radius: f64,
    min_projection: f64,
}

impl Default for SphericalTransform {
    fn default() -> Self {
        Self::from_config(&GeometryConfig::default())
    }
}

impl SphericalTransform {
    pub fn from_config(config: &GeometryConfig) -> Self {
        Self {
            min_radius: config.spherical_min_radius,
            min_projection: config.azimuth_min_projection,
        }
    }

    /// Spherical coordinates of `point` seen from `origin`, angles in degrees.
    ///
    /// Points closer than the minimum radius give the degenerate `(0, 0, 0)`. When the
    /// projection onto the xy-plane is shorter than the minimum projection the azimuth is
    /// undefined and reported as 0, so such points only round-trip to within that length.
    pub fn to_spherical(
        &self,
        origin: &Point3<f64>,
        point: &Point3<f64>,
    ) -> Result<Spherical, GeometryError> {
        let separation = point - origin;
        let radius = separation.norm();
        if radius < self.min_radius {
            return Ok(Spherical::default());
        }

        let polar = acos(separation.z / radius, AngleUnit::Degrees)?;
        let xy_length = separation.x.hypot(separation.y);
        let azimuth = if xy_length < self.min_projection {
            0.0
        } else {
            let from_x = acos(separation.x / xy_length, AngleUnit::Degrees)?;
            if separation.y >= 0.0 { from_x } else { -from_x }
        };

        Ok(Spherical {
            radius,
            polar,
            azimuth,
        })
    }
}

/// Point at distance `radius` from `origin` in the direction `angles + offset`.
///
/// The offset lets a direction expressed in a local frame be composed with the
/// orientation of a reference frame.
pub fn to_cartesian(
    origin: &Point3<f64>,
    radius: f64,
    angles: SphericalAngles,
    offset: SphericalAngles,
) -> Point3<f64> {
    let polar = angles.polar + offset.polar;
    let azimuth = angles.azimuth + offset.azimuth;
    let unit = AngleUnit::Degrees;
    origin
        + Vector3::new(
            sin(polar, unit) * cos(azimuth, unit),
            sin(polar, unit) * sin(azimuth, unit),
            cos(polar, unit),
        ) * radius
}

/// Shifts every angle pair by `(d_polar, d_azimuth)`.
pub fn rotate_angles(
    angles: &[SphericalAngles],
    d_polar: f64,
    d_azimuth: f64,
) -> Vec<SphericalAngles> {
    angles
        .iter()
        .map(|a| SphericalAngles::new(a.polar + d_polar, a.azimuth + d_azimuth))
        .collect()
}
