use nalgebra::{Matrix3, Point3, Vector3};
use serde::Deserialize;
use thiserror::Error;

/// Vectors shorter than this are treated as degenerate and left unscaled by [`normalize`].
pub const NORM_EPSILON: f64 = 1e-5;

// Arguments this close outside [-1, 1] are floating-point rounding, not bad input.
const INVERSE_TRIG_SLACK: f64 = 1e-12;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum VectorError {
    #[error("Atom index {index} is out of range for {len} positions")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Inverse trigonometric argument {0} is outside [-1, 1]")]
    Domain(f64),
}

/// The unit an angle is expressed in.
///
/// All angle-producing and angle-consuming helpers of the crate default to degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    #[inline]
    pub fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleUnit::Degrees => angle.to_radians(),
            AngleUnit::Radians => angle,
        }
    }

    #[inline]
    pub fn from_radians(self, angle: f64) -> f64 {
        match self {
            AngleUnit::Degrees => angle.to_degrees(),
            AngleUnit::Radians => angle,
        }
    }
}

#[inline]
pub fn cos(theta: f64, unit: AngleUnit) -> f64 {
    unit.to_radians(theta).cos()
}

#[inline]
pub fn sin(theta: f64, unit: AngleUnit) -> f64 {
    unit.to_radians(theta).sin()
}

/// Inverse cosine. The argument must lie in [-1, 1]; anything further out than
/// floating-point rounding is reported as a [`VectorError::Domain`].
pub fn acos(value: f64, unit: AngleUnit) -> Result<f64, VectorError> {
    Ok(unit.from_radians(unit_interval(value)?.acos()))
}

/// Inverse sine, with the same domain rules as [`acos`].
pub fn asin(value: f64, unit: AngleUnit) -> Result<f64, VectorError> {
    Ok(unit.from_radians(unit_interval(value)?.asin()))
}

fn unit_interval(value: f64) -> Result<f64, VectorError> {
    if value.is_nan() || value.abs() > 1.0 + INVERSE_TRIG_SLACK {
        return Err(VectorError::Domain(value));
    }
    Ok(value.clamp(-1.0, 1.0))
}

/// Returns the unit vector along `v`, or `v` itself when it is shorter than [`NORM_EPSILON`].
pub fn normalize(v: &Vector3<f64>) -> Vector3<f64> {
    let norm = v.norm();
    if norm < NORM_EPSILON { *v } else { v / norm }
}

/// Angle between two raw vectors.
pub fn vector_angle(
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    unit: AngleUnit,
) -> Result<f64, VectorError> {
    acos(a.dot(b) / (a.norm() * b.norm()), unit)
}

/// Angle in degrees at `vertex` between the rays towards `a` and `c`.
pub fn angle_at(
    a: &Point3<f64>,
    vertex: &Point3<f64>,
    c: &Point3<f64>,
) -> Result<f64, VectorError> {
    let v1 = normalize(&(a - vertex));
    let v2 = normalize(&(c - vertex));
    acos(v1.dot(&v2), AngleUnit::Degrees)
}

/// Signed torsion in degrees of `a-b-c-d` about the `b-c` axis, in (-180, 180].
///
/// The magnitude is the angle between the `b->a` and `c->d` bonds projected onto the
/// plane normal to the axis. The sign is that of `(d - c) . ((a - b) x (c - b))`; a
/// vanishing triple product (planar arrangements) counts as positive. When either bond is
/// collinear with the axis its projection vanishes and the torsion is reported as 0.
pub fn torsion(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Result<f64, VectorError> {
    let axis = normalize(&(c - b));
    let v1 = normalize(&(a - b));
    let v2 = normalize(&(d - c));

    let p1 = v1 - axis * v1.dot(&axis);
    let p2 = v2 - axis * v2.dot(&axis);
    if p1.norm() < NORM_EPSILON || p2.norm() < NORM_EPSILON {
        return Ok(0.0);
    }
    let magnitude = acos(normalize(&p1).dot(&normalize(&p2)), AngleUnit::Degrees)?;

    let orientation = v2.dot(&v1.cross(&axis));
    if orientation < 0.0 && magnitude < 180.0 {
        Ok(-magnitude)
    } else {
        Ok(magnitude)
    }
}

fn position(positions: &[Point3<f64>], index: usize) -> Result<&Point3<f64>, VectorError> {
    positions.get(index).ok_or(VectorError::IndexOutOfRange {
        index,
        len: positions.len(),
    })
}

pub fn distance(positions: &[Point3<f64>], i: usize, j: usize) -> Result<f64, VectorError> {
    Ok((position(positions, i)? - position(positions, j)?).norm())
}

/// Angle in degrees at atom `j` between atoms `i` and `k`.
pub fn angle(
    positions: &[Point3<f64>],
    i: usize,
    j: usize,
    k: usize,
) -> Result<f64, VectorError> {
    angle_at(
        position(positions, i)?,
        position(positions, j)?,
        position(positions, k)?,
    )
}

/// Signed dihedral in degrees of atoms `i-j-k-l` about the `j-k` bond. See [`torsion`].
pub fn dihedral(
    positions: &[Point3<f64>],
    i: usize,
    j: usize,
    k: usize,
    l: usize,
) -> Result<f64, VectorError> {
    torsion(
        position(positions, i)?,
        position(positions, j)?,
        position(positions, k)?,
        position(positions, l)?,
    )
}

/// Rotation matrix for a rotation by `angle` about `axis` (Rodrigues' formula).
///
/// `R = I cos(t) + (1 - cos(t)) k k^T + sin(t) [k]x`, where `k` is the normalized axis and
/// `[k]x` its cross-product matrix. The axis does not need to be a unit vector.
pub fn rotation_matrix(axis: &Vector3<f64>, angle: f64, unit: AngleUnit) -> Matrix3<f64> {
    let k = normalize(axis);
    let (sin_t, cos_t) = unit.to_radians(angle).sin_cos();
    Matrix3::identity() * cos_t + (k * k.transpose()) * (1.0 - cos_t) + k.cross_matrix() * sin_t
}
