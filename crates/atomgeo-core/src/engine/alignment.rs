use super::config::GeometryConfig;
use super::error::GeometryError;
use crate::core::models::cloud::CloudError;
use crate::core::utils::geometry::{
    AngleUnit, NORM_EPSILON, normalize, rotation_matrix, vector_angle,
};
use itertools::Itertools;
use nalgebra::{Matrix3, Point3, Vector3};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    StandardToInput,
    InputToStandard,
}

/// Whether a target is a position (origins apply) or a free vector (origins ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Position,
    Vector,
}

/// The atoms (indices into the frames) whose relative vectors spanned the solved basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisKind {
    /// Three non-coplanar atom vectors.
    Volume([usize; 3]),
    /// Two independent atom vectors, completed with their cross product.
    Plane([usize; 2]),
    /// A single atom vector, matched by rotation about the normal of the two frames' vectors.
    Axis(usize),
    /// Nothing to align; only the origin shift applies.
    Trivial,
}

/// A solved linear map between a standard frame and an input frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    linear: Matrix3<f64>,
    inverse: Option<Matrix3<f64>>,
    standard_origin: Vector3<f64>,
    input_origin: Vector3<f64>,
    basis: BasisKind,
}

impl FrameTransform {
    #[inline]
    pub fn linear(&self) -> &Matrix3<f64> {
        &self.linear
    }

    #[inline]
    pub fn basis(&self) -> BasisKind {
        self.basis
    }

    pub fn standard_to_input(&self, target: &Vector3<f64>) -> Vector3<f64> {
        self.linear * (target - self.standard_origin) + self.input_origin
    }

    /// Fails when the input-frame basis was degenerate, which can only happen for
    /// [`BasisKind::Plane`] solutions.
    pub fn input_to_standard(&self, target: &Vector3<f64>) -> Result<Vector3<f64>, GeometryError> {
        let inverse = self.inverse.ok_or_else(|| {
            GeometryError::InvalidInput(
                "input frame is degenerate; the map cannot be inverted".to_string(),
            )
        })?;
        Ok(inverse * (target - self.input_origin) + self.standard_origin)
    }

    pub fn apply(
        &self,
        target: &Vector3<f64>,
        direction: Direction,
    ) -> Result<Vector3<f64>, GeometryError> {
        match direction {
            Direction::StandardToInput => Ok(self.standard_to_input(target)),
            Direction::InputToStandard => self.input_to_standard(target),
        }
    }
}

/// Solves the linear map carrying vectors of a standard frame into an input frame.
///
/// Both frames list the same atoms in the same order and are recentered on their last atom.
/// The basis is the first atom combination, in lexicographic order, whose determinant
/// clears the threshold: three atoms if possible, then two atoms plus their cross product,
/// then a single atom vector. This favors speed over the best-conditioned choice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameAligner {
    det_threshold: f64,
}

impl Default for FrameAligner {
    fn default() -> Self {
        Self::from_config(&GeometryConfig::default())
    }
}

impl FrameAligner {
    pub fn from_config(config: &GeometryConfig) -> Self {
        Self {
            det_threshold: config.basis_det_threshold,
        }
    }

    #[instrument(skip_all, name = "frame_alignment", fields(atoms = standard.len()))]
    pub fn solve(
        &self,
        standard: &[Point3<f64>],
        input: &[Point3<f64>],
        kind: TargetKind,
    ) -> Result<FrameTransform, GeometryError> {
        if standard.len() != input.len() {
            return Err(CloudError::LengthMismatch {
                what: "input-frame atoms",
                expected: standard.len(),
                found: input.len(),
            }
            .into());
        }
        let (Some(standard_anchor), Some(input_anchor)) = (standard.last(), input.last()) else {
            return Err(GeometryError::InvalidInput(
                "frame alignment needs at least one atom".to_string(),
            ));
        };

        let count = standard.len() - 1;
        let std_vecs: Vec<Vector3<f64>> = standard[..count]
            .iter()
            .map(|p| p - standard_anchor)
            .collect();
        let inp_vecs: Vec<Vector3<f64>> = input[..count]
            .iter()
            .map(|p| p - input_anchor)
            .collect();

        let (standard_origin, input_origin) = match kind {
            TargetKind::Position => (standard_anchor.coords, input_anchor.coords),
            TargetKind::Vector => (Vector3::zeros(), Vector3::zeros()),
        };

        let (linear, inverse, basis) = self
            .volume_basis(&std_vecs, &inp_vecs)
            .or_else(|| self.plane_basis(&std_vecs, &inp_vecs))
            .map_or_else(|| axis_basis(&std_vecs, &inp_vecs), Ok)?;
        debug!(?basis, "Solved frame transform.");

        Ok(FrameTransform {
            linear,
            inverse,
            standard_origin,
            input_origin,
            basis,
        })
    }

    /// One-shot transform of `target` between the frames.
    pub fn transform(
        &self,
        standard: &[Point3<f64>],
        input: &[Point3<f64>],
        target: &Vector3<f64>,
        direction: Direction,
        kind: TargetKind,
    ) -> Result<Vector3<f64>, GeometryError> {
        self.solve(standard, input, kind)?.apply(target, direction)
    }

    fn volume_basis(
        &self,
        std_vecs: &[Vector3<f64>],
        inp_vecs: &[Vector3<f64>],
    ) -> Option<(Matrix3<f64>, Option<Matrix3<f64>>, BasisKind)> {
        (0..std_vecs.len()).combinations(3).find_map(|atoms| {
            let columns = |vecs: &[Vector3<f64>]| {
                Matrix3::from_columns(&[vecs[atoms[0]], vecs[atoms[1]], vecs[atoms[2]]])
            };
            let std_m = columns(std_vecs);
            let inp_m = columns(inp_vecs);
            if std_m.determinant().abs() <= self.det_threshold
                || inp_m.determinant().abs() <= self.det_threshold
            {
                return None;
            }
            let std_inv = std_m.try_inverse()?;
            let inp_inv = inp_m.try_inverse()?;
            Some((
                inp_m * std_inv,
                Some(std_m * inp_inv),
                BasisKind::Volume([atoms[0], atoms[1], atoms[2]]),
            ))
        })
    }

    fn plane_basis(
        &self,
        std_vecs: &[Vector3<f64>],
        inp_vecs: &[Vector3<f64>],
    ) -> Option<(Matrix3<f64>, Option<Matrix3<f64>>, BasisKind)> {
        (0..std_vecs.len()).combinations(2).find_map(|atoms| {
            let (s0, s1) = (std_vecs[atoms[0]], std_vecs[atoms[1]]);
            let (i0, i1) = (inp_vecs[atoms[0]], inp_vecs[atoms[1]]);
            let std_m = Matrix3::from_columns(&[s0, s1, s0.cross(&s1)]);
            let inp_m = Matrix3::from_columns(&[i0, i1, i0.cross(&i1)]);
            if std_m.determinant().abs() <= self.det_threshold {
                return None;
            }
            let std_inv = std_m.try_inverse()?;
            Some((
                inp_m * std_inv,
                inp_m.try_inverse().map(|inp_inv| std_m * inp_inv),
                BasisKind::Plane([atoms[0], atoms[1]]),
            ))
        })
    }
}

/// Rotation (with length scaling) taking the first standard vector onto the first input
/// vector, about the axis normal to both.
fn axis_basis(
    std_vecs: &[Vector3<f64>],
    inp_vecs: &[Vector3<f64>],
) -> Result<(Matrix3<f64>, Option<Matrix3<f64>>, BasisKind), GeometryError> {
    let identity = Matrix3::identity();
    let (Some(std_v), Some(inp_v)) = (std_vecs.first(), inp_vecs.first()) else {
        return Ok((identity, Some(identity), BasisKind::Trivial));
    };
    let (std_len, inp_len) = (std_v.norm(), inp_v.norm());
    if std_len < NORM_EPSILON || inp_len < NORM_EPSILON {
        return Ok((identity, Some(identity), BasisKind::Trivial));
    }

    let axis = std_v.cross(inp_v);
    let rotation = if axis.norm() >= NORM_EPSILON {
        rotation_matrix(&axis, vector_angle(std_v, inp_v, AngleUnit::Degrees)?, AngleUnit::Degrees)
    } else if std_v.dot(inp_v) > 0.0 {
        identity
    } else {
        let helper = if std_v.x.abs() < 0.9 * std_len {
            Vector3::x()
        } else {
            Vector3::y()
        };
        rotation_matrix(&normalize(&std_v.cross(&helper)), 180.0, AngleUnit::Degrees)
    };

    let scale = inp_len / std_len;
    Ok((
        rotation * scale,
        Some(rotation.transpose() / scale),
        BasisKind::Axis(0),
    ))
}
