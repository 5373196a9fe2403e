use super::element::Element;
use nalgebra::{Matrix3, Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CloudError {
    #[error("Flat coordinate buffer of length {0} is not a sequence of 3-vectors")]
    InvalidShape(usize),
    #[error("Expected {expected} {what} for {expected} atoms, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
}

/// Periodic lattice of a point cloud.
///
/// The three basis vectors `a`, `b` and `c` are stored as the rows of the matrix, so the
/// image of a point under the integer offset `(i, j, k)` is `p + i*a + j*b + k*c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    vectors: Matrix3<f64>,
}

impl Lattice {
    pub fn new(vectors: [[f64; 3]; 3]) -> Self {
        Self {
            vectors: Matrix3::from_row_slice(vectors.as_flattened()),
        }
    }

    pub fn from_vectors(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> Self {
        Self {
            vectors: Matrix3::from_rows(&[a.transpose(), b.transpose(), c.transpose()]),
        }
    }

    /// An orthorhombic box with edge lengths `x`, `y` and `z`.
    pub fn orthorhombic(x: f64, y: f64, z: f64) -> Self {
        Self {
            vectors: Matrix3::from_diagonal(&Vector3::new(x, y, z)),
        }
    }

    #[inline]
    pub fn vectors(&self) -> &Matrix3<f64> {
        &self.vectors
    }

    /// Cartesian translation of the lattice image `(i, j, k)`.
    pub fn translation(&self, i: i32, j: i32, k: i32) -> Vector3<f64> {
        self.vectors.transpose() * Vector3::new(f64::from(i), f64::from(j), f64::from(k))
    }
}

/// An ordered set of atomic positions with optional periodicity and element identities.
///
/// Atom order is significant: indices are the atom identities every other operation refers
/// to. A cloud is built once at the API boundary from whatever shape the caller holds
/// (points, raw triples or a flat buffer) and is never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointCloud {
    positions: Vec<Point3<f64>>,
    lattice: Option<Lattice>,
    elements: Option<Vec<Element>>,
}

impl PointCloud {
    pub fn new(positions: Vec<Point3<f64>>) -> Self {
        Self {
            positions,
            lattice: None,
            elements: None,
        }
    }

    /// Reshapes a flat `[x0, y0, z0, x1, ...]` buffer into a point cloud.
    pub fn from_flat(coordinates: &[f64]) -> Result<Self, CloudError> {
        if coordinates.len() % 3 != 0 {
            return Err(CloudError::InvalidShape(coordinates.len()));
        }
        Ok(Self::new(
            coordinates
                .chunks_exact(3)
                .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
                .collect(),
        ))
    }

    pub fn with_lattice(mut self, lattice: Lattice) -> Self {
        self.lattice = Some(lattice);
        self
    }

    pub fn with_elements(mut self, elements: Vec<Element>) -> Result<Self, CloudError> {
        if elements.len() != self.positions.len() {
            return Err(CloudError::LengthMismatch {
                what: "elements",
                expected: self.positions.len(),
                found: elements.len(),
            });
        }
        self.elements = Some(elements);
        Ok(self)
    }

    pub fn with_symbols<S: AsRef<str>>(self, symbols: &[S]) -> Result<Self, CloudError> {
        let elements = symbols
            .iter()
            .map(|s| {
                Element::from_symbol(s.as_ref())
                    .ok_or_else(|| CloudError::UnknownElement(s.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.with_elements(elements)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    #[inline]
    pub fn lattice(&self) -> Option<&Lattice> {
        self.lattice.as_ref()
    }

    #[inline]
    pub fn elements(&self) -> Option<&[Element]> {
        self.elements.as_deref()
    }

    #[inline]
    pub fn is_periodic(&self) -> bool {
        self.lattice.is_some()
    }

    /// Returns a copy with every position moved by the matching displacement vector.
    pub fn displaced(&self, displacement: &[Vector3<f64>]) -> Result<Self, CloudError> {
        if displacement.len() != self.positions.len() {
            return Err(CloudError::LengthMismatch {
                what: "displacement vectors",
                expected: self.positions.len(),
                found: displacement.len(),
            });
        }
        Ok(Self {
            positions: self
                .positions
                .iter()
                .zip(displacement)
                .map(|(p, d)| p + d)
                .collect(),
            lattice: self.lattice,
            elements: self.elements.clone(),
        })
    }

    /// Size of the axis-aligned bounding box along x, y and z, or `None` for an empty cloud.
    pub fn extents(&self) -> Option<Vector3<f64>> {
        let first = self.positions.first()?.coords;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(min, max), p| {
                (min.inf(&p.coords), max.sup(&p.coords))
            });
        Some(max - min)
    }
}

impl From<Vec<Point3<f64>>> for PointCloud {
    fn from(positions: Vec<Point3<f64>>) -> Self {
        Self::new(positions)
    }
}

impl From<&[Point3<f64>]> for PointCloud {
    fn from(positions: &[Point3<f64>]) -> Self {
        Self::new(positions.to_vec())
    }
}

impl From<Vec<[f64; 3]>> for PointCloud {
    fn from(positions: Vec<[f64; 3]>) -> Self {
        Self::new(positions.into_iter().map(Point3::from).collect())
    }
}

impl From<&[[f64; 3]]> for PointCloud {
    fn from(positions: &[[f64; 3]]) -> Self {
        Self::new(positions.iter().copied().map(Point3::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_flat_reshapes_coordinate_buffer() {
        let cloud = PointCloud::from_flat(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.positions()[1], Point3::new(3.0, 4.0, 5.0));
        assert!(!cloud.is_periodic());
    }

    #[test]
    fn from_flat_rejects_incomplete_triples() {
        assert_eq!(
            PointCloud::from_flat(&[0.0, 1.0, 2.0, 3.0]),
            Err(CloudError::InvalidShape(4))
        );
    }

    #[test]
    fn array_and_point_adapters_agree() {
        let from_arrays = PointCloud::from(vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let from_points = PointCloud::from(vec![
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(4.0, 5.0, 6.0),
        ]);
        assert_eq!(from_arrays, from_points);
    }

    #[test]
    fn with_elements_requires_one_element_per_atom() {
        let cloud = PointCloud::from(vec![[0.0; 3], [1.0, 0.0, 0.0]]);
        let result = cloud.with_symbols(&["O"]);
        assert_eq!(
            result,
            Err(CloudError::LengthMismatch {
                what: "elements",
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn with_symbols_resolves_and_rejects_symbols() {
        let cloud = PointCloud::from(vec![[0.0; 3], [1.0, 0.0, 0.0]]);
        let named = cloud.clone().with_symbols(&["O", "h"]).unwrap();
        let numbers: Vec<u8> = named
            .elements()
            .unwrap()
            .iter()
            .map(|e| e.atomic_number())
            .collect();
        assert_eq!(numbers, vec![8, 1]);

        assert_eq!(
            cloud.with_symbols(&["O", "Q"]),
            Err(CloudError::UnknownElement("Q".to_string()))
        );
    }

    #[test]
    fn lattice_translation_combines_basis_vectors() {
        let lattice = Lattice::new([[2.0, 0.0, 0.0], [1.0, 3.0, 0.0], [0.0, 0.0, 4.0]]);
        assert_eq!(lattice.translation(1, 0, 0), Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(lattice.translation(0, 1, 0), Vector3::new(1.0, 3.0, 0.0));
        assert_eq!(lattice.translation(1, -1, 1), Vector3::new(1.0, -3.0, 4.0));
    }

    #[test]
    fn lattice_constructors_agree() {
        let from_rows = Lattice::new([[5.0, 0.0, 0.0], [0.0, 6.0, 0.0], [0.0, 0.0, 7.0]]);
        let from_vectors = Lattice::from_vectors(
            Vector3::new(5.0, 0.0, 0.0),
            Vector3::new(0.0, 6.0, 0.0),
            Vector3::new(0.0, 0.0, 7.0),
        );
        assert_eq!(from_rows, from_vectors);
        assert_eq!(from_rows, Lattice::orthorhombic(5.0, 6.0, 7.0));
    }

    #[test]
    fn displaced_moves_positions_and_keeps_metadata() {
        let cloud = PointCloud::from(vec![[0.0; 3], [1.0, 0.0, 0.0]])
            .with_lattice(Lattice::orthorhombic(10.0, 10.0, 10.0));
        let moved = cloud
            .displaced(&[Vector3::new(0.5, 0.0, 0.0), Vector3::zeros()])
            .unwrap();
        assert_eq!(moved.positions()[0], Point3::new(0.5, 0.0, 0.0));
        assert_eq!(moved.lattice(), cloud.lattice());
        assert_eq!(cloud.positions()[0], Point3::origin());
        assert!(cloud.displaced(&[Vector3::zeros()]).is_err());
    }

    #[test]
    fn extents_measure_bounding_box() {
        let cloud = PointCloud::from(vec![[0.0, -1.0, 2.0], [3.0, 1.0, 2.5], [1.0, 0.0, 0.0]]);
        assert_eq!(cloud.extents(), Some(Vector3::new(3.0, 2.0, 2.5)));
        assert_eq!(PointCloud::default().extents(), None);
    }
}
