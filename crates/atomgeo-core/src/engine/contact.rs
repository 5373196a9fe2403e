use super::config::ContactParams;
use super::distance::distance_matrix;
use super::error::GeometryError;
use crate::core::models::cloud::PointCloud;
use crate::core::models::element::{CovalentRadii, Element};
use nalgebra::DMatrix;
use std::collections::HashMap;
use tracing::{debug, instrument};

// Half-width of the band around r = 1 evaluated by the series expansion.
const SINGULARITY_WIDTH: f64 = 1e-6;

// Relative tolerance when checking an explicit bonding matrix for symmetry.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Smooth contact kernel `(1 - r^n) / (1 - r^m)` for a reduced distance `r`.
///
/// Equals 1 at `r = 0` and decays towards 0 for large `r`. At `r = 1` the quotient is 0/0;
/// around it the first-order expansion `n/m * (1 + (n - m)/2 * (r - 1))` is used, so the
/// kernel takes its limit `n/m` there.
#[inline]
pub fn switching_function(r: f64, n: i32, m: i32) -> f64 {
    let offset = r - 1.0;
    if offset.abs() < SINGULARITY_WIDTH {
        let (n, m) = (f64::from(n), f64::from(m));
        return n / m * (1.0 + 0.5 * (n - m) * offset);
    }
    (1.0 - r.powi(n)) / (1.0 - r.powi(m))
}

/// Bonding-distance reference `r_i + r_j` from per-atom covalent radii.
///
/// Each distinct element is looked up once; a missing or non-positive radius fails the call.
pub fn bonding_distance_matrix<R>(
    elements: &[Element],
    radii: &R,
) -> Result<DMatrix<f64>, GeometryError>
where
    R: CovalentRadii + ?Sized,
{
    let mut resolved: HashMap<Element, f64> = HashMap::new();
    let mut per_atom = Vec::with_capacity(elements.len());
    for &element in elements {
        let radius = match resolved.get(&element) {
            Some(&radius) => radius,
            None => {
                let radius = radii
                    .covalent_radius(element)
                    .filter(|r| r.is_finite() && *r > 0.0)
                    .ok_or_else(|| GeometryError::MissingRadius {
                        element: element.to_string(),
                    })?;
                resolved.insert(element, radius);
                radius
            }
        };
        per_atom.push(radius);
    }
    debug!(distinct_elements = resolved.len(), "Resolved covalent radii.");

    let n = per_atom.len();
    Ok(DMatrix::from_fn(n, n, |i, j| per_atom[i] + per_atom[j]))
}

/// Contact matrix of a cloud whose element identities resolve through `radii`.
#[instrument(skip_all, fields(atoms = cloud.len()))]
pub fn contact_matrix<R>(
    cloud: &PointCloud,
    radii: &R,
    params: &ContactParams,
) -> Result<DMatrix<f64>, GeometryError>
where
    R: CovalentRadii + ?Sized,
{
    let elements = cloud.elements().ok_or(GeometryError::MissingElements)?;
    let bonding = bonding_distance_matrix(elements, radii)?;
    contact_matrix_with_bonding(cloud, &bonding, params)
}

/// Contact matrix against an explicit bonding-distance reference.
///
/// Entry `(i, j)` is [`switching_function`] of `d_ij / bonding_ij`; the diagonal is 1.
/// Distances honor the cloud's lattice when it has one. The bonding matrix must be
/// symmetric, positive and finite, and the exponents must pass [`ContactParams::validate`].
pub fn contact_matrix_with_bonding(
    cloud: &PointCloud,
    bonding: &DMatrix<f64>,
    params: &ContactParams,
) -> Result<DMatrix<f64>, GeometryError> {
    params.validate()?;
    let n = cloud.len();
    if bonding.shape() != (n, n) {
        return Err(GeometryError::InvalidInput(format!(
            "bonding-distance matrix is {}x{}, expected {n}x{n}",
            bonding.nrows(),
            bonding.ncols()
        )));
    }
    if bonding.iter().any(|b| !(b.is_finite() && *b > 0.0)) {
        return Err(GeometryError::InvalidInput(
            "bonding distances must be positive and finite".to_string(),
        ));
    }
    if !is_symmetric(bonding) {
        return Err(GeometryError::InvalidInput(
            "bonding-distance matrix must be symmetric".to_string(),
        ));
    }

    let distances = distance_matrix(cloud);
    Ok(distances.zip_map(bonding, |d, b| {
        switching_function(d / b, params.n, params.m)
    }))
}

fn is_symmetric(matrix: &DMatrix<f64>) -> bool {
    let n = matrix.nrows();
    (0..n).all(|i| {
        (i + 1..n).all(|j| {
            let (a, b) = (matrix[(i, j)], matrix[(j, i)]);
            (a - b).abs() <= SYMMETRY_TOLERANCE * a.abs().max(b.abs())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::CovalentRadiusTable;
    use crate::engine::config::ConfigError;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn methane_like() -> PointCloud {
        PointCloud::from(vec![
            [0.0, 0.0, 0.0],
            [1.07, 0.0, 0.0],
            [0.0, 1.07, 0.0],
            [0.0, 0.0, 4.0],
        ])
        .with_symbols(&["C", "H", "H", "H"])
        .unwrap()
    }

    #[test]
    fn switching_function_is_one_at_zero_distance() {
        assert_eq!(switching_function(0.0, 6, 12), 1.0);
    }

    #[test]
    fn switching_function_takes_its_limit_at_the_singularity() {
        let at_one = switching_function(1.0, 6, 12);
        assert!(!at_one.is_nan());
        assert!(f64_approx_equal(at_one, 0.5));
        assert!(f64_approx_equal(switching_function(1.0, 8, 10), 0.8));
    }

    #[test]
    fn switching_function_is_continuous_across_the_singular_band() {
        let below = switching_function(1.0 - 2e-6, 6, 12);
        let inside = switching_function(1.0 - 0.5e-6, 6, 12);
        let above = switching_function(1.0 + 2e-6, 6, 12);
        assert!((below - inside).abs() < 1e-5);
        assert!((above - inside).abs() < 1e-5);
        assert!(below > inside && inside > above);
    }

    #[test]
    fn switching_function_decays_with_distance() {
        let values: Vec<f64> = [0.5, 0.9, 1.2, 2.0, 4.0]
            .iter()
            .map(|&r| switching_function(r, 6, 12))
            .collect();
        assert!(values.windows(2).all(|w| w[0] > w[1]));
        assert!(values[4] < 1e-3);
    }

    #[test]
    fn bonding_distance_matrix_sums_radii() {
        let cloud = methane_like();
        let bonding =
            bonding_distance_matrix(cloud.elements().unwrap(), &CovalentRadiusTable).unwrap();
        assert!(f64_approx_equal(bonding[(0, 1)], 0.76 + 0.31));
        assert!(f64_approx_equal(bonding[(1, 2)], 0.62));
        assert!(f64_approx_equal(bonding[(0, 0)], 1.52));
    }

    #[test]
    fn contact_at_bonding_distance_is_half_for_default_exponents() {
        let contacts =
            contact_matrix(&methane_like(), &CovalentRadiusTable, &ContactParams::default())
                .unwrap();
        assert!(contacts.iter().all(|c| !c.is_nan()));
        assert!(f64_approx_equal(contacts[(0, 1)], 0.5));
        assert!(f64_approx_equal(contacts[(2, 0)], 0.5));
        assert_eq!(contacts[(3, 3)], 1.0);
        assert!(contacts[(0, 3)] < 0.01);
    }

    #[test]
    fn contact_matrix_without_elements_is_an_input_error() {
        let cloud = PointCloud::from(vec![[0.0; 3], [1.0, 0.0, 0.0]]);
        let result = contact_matrix(&cloud, &CovalentRadiusTable, &ContactParams::default());
        assert_eq!(result, Err(GeometryError::MissingElements));
    }

    #[test]
    fn contact_matrix_fails_when_a_radius_is_missing() {
        let carbon = Element::from_symbol("C").unwrap();
        let radii: HashMap<Element, f64> = HashMap::from([(carbon, 0.76)]);
        let result = contact_matrix(&methane_like(), &radii, &ContactParams::default());
        assert_eq!(
            result,
            Err(GeometryError::MissingRadius {
                element: "H".to_string()
            })
        );
    }

    #[test]
    fn explicit_bonding_matrix_bypasses_element_lookup() {
        let cloud = PointCloud::from(vec![[0.0; 3], [2.0, 0.0, 0.0]]);
        let bonding = DMatrix::from_element(2, 2, 2.0);
        let contacts =
            contact_matrix_with_bonding(&cloud, &bonding, &ContactParams { n: 6, m: 12 }).unwrap();
        assert!(f64_approx_equal(contacts[(0, 1)], 0.5));
    }

    #[test]
    fn invalid_exponents_are_rejected_before_evaluation() {
        let cloud = PointCloud::from(vec![[0.0; 3], [2.0, 0.0, 0.0]]);
        let bonding = DMatrix::from_element(2, 2, 2.0);
        let result = contact_matrix_with_bonding(&cloud, &bonding, &ContactParams { n: -6, m: 12 });
        assert_eq!(
            result,
            Err(GeometryError::Config(ConfigError::InvalidExponents { n: -6, m: 12 }))
        );

        let result = contact_matrix(
            &methane_like(),
            &CovalentRadiusTable,
            &ContactParams { n: 12, m: 12 },
        );
        assert!(matches!(
            result,
            Err(GeometryError::Config(ConfigError::InvalidExponents { .. }))
        ));
    }

    #[test]
    fn asymmetric_bonding_matrix_is_rejected() {
        let cloud = PointCloud::from(vec![[0.0; 3], [2.0, 0.0, 0.0]]);
        let bonding = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 4.0, 1.0]);
        let result = contact_matrix_with_bonding(&cloud, &bonding, &ContactParams::default());
        assert!(matches!(result, Err(GeometryError::InvalidInput(_))));
    }

    #[test]
    fn contact_matrix_is_symmetric_with_unit_diagonal() {
        let contacts =
            contact_matrix(&methane_like(), &CovalentRadiusTable, &ContactParams::default())
                .unwrap();
        for i in 0..contacts.nrows() {
            assert_eq!(contacts[(i, i)], 1.0);
            for j in 0..contacts.ncols() {
                assert!(f64_approx_equal(contacts[(i, j)], contacts[(j, i)]));
            }
        }
    }

    #[test]
    fn explicit_bonding_matrix_must_match_the_cloud() {
        let cloud = PointCloud::from(vec![[0.0; 3], [2.0, 0.0, 0.0]]);
        let params = ContactParams::default();
        assert!(matches!(
            contact_matrix_with_bonding(&cloud, &DMatrix::from_element(3, 3, 1.0), &params),
            Err(GeometryError::InvalidInput(_))
        ));
        assert!(matches!(
            contact_matrix_with_bonding(&cloud, &DMatrix::zeros(2, 2), &params),
            Err(GeometryError::InvalidInput(_))
        ));
    }
}
