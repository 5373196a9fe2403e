use super::error::GeometryError;
use crate::core::models::cloud::PointCloud;
use itertools::iproduct;
use nalgebra::{DMatrix, Point3, Vector3};
use tracing::{debug, instrument};

fn coordinate_matrix(points: &[Point3<f64>]) -> DMatrix<f64> {
    DMatrix::from_fn(points.len(), 3, |row, col| points[row][col])
}

/// Squared Euclidean distances between every point of `x` (rows) and of `y` (columns).
///
/// Uses the expansion `|x|^2 + |y|^2 - 2 x.y`, so entries that should be zero can come out
/// as tiny negative numbers. Callers taking square roots should use the absolute value.
pub fn pairwise_squared_distances(x: &[Point3<f64>], y: &[Point3<f64>]) -> DMatrix<f64> {
    let x_sq: Vec<f64> = x.iter().map(|p| p.coords.norm_squared()).collect();
    let y_sq: Vec<f64> = y.iter().map(|p| p.coords.norm_squared()).collect();
    let cross = coordinate_matrix(x) * coordinate_matrix(y).transpose();
    DMatrix::from_fn(x.len(), y.len(), |i, j| x_sq[i] + y_sq[j] - 2.0 * cross[(i, j)])
}

/// Symmetric distance matrix of a point cloud, with an exactly zero diagonal.
///
/// For periodic clouds each pair takes the shortest distance found among the 27 images
/// generated by the lattice offsets in {-1, 0, 1}^3. This is the minimum image for
/// reasonably shaped cells but is not guaranteed for strongly skewed ones.
#[instrument(skip_all, fields(atoms = cloud.len(), periodic = cloud.is_periodic()))]
pub fn distance_matrix(cloud: &PointCloud) -> DMatrix<f64> {
    let positions = cloud.positions();
    let mut squared = pairwise_squared_distances(positions, positions);

    if let Some(lattice) = cloud.lattice() {
        for (i, j, k) in iproduct!(-1..=1, -1..=1, -1..=1) {
            let shift = lattice.translation(i, j, k);
            let image: Vec<Point3<f64>> = positions.iter().map(|p| p + shift).collect();
            let image_squared = pairwise_squared_distances(&image, positions);
            squared.zip_apply(&image_squared, |current, candidate| {
                *current = current.min(candidate)
            });
        }
        debug!("Applied 27-image minimum over lattice offsets.");
    }

    let mut distances = squared.map(|d| d.abs().sqrt());
    distances.fill_diagonal(0.0);
    distances
}

/// Change of every pairwise distance when the cloud is moved by `displacement`.
pub fn distance_change_matrix(
    cloud: &PointCloud,
    displacement: &[Vector3<f64>],
) -> Result<DMatrix<f64>, GeometryError> {
    let displaced = cloud.displaced(displacement)?;
    Ok(distance_matrix(&displaced) - distance_matrix(cloud))
}

/// [`distance_change_matrix`] for a batch of displacement modes, such as normal modes.
#[instrument(skip_all, fields(modes = modes.len()))]
pub fn mode_distance_changes(
    cloud: &PointCloud,
    modes: &[Vec<Vector3<f64>>],
) -> Result<Vec<DMatrix<f64>>, GeometryError> {
    let reference = distance_matrix(cloud);
    modes
        .iter()
        .map(|mode| {
            let displaced = cloud.displaced(mode)?;
            Ok(distance_matrix(&displaced) - &reference)
        })
        .collect()
}
