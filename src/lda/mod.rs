//! Two-class linear discriminant analysis
//!

mod evaluate;
mod scatter;

pub use evaluate::ConfusionMatrix;
pub use scatter::{CLASS_COUNT, ScatterMode, get_class_sizes};

use log::{debug, warn};
use nalgebra::{DMatrix, DVector, SymmetricEigen};

use self::scatter::{get_between_class_scatter, get_class_means, get_within_class_scatter};
use crate::errors::{ClonalityError, ClonalityResult};

/// Default number of discriminant axes retained in the projection
pub const DEFAULT_AXIS_COUNT: usize = 2;

/// Within-class scatter eigenvalues at or below this fraction of the largest are treated as zero
const SINGULAR_RELATIVE_TOLERANCE: f64 = 1e-10;

/// Solve the generalized symmetric eigenproblem Sb v = lambda Sw v
///
/// Sw is whitened through its own eigendecomposition Sw = Q L Q^T. With B = Q L^-1/2, the
/// eigenpairs (lambda, u) of the symmetric matrix B^T Sb B give the generalized eigenpairs
/// (lambda, B u), which are the eigenpairs of Sw^-1 Sb.
///
/// Returns None if Sw is singular. Eigenvectors are returned with unit norm.
///
fn solve_generalized_eigen(
    within_scatter: DMatrix<f64>,
    between_scatter: &DMatrix<f64>,
) -> Option<Vec<(f64, DVector<f64>)>> {
    let sw_eigen = SymmetricEigen::new(within_scatter);
    let max_eigenvalue = sw_eigen.eigenvalues.max();
    let min_eigenvalue = sw_eigen.eigenvalues.min();
    if !max_eigenvalue.is_finite()
        || max_eigenvalue <= 0.0
        || min_eigenvalue <= max_eigenvalue * SINGULAR_RELATIVE_TOLERANCE
    {
        debug!(
            "Within-class scatter eigenvalue range: {min_eigenvalue:e} to {max_eigenvalue:e}"
        );
        return None;
    }

    let mut whitening = sw_eigen.eigenvectors;
    for (mut column, &eigenvalue) in whitening
        .column_iter_mut()
        .zip(sw_eigen.eigenvalues.iter())
    {
        column.unscale_mut(eigenvalue.sqrt());
    }

    let whitened = whitening.transpose() * between_scatter * &whitening;
    let whitened = (&whitened + whitened.transpose()) * 0.5;
    let whitened_eigen = SymmetricEigen::new(whitened);

    let eigenpairs = whitened_eigen
        .eigenvalues
        .iter()
        .zip(whitened_eigen.eigenvectors.column_iter())
        .map(|(&eigenvalue, u)| {
            let v = &whitening * u;
            (eigenvalue, v.normalize())
        })
        .collect();
    Some(eigenpairs)
}

/// Trained two-class discriminant model
///
#[derive(Clone, Debug)]
pub struct DiscriminantModel {
    /// One row per class
    pub class_means: DMatrix<f64>,

    /// One unit-norm discriminant axis per row
    pub projection: DMatrix<f64>,

    /// Fraction of training rows in each class
    pub priors: [f64; CLASS_COUNT],

    /// Eigenvalues of all discriminant axes, sorted by decreasing magnitude
    pub eigenvalues: Vec<f64>,

    /// Class means projected onto the discriminant axes
    projected_means: Vec<DVector<f64>>,
}

impl DiscriminantModel {
    /// Train the model from a feature matrix and 0/1 labels
    ///
    /// # Arguments
    /// * `features` - One row per observation
    /// * `feature_names` - Used to describe the failure if the within-class scatter is singular
    /// * `axis_count` - Number of discriminant axes to retain, clamped to the feature count
    ///
    pub fn fit(
        features: &DMatrix<f64>,
        labels: &[usize],
        feature_names: &[String],
        axis_count: usize,
        scatter_mode: ScatterMode,
    ) -> ClonalityResult<Self> {
        let class_sizes = get_class_sizes(labels);
        let class_means = get_class_means(features, labels)?;
        let within_scatter = get_within_class_scatter(features, labels, &class_means, scatter_mode);
        let between_scatter = get_between_class_scatter(features, labels, &class_means);

        let mut eigenpairs = solve_generalized_eigen(within_scatter, &between_scatter).ok_or_else(
            || ClonalityError::SingularMatrix {
                class_sizes,
                feature_names: feature_names.to_vec(),
            },
        )?;

        // Stable sort, so equal magnitudes keep solver order
        eigenpairs.sort_by(|a, b| b.0.abs().total_cmp(&a.0.abs()));

        let feature_count = features.ncols();
        let axis_count = if axis_count > feature_count {
            warn!(
                "Requested discriminant axis count {axis_count} exceeds the feature count, using {feature_count} axes"
            );
            feature_count
        } else {
            axis_count
        };

        let projection = DMatrix::from_fn(axis_count, feature_count, |r, c| eigenpairs[r].1[c]);
        let eigenvalues = eigenpairs.iter().map(|x| x.0).collect::<Vec<_>>();

        let training_count = labels.len() as f64;
        let priors = class_sizes.map(|x| x as f64 / training_count);

        let projected_means = class_means
            .row_iter()
            .map(|x| &projection * x.transpose())
            .collect();

        debug!("Discriminant eigenvalues: {eigenvalues:?}");

        Ok(Self {
            class_means,
            projection,
            priors,
            eigenvalues,
            projected_means,
        })
    }

    /// Project observations onto the discriminant axes
    ///
    /// Returns a matrix with one row per observation and one column per axis
    ///
    pub fn project(&self, features: &DMatrix<f64>) -> DMatrix<f64> {
        features * self.projection.transpose()
    }

    /// Linear discriminant score of each class for one projected observation
    ///
    fn get_class_scores(&self, projected: &DVector<f64>) -> [f64; CLASS_COUNT] {
        std::array::from_fn(|class_index| {
            let m = &self.projected_means[class_index];
            m.dot(projected) - 0.5 * m.dot(m) + self.priors[class_index].log2()
        })
    }

    /// Predict the class of each observation
    ///
    /// The higher scoring class is predicted, ties go to class 0.
    ///
    pub fn classify(&self, features: &DMatrix<f64>) -> Vec<usize> {
        let projected = self.project(features);
        projected
            .row_iter()
            .map(|x| {
                let scores = self.get_class_scores(&x.transpose());
                if scores[1] > scores[0] { 1 } else { 0 }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::distributions::Distribution;
    use rand_chacha::ChaCha8Rng;
    use statrs::distribution::Normal;

    use super::*;

    fn get_feature_names(count: usize) -> Vec<String> {
        (0..count).map(|x| format!("F{x}")).collect()
    }

    /// Sample `count` 2D points from an isotropic normal centered on `center`
    ///
    fn sample_cluster(rng: &mut ChaCha8Rng, center: [f64; 2], count: usize) -> Vec<f64> {
        let noise = Normal::new(0.0, 1.0).unwrap();
        (0..count)
            .flat_map(|_| center.map(|x| x + noise.sample(rng)))
            .collect()
    }

    #[test]
    fn test_separated_clusters() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let cluster0 = sample_cluster(&mut rng, [0.0, 0.0], 20);
        let cluster1 = sample_cluster(&mut rng, [10.0, 10.0], 20);

        // Train on the first 15 points of each cluster, hold out the last 5
        let split = 15 * 2;
        let train_values = [&cluster0[..split], &cluster1[..split]].concat();
        let test_values = [&cluster0[split..], &cluster1[split..]].concat();
        let train = DMatrix::from_row_slice(30, 2, &train_values);
        let train_labels = [vec![0; 15], vec![1; 15]].concat();
        let test = DMatrix::from_row_slice(10, 2, &test_values);
        let test_labels = [vec![0; 5], vec![1; 5]].concat();

        let model = DiscriminantModel::fit(
            &train,
            &train_labels,
            &get_feature_names(2),
            DEFAULT_AXIS_COUNT,
            ScatterMode::PerObservation,
        )
        .unwrap();

        assert_eq!(model.projection.shape(), (2, 2));
        assert_eq!(model.priors, [0.5, 0.5]);
        for row in model.projection.row_iter() {
            approx::assert_abs_diff_eq!(row.norm(), 1.0, epsilon = 1e-12);
        }

        // Two classes give a single non-zero discriminant direction
        assert!(model.eigenvalues[0].abs() > 1.0);
        assert!(model.eigenvalues[1].abs() < 1e-8 * model.eigenvalues[0].abs());

        let predicted = model.classify(&test);
        let confusion = ConfusionMatrix::from_labels(&test_labels, &predicted);
        assert!(confusion.accuracy().unwrap() >= 0.95);
    }

    #[test]
    fn test_discriminant_eigenpair() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let values = [
            sample_cluster(&mut rng, [0.0, 0.0], 10),
            sample_cluster(&mut rng, [2.0, -1.0], 10),
        ]
        .concat();
        let features = DMatrix::from_row_slice(20, 2, &values);
        let labels = [vec![0; 10], vec![1; 10]].concat();
        let means = get_class_means(&features, &labels).unwrap();
        let sw = get_within_class_scatter(&features, &labels, &means, ScatterMode::PerObservation);
        let sb = get_between_class_scatter(&features, &labels, &means);

        let eigenpairs = solve_generalized_eigen(sw.clone(), &sb).unwrap();
        let sw_inverse = sw.try_inverse().unwrap();
        for (eigenvalue, v) in eigenpairs {
            let lhs = &sw_inverse * &sb * &v;
            approx::assert_abs_diff_eq!(lhs, v * eigenvalue, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_axis_count_is_clamped() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let values = [
            sample_cluster(&mut rng, [0.0, 0.0], 10),
            sample_cluster(&mut rng, [4.0, 4.0], 10),
        ]
        .concat();
        let features = DMatrix::from_row_slice(20, 2, &values);
        let labels = [vec![0; 10], vec![1; 10]].concat();

        let model = DiscriminantModel::fit(
            &features,
            &labels,
            &get_feature_names(2),
            5,
            ScatterMode::PerObservation,
        )
        .unwrap();
        assert_eq!(model.projection.nrows(), 2);
        assert_eq!(model.project(&features).shape(), (20, 2));

        let model = DiscriminantModel::fit(
            &features,
            &labels,
            &get_feature_names(2),
            1,
            ScatterMode::PerObservation,
        )
        .unwrap();
        assert_eq!(model.project(&features).shape(), (20, 1));
    }

    #[test]
    fn test_legacy_scatter_is_singular() {
        let features =
            DMatrix::from_row_slice(4, 2, &[1.0, 2.0, 3.0, 4.0, 6.0, 5.0, 8.0, 9.0]);
        let labels = [0, 0, 1, 1];
        let result = DiscriminantModel::fit(
            &features,
            &labels,
            &get_feature_names(2),
            DEFAULT_AXIS_COUNT,
            ScatterMode::SummedDeviation,
        );
        assert_eq!(
            result.unwrap_err(),
            ClonalityError::SingularMatrix {
                class_sizes: [2, 2],
                feature_names: vec!["F0".to_string(), "F1".to_string()],
            }
        );
    }

    #[test]
    fn test_collinear_features_are_singular() {
        let features = DMatrix::from_row_slice(
            6,
            2,
            &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0, 7.0, 14.0, 8.0, 16.0, 10.0, 20.0],
        );
        let labels = [0, 0, 0, 1, 1, 1];
        let result = DiscriminantModel::fit(
            &features,
            &labels,
            &get_feature_names(2),
            DEFAULT_AXIS_COUNT,
            ScatterMode::PerObservation,
        );
        assert!(matches!(result, Err(ClonalityError::SingularMatrix { .. })));
    }

    #[test]
    fn test_missing_class() {
        let features = DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]);
        let result = DiscriminantModel::fit(
            &features,
            &[0, 0, 0],
            &get_feature_names(1),
            DEFAULT_AXIS_COUNT,
            ScatterMode::PerObservation,
        );
        assert!(matches!(result, Err(ClonalityError::MissingClass { .. })));
    }

    #[test]
    fn test_classification_ties_go_to_class_zero() {
        let model = DiscriminantModel {
            class_means: DMatrix::from_row_slice(2, 1, &[-1.0, 1.0]),
            projection: DMatrix::from_row_slice(1, 1, &[1.0]),
            priors: [0.5, 0.5],
            eigenvalues: vec![1.0],
            projected_means: vec![DVector::from_element(1, -1.0), DVector::from_element(1, 1.0)],
        };
        let features = DMatrix::from_row_slice(3, 1, &[-0.5, 0.0, 0.5]);
        assert_eq!(model.classify(&features), vec![0, 0, 1]);
    }
}
