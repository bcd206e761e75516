use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::errors::{ClonalityError, ClonalityResult};

pub const CLASS_COUNT: usize = 2;

/// Selects the within-class scatter formula
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub enum ScatterMode {
    /// Sum of outer products of each observation's deviation from its class mean
    #[default]
    PerObservation,

    /// Outer product of each class's summed deviation vector, reproducing earlier discriminant
    /// results
    ///
    /// The summed deviation from an exact class mean is zero, so this matrix is usually singular
    /// unless rounding in the mean leaves a residual.
    SummedDeviation,
}

/// Count of observations in each class
///
pub fn get_class_sizes(labels: &[usize]) -> [usize; CLASS_COUNT] {
    let mut sizes = [0; CLASS_COUNT];
    for &label in labels {
        sizes[label] += 1;
    }
    sizes
}

fn get_row(features: &DMatrix<f64>, index: usize) -> DVector<f64> {
    features.row(index).transpose()
}

/// Per-class mean vectors, one row per class
///
pub fn get_class_means(features: &DMatrix<f64>, labels: &[usize]) -> ClonalityResult<DMatrix<f64>> {
    assert_eq!(features.nrows(), labels.len());

    let class_sizes = get_class_sizes(labels);
    if class_sizes.contains(&0) {
        return Err(ClonalityError::MissingClass { class_sizes });
    }

    let mut means = DMatrix::zeros(CLASS_COUNT, features.ncols());
    for (row, &label) in features.row_iter().zip(labels) {
        let mut class_row = means.row_mut(label);
        class_row += row;
    }
    for (class_index, &class_size) in class_sizes.iter().enumerate() {
        means.row_mut(class_index).unscale_mut(class_size as f64);
    }
    Ok(means)
}

/// Within-class scatter matrix
///
/// # Arguments
/// * `class_means` - Class mean vectors as returned by [get_class_means]
///
pub fn get_within_class_scatter(
    features: &DMatrix<f64>,
    labels: &[usize],
    class_means: &DMatrix<f64>,
    mode: ScatterMode,
) -> DMatrix<f64> {
    let feature_count = features.ncols();
    let deviation = |index: usize| get_row(features, index) - get_row(class_means, labels[index]);

    let mut scatter = DMatrix::zeros(feature_count, feature_count);
    match mode {
        ScatterMode::PerObservation => {
            for index in 0..labels.len() {
                let d = deviation(index);
                scatter += &d * d.transpose();
            }
        }
        ScatterMode::SummedDeviation => {
            let mut summed_deviations = vec![DVector::zeros(feature_count); CLASS_COUNT];
            for (index, &label) in labels.iter().enumerate() {
                summed_deviations[label] += deviation(index);
            }
            for s in summed_deviations.iter() {
                scatter += s * s.transpose();
            }
        }
    }
    scatter
}

/// Between-class scatter matrix, sum over classes of N_c (m_c - m)(m_c - m)^T
///
pub fn get_between_class_scatter(
    features: &DMatrix<f64>,
    labels: &[usize],
    class_means: &DMatrix<f64>,
) -> DMatrix<f64> {
    let feature_count = features.ncols();
    let overall_mean = features.row_mean().transpose();
    let class_sizes = get_class_sizes(labels);

    let mut scatter = DMatrix::zeros(feature_count, feature_count);
    for (class_index, &class_size) in class_sizes.iter().enumerate() {
        let d = get_row(class_means, class_index) - &overall_mean;
        scatter += (&d * d.transpose()) * class_size as f64;
    }
    scatter
}
