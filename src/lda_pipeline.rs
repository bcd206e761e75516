//! Run the lda command, training and evaluating a discriminant model on a tumor feature table
//!

use std::error;

use log::info;
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use simple_error::{SimpleResult, bail};

use crate::cli::{LdaSettings, write_lda_settings};
use crate::feature_table::read_feature_matrix;
use crate::lda::{ConfusionMatrix, DiscriminantModel, get_class_sizes};
use crate::run_stats::{LdaResults, TestPrediction, write_lda_results};

/// Fraction of rows used for training when no train count is given
const DEFAULT_TRAIN_FRACTION: f64 = 0.8;

/// Row indexes of the train and test partitions
///
struct TrainTestSplit {
    train: Vec<usize>,
    test: Vec<usize>,
}

/// Shuffle row indexes with a seeded generator and split them into train and test partitions
///
/// # Arguments
/// * `train_count` - Number of training rows, defaults to 80% of rows rounded down
///
fn get_train_test_split(
    row_count: usize,
    train_count: Option<usize>,
    seed: u64,
) -> SimpleResult<TrainTestSplit> {
    let train_count = train_count
        .unwrap_or_else(|| (row_count as f64 * DEFAULT_TRAIN_FRACTION).floor() as usize);
    if train_count > row_count {
        bail!("Train count {train_count} exceeds the {row_count} usable feature table rows");
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut indexes = (0..row_count).collect::<Vec<_>>();
    indexes.shuffle(&mut rng);
    let test = indexes.split_off(train_count);
    Ok(TrainTestSplit {
        train: indexes,
        test,
    })
}

fn get_matrix_rows(matrix: &DMatrix<f64>) -> Vec<Vec<f64>> {
    matrix
        .row_iter()
        .map(|x| x.iter().copied().collect())
        .collect()
}

fn select_labels(labels: &[usize], indexes: &[usize]) -> Vec<usize> {
    indexes.iter().map(|&x| labels[x]).collect()
}

struct Evaluation {
    model: DiscriminantModel,

    /// Predicted class of each test partition row
    predicted: Vec<usize>,

    confusion: ConfusionMatrix,
}

/// Train on one partition and evaluate on the other
///
fn train_and_evaluate(
    features: &DMatrix<f64>,
    labels: &[usize],
    feature_names: &[String],
    split: &TrainTestSplit,
    settings: &LdaSettings,
) -> Result<Evaluation, Box<dyn error::Error>> {
    let train_features = features.select_rows(split.train.iter());
    let train_labels = select_labels(labels, &split.train);
    let class_sizes = get_class_sizes(&train_labels);
    info!(
        "Training discriminant model on {} rows, class sizes {}/{}",
        train_labels.len(),
        class_sizes[0],
        class_sizes[1]
    );
    let model = DiscriminantModel::fit(
        &train_features,
        &train_labels,
        feature_names,
        settings.axis_count,
        settings.get_scatter_mode(),
    )?;

    let test_features = features.select_rows(split.test.iter());
    let test_labels = select_labels(labels, &split.test);
    let predicted = model.classify(&test_features);
    let confusion = ConfusionMatrix::from_labels(&test_labels, &predicted);
    Ok(Evaluation {
        model,
        predicted,
        confusion,
    })
}

pub fn run_lda(settings: &LdaSettings) -> Result<(), Box<dyn error::Error>> {
    let output_dir = settings.output_dir.as_path();
    write_lda_settings(output_dir, settings);

    let matrix = read_feature_matrix(
        &settings.feature_filename,
        settings.label_column,
        &settings.feature_columns,
    )?;
    info!(
        "Classifying {} using features: {}",
        matrix.label_name,
        matrix.feature_names.join(", ")
    );

    let split = get_train_test_split(matrix.row_count(), settings.train_count, settings.seed)?;
    let Evaluation {
        model,
        predicted,
        confusion,
    } = train_and_evaluate(
        &matrix.features,
        &matrix.labels,
        &matrix.feature_names,
        &split,
        settings,
    )?;

    let misclassification_rate = confusion.misclassification_rate()?;
    let accuracy = confusion.accuracy()?;
    info!(
        "Held-out evaluation on {} rows: accuracy {accuracy:.4}, misclassification rate {misclassification_rate:.4}",
        split.test.len()
    );

    let test_predictions = split
        .test
        .iter()
        .zip(predicted)
        .map(|(&row_index, predicted)| TestPrediction {
            tumor_id: matrix.row_ids[row_index].clone(),
            observed: matrix.labels[row_index],
            predicted,
        })
        .collect();

    let results = LdaResults {
        label_name: matrix.label_name.clone(),
        feature_names: matrix.feature_names.clone(),
        scatter_mode: settings.get_scatter_mode(),
        seed: settings.seed,
        input_row_count: matrix.row_count(),
        skipped_row_count: matrix.skipped_row_count,
        train_row_count: split.train.len(),
        test_row_count: split.test.len(),
        class_means: get_matrix_rows(&model.class_means),
        eigenvalues: model.eigenvalues.clone(),
        projection: get_matrix_rows(&model.projection),
        priors: model.priors,
        confusion_matrix: confusion.to_rows(),
        misclassification_rate,
        accuracy,
        test_predictions,
    };
    write_lda_results(output_dir, &results);
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::distributions::Distribution;
    use statrs::distribution::Normal;

    use super::*;

    #[test]
    fn test_train_test_split() {
        let split = get_train_test_split(10, None, 7).unwrap();
        assert_eq!(split.train.len(), 8);
        assert_eq!(split.test.len(), 2);

        let mut all = [split.train.clone(), split.test.clone()].concat();
        all.sort();
        assert_eq!(all, (0..10).collect::<Vec<_>>());

        // Reproducible for a fixed seed
        let split2 = get_train_test_split(10, None, 7).unwrap();
        assert_eq!(split.train, split2.train);

        let split = get_train_test_split(10, Some(3), 7).unwrap();
        assert_eq!(split.train.len(), 3);
        assert_eq!(split.test.len(), 7);

        assert!(get_train_test_split(10, Some(11), 7).is_err());
    }

    #[test]
    fn test_shuffled_cluster_evaluation() {
        let mut rng = ChaCha8Rng::seed_from_u64(19);
        let noise = Normal::new(0.0, 1.0).unwrap();
        let mut values = Vec::new();
        let mut labels = Vec::new();
        for (label, center) in [(0, [0.0, 0.0]), (1, [10.0, 10.0])] {
            for _ in 0..20 {
                values.extend(center.map(|x| x + noise.sample(&mut rng)));
                labels.push(label);
            }
        }
        let features = DMatrix::from_row_slice(40, 2, &values);
        let feature_names = vec!["X".to_string(), "Y".to_string()];
        let settings = LdaSettings {
            axis_count: 2,
            ..Default::default()
        };

        let split = get_train_test_split(40, None, 3).unwrap();
        let evaluation =
            train_and_evaluate(&features, &labels, &feature_names, &split, &settings).unwrap();
        assert_eq!(evaluation.predicted.len(), 8);
        assert_eq!(evaluation.confusion.total(), 8);
        assert_eq!(evaluation.model.class_means.nrows(), 2);
        assert!(evaluation.confusion.accuracy().unwrap() >= 0.95);
    }
}
