//! Track stats and results for each clonality command
//!

use std::fs::File;

use camino::Utf8Path;
use log::info;
use serde::{Deserialize, Serialize};
use unwrap::unwrap;

use crate::filenames::{LDA_RESULTS_FILENAME, RUN_STATS_FILENAME};
use crate::lda::{CLASS_COUNT, ScatterMode};

#[derive(Default, Deserialize, Serialize)]
pub struct InputRecordStats {
    pub clinical_tumor_count: usize,
    pub segment_tumor_count: usize,
    pub variant_file_count: usize,
    pub variant_record_count: usize,

    pub malformed_clinical_record_count: usize,
    pub malformed_segment_record_count: usize,
    pub malformed_variant_record_count: usize,
}

#[derive(Default, Deserialize, Serialize)]
pub struct TumorStats {
    pub processed_tumor_count: usize,
    pub feature_row_count: usize,

    /// Clinical table tumors with no copy number segments
    pub tumors_without_segments: usize,

    /// Clinical table tumors with no variant file
    pub tumors_without_variant_file: usize,

    /// Variant files which don't match any clinical table tumor
    pub unmatched_variant_file_count: usize,

    /// Variant files ignored because an earlier file has the same tumor id
    pub duplicate_variant_file_count: usize,

    /// Tumors dropped for an undefined burden ratio
    pub zero_ratio_excluded_tumor_count: usize,
}

#[derive(Default, Deserialize, Serialize)]
pub struct DriverStats {
    pub driver_variant_count: usize,
    pub clonal_driver_count: usize,
    pub subclonal_driver_count: usize,

    /// Driver variants without a CCF estimate, these are not counted as clonal or subclonal
    pub unclassified_driver_count: usize,
}

#[derive(Default, Deserialize, Serialize)]
pub struct CcfRunStats {
    pub input_stats: InputRecordStats,
    pub tumor_stats: TumorStats,
    pub driver_stats: DriverStats,
}

#[derive(Deserialize, Serialize)]
pub struct TestPrediction {
    pub tumor_id: String,
    pub observed: usize,
    pub predicted: usize,
}

#[derive(Deserialize, Serialize)]
pub struct LdaResults {
    pub label_name: String,
    pub feature_names: Vec<String>,
    pub scatter_mode: ScatterMode,
    pub seed: u64,

    pub input_row_count: usize,
    pub skipped_row_count: usize,
    pub train_row_count: usize,
    pub test_row_count: usize,

    /// Training partition mean vector of each class
    pub class_means: Vec<Vec<f64>>,

    /// Eigenvalues of all discriminant axes, sorted by decreasing magnitude
    pub eigenvalues: Vec<f64>,

    /// Retained discriminant axes, one per row
    pub projection: Vec<Vec<f64>>,

    pub priors: [f64; CLASS_COUNT],

    /// Test partition counts indexed by [observed][predicted]
    pub confusion_matrix: [[usize; CLASS_COUNT]; CLASS_COUNT],

    pub misclassification_rate: f64,
    pub accuracy: f64,

    pub test_predictions: Vec<TestPrediction>,
}

fn write_json<T: Serialize>(filename: &Utf8Path, label: &str, value: &T) {
    info!("Writing {label} to file: '{filename}'");

    let f = unwrap!(
        File::create(filename),
        "Unable to create {label} json file: '{filename}'"
    );

    serde_json::to_writer_pretty(&f, value).unwrap();
}

/// Write run_stats structure out in json format
pub fn write_ccf_run_stats(output_dir: &Utf8Path, run_stats: &CcfRunStats) {
    write_json(
        &output_dir.join(RUN_STATS_FILENAME),
        "run statistics",
        run_stats,
    );
}

pub fn write_lda_results(output_dir: &Utf8Path, results: &LdaResults) {
    write_json(
        &output_dir.join(LDA_RESULTS_FILENAME),
        "discriminant analysis results",
        results,
    );
}
