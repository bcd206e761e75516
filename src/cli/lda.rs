use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use const_format::concatcp;
use serde::{Deserialize, Serialize};
use simple_error::{SimpleResult, bail};

use super::DEFAULT_SEED;
use super::utils::{check_required_filename, write_settings};
use crate::filenames::LDA_SETTINGS_FILENAME;
use crate::lda::{DEFAULT_AXIS_COUNT, ScatterMode};

#[derive(Args, Default, Deserialize, Serialize)]
pub struct LdaSettings {
    /// Directory for all lda command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_lda_output"))]
    pub output_dir: Utf8PathBuf,

    /// Tumor feature table, as written by the ccf command
    #[arg(long = "features", value_name = "FILE")]
    pub feature_filename: Utf8PathBuf,

    /// Zero-indexed column of the 0/1 class label. The default selects GRADE.
    #[arg(long, default_value_t = 1)]
    pub label_column: usize,

    /// Comma-delimited list of zero-indexed feature columns
    ///
    /// By default all columns except the tumor id, the label and TOTALDRIVER are used. TOTALDRIVER
    /// is left out because it is normally the sum of CLONDRIVER and SUBCLONDRIVER.
    ///
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub feature_columns: Vec<usize>,

    /// Number of shuffled rows used for training, all remaining rows are used for testing.
    /// Defaults to 80% of the rows, rounded down.
    #[arg(long, value_name = "COUNT")]
    pub train_count: Option<usize>,

    /// Random seed for the train/test shuffle
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Number of discriminant axes retained in the projection, limited to the feature count
    #[arg(long = "axes", default_value_t = DEFAULT_AXIS_COUNT)]
    pub axis_count: usize,

    /// Compute within-class scatter from each class's summed deviation vector, as in earlier
    /// discriminant results
    ///
    /// This usually yields a singular scatter matrix, so it is only useful to reproduce earlier
    /// results.
    ///
    #[arg(long)]
    pub legacy_within_class_scatter: bool,
}

impl LdaSettings {
    pub fn get_scatter_mode(&self) -> ScatterMode {
        if self.legacy_within_class_scatter {
            ScatterMode::SummedDeviation
        } else {
            ScatterMode::PerObservation
        }
    }
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_lda_settings(settings: LdaSettings) -> SimpleResult<LdaSettings> {
    check_required_filename(&settings.feature_filename, "feature table")?;

    if settings.label_column == 0 {
        bail!("--label-column argument must not select the tumor id column");
    }

    for &column in settings.feature_columns.iter() {
        if column == 0 {
            bail!("--feature-columns argument must not include the tumor id column");
        }
        if column == settings.label_column {
            bail!("--feature-columns argument must not include the label column {column}");
        }
    }

    if settings.axis_count == 0 {
        bail!("--axes argument must be greater than 0");
    }

    if settings.train_count == Some(0) {
        bail!("--train-count argument must be greater than 0");
    }

    Ok(settings)
}

pub fn write_lda_settings(output_dir: &Utf8Path, settings: &LdaSettings) {
    write_settings(output_dir, LDA_SETTINGS_FILENAME, "lda", settings);
}
