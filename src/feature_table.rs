//! Per-tumor feature table, written by the ccf command and read back for discriminant analysis
//!

use std::fs::File;
use std::io::{BufWriter, Write};

use camino::Utf8Path;
use itertools::Itertools;
use log::{info, warn};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use simple_error::{SimpleResult, bail};
use unwrap::unwrap;

use crate::clinical::ClinicalRecord;
use crate::filenames::FEATURE_TABLE_FILENAME;
use crate::mutation_burden::MutationBurden;
use crate::os_utils::read_text_file;

/// Feature table column labels, in output order
pub const FEATURE_TABLE_HEADER: [&str; 15] = [
    "ID",
    "GRADE",
    "GENDER",
    "AGE",
    "MAXDIM",
    "METS",
    "VHL",
    "STAGE",
    "TOTALMUT",
    "TOTALNONSYN",
    "TOTALDRIVER",
    "CLONDRIVER",
    "SUBCLONDRIVER",
    "DRIVRATIO",
    "CLONRATIO",
];

/// Feature table columns left out of the default feature selection
///
/// TOTALDRIVER is the sum of CLONDRIVER, SUBCLONDRIVER and the unreported unclassified driver
/// count, so it is usually an exact linear combination of other features.
const DEFAULT_EXCLUDED_FEATURES: [&str; 1] = ["TOTALDRIVER"];

/// Value written for an undefined ratio
const MISSING_VALUE: &str = "NA";

/// Selects how tumors with an undefined driver or clonal ratio are reported
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize, clap::ValueEnum)]
pub enum ZeroRatioPolicy {
    /// Keep the tumor, writing 'NA' for each undefined ratio
    #[default]
    Sentinel,

    /// Drop the tumor from the feature table
    Exclude,
}

#[derive(Clone, Debug)]
pub struct TumorFeatureRow {
    pub clinical: ClinicalRecord,
    pub burden: MutationBurden,
    pub driver_ratio: Option<f64>,
    pub clonal_ratio: Option<f64>,
}

impl TumorFeatureRow {
    /// Combine a tumor's clinical record and mutation burden, computing the burden ratios
    ///
    /// Returns None if either ratio is undefined and the policy excludes such tumors.
    ///
    pub fn finalize(
        clinical: ClinicalRecord,
        burden: MutationBurden,
        policy: ZeroRatioPolicy,
    ) -> Option<Self> {
        let driver_ratio = burden.driver_ratio();
        let clonal_ratio = burden.clonal_ratio();
        if policy == ZeroRatioPolicy::Exclude {
            if let Err(e) = driver_ratio.as_ref().and(clonal_ratio.as_ref()) {
                info!("Excluding tumor {} from feature table: {e}", clinical.tumor_id);
                return None;
            }
        }
        Some(Self {
            clinical,
            burden,
            driver_ratio: driver_ratio.ok(),
            clonal_ratio: clonal_ratio.ok(),
        })
    }

    fn format_line(&self) -> String {
        let c = &self.clinical;
        let b = &self.burden;
        let format_ratio = |x: Option<f64>| match x {
            Some(x) => x.to_string(),
            None => MISSING_VALUE.to_string(),
        };
        [
            c.tumor_id.clone(),
            c.grade.to_string(),
            c.sex.gender_code().to_string(),
            c.age.to_string(),
            c.max_dimension.to_string(),
            c.metastasis.to_string(),
            (b.vhl_mutated as u8).to_string(),
            c.stage.to_string(),
            b.total_count.to_string(),
            b.nonsynonymous_count.to_string(),
            b.driver_count.to_string(),
            b.clonal_driver_count.to_string(),
            b.subclonal_driver_count.to_string(),
            format_ratio(self.driver_ratio),
            format_ratio(self.clonal_ratio),
        ]
        .iter()
        .join("\t")
    }
}

fn write_feature_rows(f: &mut impl Write, rows: &[TumorFeatureRow]) -> std::io::Result<()> {
    writeln!(f, "{}", FEATURE_TABLE_HEADER.iter().join("\t"))?;
    for row in rows {
        writeln!(f, "{}", row.format_line())?;
    }
    Ok(())
}

pub fn write_feature_table(output_dir: &Utf8Path, rows: &[TumorFeatureRow]) {
    let filename = output_dir.join(FEATURE_TABLE_FILENAME);

    info!("Writing tumor feature table to file: '{filename}'");

    let f = unwrap!(
        File::create(&filename),
        "Unable to create tumor feature table file: '{filename}'"
    );
    let mut f = BufWriter::new(f);
    unwrap!(
        write_feature_rows(&mut f, rows),
        "Unable to write tumor feature table file: '{filename}'"
    );
}

/// Numeric feature matrix and binary class labels loaded from a feature table
///
pub struct FeatureMatrix {
    pub feature_names: Vec<String>,
    pub label_name: String,

    /// Tumor id of each row
    pub row_ids: Vec<String>,

    /// One row per tumor, one column per selected feature
    pub features: DMatrix<f64>,

    /// Class label of each row, 0 or 1
    pub labels: Vec<usize>,

    /// Count of rows skipped for missing or non-numeric values
    pub skipped_row_count: usize,
}

impl FeatureMatrix {
    pub fn row_count(&self) -> usize {
        self.labels.len()
    }
}

/// Parse a class label value, which must be numerically 0 or 1
///
fn parse_class_label(s: &str) -> Option<usize> {
    let value = s.parse::<f64>().ok()?;
    if value == 0.0 {
        Some(0)
    } else if value == 1.0 {
        Some(1)
    } else {
        None
    }
}

/// Load a numeric feature matrix from feature table content
///
/// Column 0 is the row id. The first line is the header.
///
/// # Arguments
/// * `label_column` - Index of the column holding the 0/1 class label
/// * `feature_columns` - Indexes of the feature columns. If empty, all columns except the row id,
///   the label and `DEFAULT_EXCLUDED_FEATURES` are used.
///
pub fn parse_feature_matrix(
    content: &str,
    label_column: usize,
    feature_columns: &[usize],
) -> SimpleResult<FeatureMatrix> {
    let mut lines = content.lines().enumerate();
    let header = match lines.next() {
        Some((_, x)) => x.split('\t').collect::<Vec<_>>(),
        None => bail!("Feature table is empty"),
    };
    let column_count = header.len();

    if label_column == 0 || label_column >= column_count {
        bail!(
            "Label column {label_column} is out of range for a feature table with {column_count} columns"
        );
    }
    let feature_columns = if feature_columns.is_empty() {
        (1..column_count)
            .filter(|&x| x != label_column && !DEFAULT_EXCLUDED_FEATURES.contains(&header[x]))
            .collect::<Vec<_>>()
    } else {
        feature_columns.to_vec()
    };
    for &column in feature_columns.iter() {
        if column == 0 || column >= column_count {
            bail!(
                "Feature column {column} is out of range for a feature table with {column_count} columns"
            );
        }
        if column == label_column {
            bail!("Feature column {column} is also the label column");
        }
    }
    if feature_columns.is_empty() {
        bail!("No feature columns selected");
    }

    let mut row_ids = Vec::new();
    let mut values = Vec::new();
    let mut labels = Vec::new();
    let mut skipped_row_count = 0;
    for (line_index, line) in lines {
        if line.is_empty() {
            continue;
        }
        let line_number = line_index + 1;
        let words = line.split('\t').collect::<Vec<_>>();
        if words.len() != column_count {
            warn!(
                "Skipping feature table line {line_number}: expected {column_count} columns, found {}",
                words.len()
            );
            skipped_row_count += 1;
            continue;
        }
        let Some(label) = parse_class_label(words[label_column]) else {
            warn!(
                "Skipping feature table line {line_number}: invalid class label '{}'",
                words[label_column]
            );
            skipped_row_count += 1;
            continue;
        };
        let row_values = feature_columns
            .iter()
            .map(|&x| words[x].parse::<f64>().ok().filter(|v| v.is_finite()))
            .collect::<Option<Vec<_>>>();
        let Some(row_values) = row_values else {
            warn!("Skipping feature table line {line_number}: non-numeric feature value");
            skipped_row_count += 1;
            continue;
        };
        row_ids.push(words[0].to_string());
        labels.push(label);
        values.extend(row_values);
    }

    let features = DMatrix::from_row_slice(labels.len(), feature_columns.len(), &values);
    Ok(FeatureMatrix {
        feature_names: feature_columns
            .iter()
            .map(|&x| header[x].to_string())
            .collect(),
        label_name: header[label_column].to_string(),
        row_ids,
        features,
        labels,
        skipped_row_count,
    })
}

pub fn read_feature_matrix(
    filename: &Utf8Path,
    label_column: usize,
    feature_columns: &[usize],
) -> SimpleResult<FeatureMatrix> {
    info!("Reading feature table from file '{filename}'");
    let content = read_text_file(filename, "feature table");
    let matrix = parse_feature_matrix(&content, label_column, feature_columns)?;
    info!(
        "Read {} rows with {} features from feature table, {} rows skipped",
        matrix.row_count(),
        matrix.feature_names.len(),
        matrix.skipped_row_count
    );
    Ok(matrix)
}
