//! Per-tumor clinical annotation input
//!

use std::collections::HashSet;

use camino::Utf8Path;
use log::{info, warn};

use crate::chrom_utils::normalize_tumor_id;
use crate::errors::{ClonalityError, ClonalityResult};
use crate::expected_copy_number::Sex;
use crate::os_utils::read_text_file;

#[derive(Clone, Debug, PartialEq)]
pub struct ClinicalRecord {
    pub tumor_id: String,

    /// 0 for low grade, 1 for high grade
    pub grade: u8,
    pub sex: Sex,
    pub age: f64,

    /// Maximum tumor dimension
    pub max_dimension: f64,

    /// 1 if metastasis was observed
    pub metastasis: u8,

    /// Stage code 0-3
    pub stage: u8,
}

/// Clinical records in table order, with the count of skipped lines
///
pub struct ClinicalTable {
    pub records: Vec<ClinicalRecord>,
    pub malformed_count: usize,
}

pub fn read_clinical_file(filename: &Utf8Path) -> ClinicalTable {
    let label = "clinical";
    info!("Reading {label} data from file '{filename}'");
    let content = read_text_file(filename, label);
    let table = parse_clinical_content(&content);
    info!(
        "Read {} tumor records from {label} file '{filename}'",
        table.records.len()
    );
    table
}

/// Parse clinical table content
///
/// The first line is a header and is skipped. Malformed lines and repeated tumor ids are reported
/// and skipped.
///
pub fn parse_clinical_content(content: &str) -> ClinicalTable {
    let mut records = Vec::new();
    let mut malformed_count = 0;
    let mut observed_ids = HashSet::new();
    for (line_index, line) in content.lines().enumerate().skip(1) {
        if line.is_empty() {
            continue;
        }
        let line_number = line_index + 1;
        match parse_clinical_line(line, line_number) {
            Ok(record) => {
                if observed_ids.insert(record.tumor_id.clone()) {
                    records.push(record);
                } else {
                    warn!(
                        "Skipping repeated tumor id '{}' at clinical table line {line_number}",
                        record.tumor_id
                    );
                    malformed_count += 1;
                }
            }
            Err(e) => {
                warn!("{e}");
                malformed_count += 1;
            }
        }
    }
    ClinicalTable {
        records,
        malformed_count,
    }
}

fn parse_clinical_line(line: &str, line_number: usize) -> ClonalityResult<ClinicalRecord> {
    let label = "clinical";
    let words = line.split('\t').map(|x| x.trim()).collect::<Vec<_>>();
    if words.len() < 7 {
        return Err(ClonalityError::malformed(
            label,
            line_number,
            format!("expected 7 columns, found {}", words.len()),
        ));
    }

    let parse_code = |index: usize, name: &str, max: u8| {
        match words[index].parse::<u8>() {
            Ok(x) if x <= max => Ok(x),
            _ => Err(ClonalityError::malformed(
                label,
                line_number,
                format!("invalid {name} code '{}'", words[index]),
            )),
        }
    };
    let parse_value = |index: usize, name: &str| {
        words[index].parse::<f64>().map_err(|_| {
            ClonalityError::malformed(
                label,
                line_number,
                format!("can't parse {name} '{}'", words[index]),
            )
        })
    };

    let grade = parse_code(1, "grade", 1)?;
    let sex = Sex::from_gender_code(parse_code(2, "gender", 1)?).ok_or_else(|| {
        ClonalityError::malformed(label, line_number, "gender code out of range")
    })?;
    let age = parse_value(3, "age")?;
    let max_dimension = parse_value(4, "max dimension")?;
    let metastasis = parse_code(5, "metastasis", 1)?;
    let stage = parse_code(6, "stage", 3)?;

    Ok(ClinicalRecord {
        tumor_id: normalize_tumor_id(words[0]),
        grade,
        sex,
        age,
        max_dimension,
        metastasis,
        stage,
    })
}
