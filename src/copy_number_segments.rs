use std::collections::HashMap;

use camino::Utf8Path;
use log::{info, warn};

use crate::chrom_utils::{normalize_chrom_name, normalize_tumor_id};
use crate::errors::{ClonalityError, ClonalityResult};
use crate::os_utils::read_text_file;

/// Copy number reported for any position without segment coverage
pub const DEFAULT_COPY_NUMBER: i32 = 2;

/// A single copy-number segment from the tumor segmentation
///
/// Coordinates follow the segment file convention: 1-indexed, fully closed.
///
#[derive(Clone, Debug, PartialEq)]
pub struct CopyNumberSegment {
    pub start: i64,
    pub end: i64,
    pub log2_ratio: f64,
}

impl CopyNumberSegment {
    /// Return true if `pos` is covered by this segment, given that the segment start is already
    /// known to be at or before `pos`
    ///
    /// Positions one base past the segment end are still treated as covered.
    ///
    fn end_covers_pos(&self, pos: i64) -> bool {
        pos <= self.end + 1
    }

    /// Absolute copy number implied by this segment's log2 ratio, relative to the normal copy
    /// number of the locus
    ///
    pub fn copy_number(&self, normal_copy_number: i32) -> i32 {
        (self.log2_ratio.exp2() * normal_copy_number as f64).round() as i32
    }
}

/// Copy-number segments of one chromosome, ordered by start position
///
#[derive(Clone, Default)]
pub struct ChromSegments {
    segments: Vec<CopyNumberSegment>,
}

impl ChromSegments {
    /// Sort segments on start position
    ///
    /// The sort is stable, so segments sharing a start position keep their input order.
    ///
    fn sort(&mut self) {
        self.segments.sort_by_key(|x| x.start);
    }

    /// Get the integer tumor copy number at `pos`
    ///
    /// The first segment in start order covering `pos` is used. If no segment covers `pos`, the
    /// diploid default is returned regardless of `normal_copy_number`.
    ///
    pub fn get_copy_number(&self, pos: i64, normal_copy_number: i32) -> i32 {
        let candidate_count = self.segments.partition_point(|x| x.start <= pos);
        self.segments[..candidate_count]
            .iter()
            .find(|x| x.end_covers_pos(pos))
            .map(|x| x.copy_number(normal_copy_number))
            .unwrap_or(DEFAULT_COPY_NUMBER)
    }
}

/// Copy-number segments of all tumors, keyed on tumor id and then chromosome
///
/// The index is built once from the segment file and is immutable afterwards.
///
#[derive(Default)]
pub struct SegmentIndex {
    tumors: HashMap<String, HashMap<String, ChromSegments>>,
}

impl SegmentIndex {
    pub fn from_segment_file(filename: &Utf8Path) -> (Self, usize) {
        let label = "copy number segment";
        info!("Reading {label} data from file '{filename}'");
        let content = read_text_file(filename, label);
        let (index, malformed_count) = Self::from_segment_content(&content);
        info!(
            "Read copy number segments for {} tumors from file '{filename}'",
            index.tumor_count()
        );
        (index, malformed_count)
    }

    /// Build the index from segment file content
    ///
    /// The first line is a header and is skipped. Malformed lines are reported and skipped.
    ///
    /// Returns a 2-tuple of (index, malformed_line_count)
    ///
    pub fn from_segment_content(content: &str) -> (Self, usize) {
        let mut index = Self::default();
        let mut malformed_count = 0;
        for (line_index, line) in content.lines().enumerate().skip(1) {
            if line.is_empty() {
                continue;
            }
            match parse_segment_line(line, line_index + 1) {
                Ok((tumor_id, chrom, segment)) => index.add_segment(tumor_id, chrom, segment),
                Err(e) => {
                    warn!("{e}");
                    malformed_count += 1;
                }
            }
        }
        for chroms in index.tumors.values_mut() {
            for chrom_segments in chroms.values_mut() {
                chrom_segments.sort();
            }
        }
        (index, malformed_count)
    }

    fn add_segment(&mut self, tumor_id: String, chrom: String, segment: CopyNumberSegment) {
        self.tumors
            .entry(tumor_id)
            .or_default()
            .entry(chrom)
            .or_default()
            .segments
            .push(segment);
    }

    pub fn tumor_count(&self) -> usize {
        self.tumors.len()
    }

    pub fn contains_tumor(&self, tumor_id: &str) -> bool {
        self.tumors.contains_key(tumor_id)
    }

    /// Return true if the tumor has at least one segment on `chrom`
    ///
    pub fn has_chrom_segments(&self, tumor_id: &str, chrom: &str) -> bool {
        self.tumors
            .get(tumor_id)
            .and_then(|x| x.get(chrom))
            .is_some_and(|x| !x.segments.is_empty())
    }

    /// Get the integer tumor copy number at a genomic position
    ///
    /// Tumors or chromosomes missing from the index resolve to the diploid default.
    ///
    /// # Arguments
    /// * `chrom` - normalized chromosome name
    /// * `pos` - 1-indexed position
    /// * `normal_copy_number` - copy number of normal cells at this locus
    ///
    pub fn get_copy_number(
        &self,
        tumor_id: &str,
        chrom: &str,
        pos: i64,
        normal_copy_number: i32,
    ) -> i32 {
        match self.tumors.get(tumor_id).and_then(|x| x.get(chrom)) {
            Some(chrom_segments) => chrom_segments.get_copy_number(pos, normal_copy_number),
            None => DEFAULT_COPY_NUMBER,
        }
    }
}

/// Parse one segment line into (tumor_id, chrom, segment)
///
fn parse_segment_line(
    line: &str,
    line_number: usize,
) -> ClonalityResult<(String, String, CopyNumberSegment)> {
    let label = "copy number segment";
    let words = line.split('\t').collect::<Vec<_>>();
    if words.len() < 6 {
        return Err(ClonalityError::malformed(
            label,
            line_number,
            format!("expected 6 columns, found {}", words.len()),
        ));
    }
    let parse_int = |s: &str, name: &str| {
        s.trim().parse::<i64>().map_err(|_| {
            ClonalityError::malformed(label, line_number, format!("can't parse {name} '{s}'"))
        })
    };
    let start = parse_int(words[2], "start")?;
    let end = parse_int(words[3], "end")?;
    let log2_ratio = words[5].trim().parse::<f64>().map_err(|_| {
        ClonalityError::malformed(
            label,
            line_number,
            format!("can't parse log2 ratio '{}'", words[5]),
        )
    })?;
    if end < start {
        return Err(ClonalityError::malformed(
            label,
            line_number,
            format!("segment end {end} precedes start {start}"),
        ));
    }

    Ok((
        normalize_tumor_id(words[0].trim()),
        normalize_chrom_name(words[1].trim()),
        CopyNumberSegment {
            start,
            end,
            log2_ratio,
        },
    ))
}
