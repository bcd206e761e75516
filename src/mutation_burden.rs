//! Per-tumor mutation burden and driver clonality summary
//!

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ccf::{CcfInput, ClonalStatus, estimate_ccf_with_error};
use crate::copy_number_segments::SegmentIndex;
use crate::driver_genes::{DriverGenes, VHL_GENE};
use crate::errors::{ClonalityError, ClonalityResult};
use crate::expected_copy_number::{MutationCopyNumberMode, Sex, get_normal_copy_number};
use crate::variant::Variant;

/// Parameters of the per-variant CCF estimate
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CcfModelSettings {
    pub purity: f64,
    pub resample_count: usize,
    pub mutation_copy_number_mode: MutationCopyNumberMode,
}

/// Shared and tumor-specific lookups needed to classify one tumor's driver variants
///
pub struct TumorContext<'a> {
    pub tumor_id: &'a str,
    pub sex: Sex,
    pub segments: &'a SegmentIndex,
    pub driver_genes: &'a DriverGenes,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MutationBurden {
    pub total_count: usize,
    pub nonsynonymous_count: usize,
    pub driver_count: usize,
    pub clonal_driver_count: usize,
    pub subclonal_driver_count: usize,

    /// Driver variants which could not be assigned a clonal status
    pub unclassified_driver_count: usize,

    pub vhl_mutated: bool,
}

impl MutationBurden {
    /// Fraction of nonsynonymous variants hitting a driver gene
    ///
    pub fn driver_ratio(&self) -> ClonalityResult<f64> {
        if self.nonsynonymous_count == 0 {
            return Err(ClonalityError::division_by_zero(
                "driver ratio with no nonsynonymous variants",
            ));
        }
        Ok(self.driver_count as f64 / self.nonsynonymous_count as f64)
    }

    /// Fraction of driver variants classified as clonal
    ///
    pub fn clonal_ratio(&self) -> ClonalityResult<f64> {
        if self.driver_count == 0 {
            return Err(ClonalityError::division_by_zero(
                "clonal ratio with no driver variants",
            ));
        }
        Ok(self.clonal_driver_count as f64 / self.driver_count as f64)
    }
}

/// Get the clonal status of one driver variant
///
fn get_driver_clonal_status<R: Rng + ?Sized>(
    tumor: &TumorContext,
    settings: &CcfModelSettings,
    has_y_segments: bool,
    variant: &Variant,
    rng: &mut R,
) -> ClonalityResult<ClonalStatus> {
    let normal_copy_number = get_normal_copy_number(&variant.chrom, tumor.sex, has_y_segments);
    let tumor_copy_number = tumor.segments.get_copy_number(
        tumor.tumor_id,
        &variant.chrom,
        variant.pos,
        normal_copy_number,
    );
    let input = CcfInput {
        mutant_count: variant.mutant_count,
        wild_type_count: variant.wild_type_count,
        purity: settings.purity,
        tumor_copy_number,
        normal_copy_number,
    };
    let estimate = estimate_ccf_with_error(
        &input,
        settings.mutation_copy_number_mode,
        settings.resample_count,
        rng,
    )?;
    let status = estimate.status();
    debug!(
        "Tumor {} driver {} at {}:{} CN {}/{} CCF {:.3} +/- {:.3} {:?}",
        tumor.tumor_id,
        variant.gene,
        variant.chrom,
        variant.pos,
        tumor_copy_number,
        normal_copy_number,
        estimate.ccf,
        estimate.error,
        status
    );
    Ok(status)
}

/// Stream one tumor's variants in input order and accumulate its mutation burden
///
/// Only PASS variants are counted. Driver variants whose CCF can't be estimated are reported and
/// left out of the clonal/subclonal split, but still count as drivers.
///
pub fn aggregate_tumor_variants<R: Rng + ?Sized>(
    tumor: &TumorContext,
    settings: &CcfModelSettings,
    variants: &[Variant],
    rng: &mut R,
) -> MutationBurden {
    let has_y_segments = tumor.segments.has_chrom_segments(tumor.tumor_id, "Y");

    let mut burden = MutationBurden::default();
    for variant in variants.iter().filter(|x| x.is_pass) {
        burden.total_count += 1;
        if !variant.is_nonsynonymous() {
            continue;
        }
        burden.nonsynonymous_count += 1;
        if !tumor.driver_genes.contains(&variant.gene) {
            continue;
        }
        burden.driver_count += 1;
        if variant.gene == VHL_GENE {
            burden.vhl_mutated = true;
        }

        match get_driver_clonal_status(tumor, settings, has_y_segments, variant, rng) {
            Ok(ClonalStatus::Clonal) => burden.clonal_driver_count += 1,
            Ok(ClonalStatus::Subclonal) => burden.subclonal_driver_count += 1,
            Err(e) => {
                warn!(
                    "Can't classify clonality of tumor {} driver variant {} at {}:{}: {e}",
                    tumor.tumor_id, variant.gene, variant.chrom, variant.pos
                );
                burden.unclassified_driver_count += 1;
            }
        }
    }
    burden
}
