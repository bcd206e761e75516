//! Cancer-cell fraction estimation for single somatic variants
//!

mod bootstrap;

pub use bootstrap::{DEFAULT_RESAMPLE_COUNT, bootstrap_ccf_error};

use rand::Rng;

use crate::errors::{ClonalityError, ClonalityResult};
use crate::expected_copy_number::{MutationCopyNumberMode, expected_mutation_copy_number};

/// All observations needed to estimate the cancer-cell fraction of one variant
///
#[derive(Clone, Debug)]
pub struct CcfInput {
    pub mutant_count: u32,
    pub wild_type_count: u32,
    pub purity: f64,
    pub tumor_copy_number: i32,
    pub normal_copy_number: i32,
}

impl CcfInput {
    pub fn total_count(&self) -> u32 {
        self.mutant_count + self.wild_type_count
    }

    /// Factor converting variant allele frequency to cancer-cell fraction
    ///
    /// This accounts for normal cell contamination and the expected number of mutated copies
    /// given the tumor copy number.
    ///
    fn vaf_to_ccf_factor(&self, mode: MutationCopyNumberMode) -> ClonalityResult<f64> {
        let purity = self.purity;
        if !(purity > 0.0 && purity <= 1.0) {
            return Err(ClonalityError::InvalidPurity { purity });
        }
        let expected_mutated_copies = expected_mutation_copy_number(self.tumor_copy_number, mode)?;
        if expected_mutated_copies == 0.0 {
            return Err(ClonalityError::division_by_zero(
                "expected mutation copy number is zero",
            ));
        }
        let average_copy_number = purity * self.tumor_copy_number as f64
            + self.normal_copy_number as f64 * (1.0 - purity);
        Ok(average_copy_number / (purity * expected_mutated_copies))
    }
}

/// Point estimate of the cancer-cell fraction
///
pub fn estimate_ccf(input: &CcfInput, mode: MutationCopyNumberMode) -> ClonalityResult<f64> {
    let total = input.total_count();
    if total == 0 {
        return Err(ClonalityError::division_by_zero(
            "variant allele frequency with zero read depth",
        ));
    }
    let vaf = input.mutant_count as f64 / total as f64;
    Ok(vaf * input.vaf_to_ccf_factor(mode)?)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClonalStatus {
    Clonal,
    Subclonal,
}

#[derive(Clone, Debug)]
pub struct CcfEstimate {
    pub ccf: f64,

    /// Half-width of the symmetric 95% confidence interval
    pub error: f64,
}

impl CcfEstimate {
    /// A variant is clonal if the upper bound of its CCF confidence interval reaches 1
    ///
    pub fn status(&self) -> ClonalStatus {
        if self.ccf + self.error >= 1.0 {
            ClonalStatus::Clonal
        } else {
            ClonalStatus::Subclonal
        }
    }
}

/// Estimate cancer-cell fraction and its bootstrap confidence interval
///
pub fn estimate_ccf_with_error<R: Rng + ?Sized>(
    input: &CcfInput,
    mode: MutationCopyNumberMode,
    resample_count: usize,
    rng: &mut R,
) -> ClonalityResult<CcfEstimate> {
    let ccf = estimate_ccf(input, mode)?;
    let error = bootstrap_ccf_error(input, mode, resample_count, rng)?;
    Ok(CcfEstimate { ccf, error })
}
