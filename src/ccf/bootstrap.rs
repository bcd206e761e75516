use rand::Rng;
use rand::distributions::Distribution;
use statrs::distribution::Binomial;
use statrs::statistics::Statistics;

use super::CcfInput;
use crate::errors::{ClonalityError, ClonalityResult};
use crate::expected_copy_number::MutationCopyNumberMode;

pub const DEFAULT_RESAMPLE_COUNT: usize = 10_000;

/// Two-sided 95% normal quantile
const CI95_Z: f64 = 1.96;

/// Bootstrap the cancer-cell fraction to get the half-width of its 95% confidence interval
///
/// Each resample draws the variant's total read count with replacement from the observed pool of
/// mutant and wild-type reads. The mutant read count of such a resample follows a binomial
/// distribution with the observed allele frequency, so it is sampled from that distribution
/// directly.
///
/// Returns 1.96 times the sample standard deviation of the resampled CCF values.
///
/// # Arguments
/// * `resample_count` - Number of bootstrap resamples, must be at least 2
/// * `rng` - Random source, the caller owns seeding so that results are reproducible
///
pub fn bootstrap_ccf_error<R: Rng + ?Sized>(
    input: &CcfInput,
    mode: MutationCopyNumberMode,
    resample_count: usize,
    rng: &mut R,
) -> ClonalityResult<f64> {
    if resample_count < 2 {
        return Err(ClonalityError::division_by_zero(format!(
            "sample standard deviation of {resample_count} bootstrap resamples"
        )));
    }

    let total = input.total_count();
    if total == 0 {
        return Err(ClonalityError::division_by_zero(
            "bootstrap resampling with zero read depth",
        ));
    }

    let vaf = input.mutant_count as f64 / total as f64;
    let ccf_factor = input.vaf_to_ccf_factor(mode)?;
    let read_resampler = match Binomial::new(vaf, total as u64) {
        Ok(x) => x,
        Err(e) => {
            return Err(ClonalityError::division_by_zero(format!(
                "can't build read resampler for allele frequency {vaf}: {e}"
            )));
        }
    };

    let resampled_ccfs = (0..resample_count)
        .map(|_| {
            let resampled_mutant_count: f64 = read_resampler.sample(rng);
            ccf_factor * resampled_mutant_count / total as f64
        })
        .collect::<Vec<_>>();

    Ok(CI95_Z * resampled_ccfs.std_dev())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    use MutationCopyNumberMode::Truncated;

    fn get_input(mutant_count: u32, wild_type_count: u32) -> CcfInput {
        CcfInput {
            mutant_count,
            wild_type_count,
            purity: 1.0,
            tumor_copy_number: 2,
            normal_copy_number: 2,
        }
    }

    #[test]
    fn test_bootstrap_is_reproducible() {
        let input = get_input(7, 13);
        let mut rng1 = ChaCha8Rng::seed_from_u64(42);
        let mut rng2 = ChaCha8Rng::seed_from_u64(42);
        let e1 = bootstrap_ccf_error(&input, Truncated, 1000, &mut rng1).unwrap();
        let e2 = bootstrap_ccf_error(&input, Truncated, 1000, &mut rng2).unwrap();
        assert_eq!(e1, e2);
    }

    #[test]
    fn test_bootstrap_matches_binomial_error() {
        // With ccf factor 2, the ccf sd is 2 * sqrt(0.25 / 20) ~= 0.2236
        let input = get_input(10, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let error = bootstrap_ccf_error(&input, Truncated, 10_000, &mut rng).unwrap();
        approx::assert_abs_diff_eq!(error, 1.96 * 0.2236, epsilon = 0.02);
    }

    #[test]
    fn test_bootstrap_error_shrinks_with_depth() {
        let mut shallow_sum = 0.0;
        let mut deep_sum = 0.0;
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            shallow_sum +=
                bootstrap_ccf_error(&get_input(10, 10), Truncated, 500, &mut rng).unwrap();
            deep_sum +=
                bootstrap_ccf_error(&get_input(100, 100), Truncated, 500, &mut rng).unwrap();
        }
        assert!(deep_sum < shallow_sum);

        // Expected ratio is sqrt(10)
        assert!(deep_sum * 2.0 < shallow_sum);
    }

    #[test]
    fn test_bootstrap_without_mutant_reads() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let error = bootstrap_ccf_error(&get_input(0, 20), Truncated, 100, &mut rng).unwrap();
        assert_eq!(error, 0.0);
    }

    #[test]
    fn test_bootstrap_failures() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            bootstrap_ccf_error(&get_input(0, 0), Truncated, 100, &mut rng),
            Err(ClonalityError::DivisionByZero { .. })
        ));
        assert!(matches!(
            bootstrap_ccf_error(&get_input(5, 5), Truncated, 1, &mut rng),
            Err(ClonalityError::DivisionByZero { .. })
        ));
    }
}
