use serde::{Deserialize, Serialize};

use crate::errors::{ClonalityError, ClonalityResult};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Translate the clinical table gender code, where 1 is male and 0 is female
    ///
    pub fn from_gender_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Sex::Female),
            1 => Some(Sex::Male),
            _ => None,
        }
    }

    pub fn gender_code(&self) -> u8 {
        match self {
            Sex::Female => 0,
            Sex::Male => 1,
        }
    }
}

/// Provide the copy number of normal cells for a chromosome
///
/// The only non-diploid case handled is human sex chromosomes. Samples recorded as female are
/// still treated as single-copy X when the tumor segmentation includes chromosome Y.
///
/// # Arguments
/// * `chrom` - normalized chromosome name
/// * `has_y_segments` - true if the tumor's copy number segmentation includes chromosome Y
///
pub fn get_normal_copy_number(chrom: &str, sex: Sex, has_y_segments: bool) -> i32 {
    match chrom {
        "X" => match sex {
            Sex::Male => 1,
            Sex::Female => {
                if has_y_segments {
                    1
                } else {
                    2
                }
            }
        },
        "Y" => 1,
        _ => 2,
    }
}

/// Selects how the expected mutation copy number quotient is reported
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize, clap::ValueEnum)]
pub enum MutationCopyNumberMode {
    /// Integer quotient of the weighted sums, reproducing earlier clonality tables
    #[default]
    Truncated,

    /// Exact expectation
    Exact,
}

/// Expected number of mutated copies given total copy number `n`
///
/// The mutation is assumed to be present in `k` of `n` copies, for `k` in 1..=n, with weight
/// proportional to the binomial coefficient C(n,k). The weighted sums reduce to
/// n 2^(n-1) / (2^n - 1), evaluated here as n / (2 - 2^(1-n)) so that it stays finite for any
/// copy number.
///
pub fn expected_mutation_copy_number(n: i32, mode: MutationCopyNumberMode) -> ClonalityResult<f64> {
    if n < 1 {
        return Err(ClonalityError::InvalidCopyNumber { copy_number: n });
    }
    let expectation = n as f64 / (2.0 - 2f64.powi(1 - n));
    Ok(match mode {
        MutationCopyNumberMode::Truncated => expectation.floor(),
        MutationCopyNumberMode::Exact => expectation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use MutationCopyNumberMode::{Exact, Truncated};

    #[test]
    fn test_expected_mutation_copy_number_single_copy() {
        assert_eq!(expected_mutation_copy_number(1, Exact).unwrap(), 1.0);
        assert_eq!(expected_mutation_copy_number(1, Truncated).unwrap(), 1.0);
    }

    #[test]
    fn test_expected_mutation_copy_number_exact() {
        // (1*2 + 2*1) / 3
        approx::assert_ulps_eq!(
            expected_mutation_copy_number(2, Exact).unwrap(),
            4.0 / 3.0,
            max_ulps = 4
        );

        // Closed form: n * 2^(n-1) / (2^n - 1)
        approx::assert_ulps_eq!(
            expected_mutation_copy_number(4, Exact).unwrap(),
            32.0 / 15.0,
            max_ulps = 4
        );
    }

    #[test]
    fn test_expected_mutation_copy_number_truncated() {
        assert_eq!(expected_mutation_copy_number(2, Truncated).unwrap(), 1.0);
        assert_eq!(expected_mutation_copy_number(3, Truncated).unwrap(), 1.0);
        assert_eq!(expected_mutation_copy_number(4, Truncated).unwrap(), 2.0);
    }

    #[test]
    fn test_expected_mutation_copy_number_range() {
        for mode in [Exact, Truncated] {
            for n in 1..=40 {
                let e = expected_mutation_copy_number(n, mode).unwrap();
                assert!(e >= 1.0 && e <= n as f64, "n={n} e={e}");
            }
        }
    }

    #[test]
    fn test_expected_mutation_copy_number_matches_binomial_weights() {
        use statrs::function::factorial::binomial;

        for n in 1..=30u64 {
            let (weighted_sum, total_weight) = (1..=n).fold((0f64, 0f64), |(ws, tw), k| {
                let w = binomial(n, k);
                (ws + k as f64 * w, tw + w)
            });
            approx::assert_relative_eq!(
                expected_mutation_copy_number(n as i32, Exact).unwrap(),
                weighted_sum / total_weight,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_expected_mutation_copy_number_high_copy_number() {
        for n in [1100, 2000, i32::MAX] {
            for mode in [Exact, Truncated] {
                let e = expected_mutation_copy_number(n, mode).unwrap();
                assert!(e.is_finite(), "n={n} e={e}");
                assert!(e >= 1.0 && e <= n as f64, "n={n} e={e}");
            }
        }
        assert_eq!(expected_mutation_copy_number(2000, Exact).unwrap(), 1000.0);
        assert_eq!(expected_mutation_copy_number(2001, Truncated).unwrap(), 1000.0);
    }

    #[test]
    fn test_expected_mutation_copy_number_invalid() {
        assert_eq!(
            expected_mutation_copy_number(0, Exact),
            Err(ClonalityError::InvalidCopyNumber { copy_number: 0 })
        );
        assert!(expected_mutation_copy_number(-1, Truncated).is_err());
    }

    #[test]
    fn test_normal_copy_number() {
        assert_eq!(get_normal_copy_number("1", Sex::Male, false), 2);
        assert_eq!(get_normal_copy_number("X", Sex::Male, false), 1);
        assert_eq!(get_normal_copy_number("X", Sex::Female, false), 2);
        assert_eq!(get_normal_copy_number("X", Sex::Female, true), 1);
        assert_eq!(get_normal_copy_number("Y", Sex::Female, false), 1);
        assert_eq!(get_normal_copy_number("Y", Sex::Male, true), 1);
    }
}
