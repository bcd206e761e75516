use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use const_format::concatcp;
use serde::{Deserialize, Serialize};
use simple_error::{SimpleResult, bail};

use super::DEFAULT_SEED;
use super::utils::{check_required_filename, write_settings};
use crate::ccf::DEFAULT_RESAMPLE_COUNT;
use crate::expected_copy_number::MutationCopyNumberMode;
use crate::feature_table::ZeroRatioPolicy;
use crate::filenames::CCF_SETTINGS_FILENAME;
use crate::mutation_burden::CcfModelSettings;
use crate::variant::DEFAULT_ANNOTATION_KEY;

#[derive(Args, Default, Deserialize, Serialize)]
pub struct CcfSettings {
    /// Directory for all ccf command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_ccf_output"))]
    pub output_dir: Utf8PathBuf,

    /// Clinical table with one row per tumor, in tab-delimited format
    ///
    /// The first line is a header. Columns are: tumor id, grade (0/1), gender (0 female, 1 male),
    /// age, maximum tumor dimension, metastasis (0/1) and stage (0-3).
    ///
    #[arg(long = "clinical", value_name = "FILE")]
    pub clinical_filename: Utf8PathBuf,

    /// Copy number segments for all tumors, in tab-delimited format
    ///
    /// The first line is a header. Columns are: tumor id, chromosome, start, end, probe count
    /// (ignored) and log2 copy number ratio.
    ///
    #[arg(long = "segments", value_name = "FILE")]
    pub segment_filename: Utf8PathBuf,

    /// Annotated somatic variants for one tumor, in VCF format. May be given multiple times.
    ///
    /// The tumor id is taken from the first three dash-delimited tokens of the file name.
    ///
    #[arg(long = "vcf", value_name = "FILE", num_args = 1.., required = true)]
    pub vcf_filenames: Vec<Utf8PathBuf>,

    /// Driver gene symbols, one per line
    #[arg(long = "driver-genes", value_name = "FILE")]
    pub driver_gene_filename: Utf8PathBuf,

    /// Tumor purity, the fraction of tumor cells in each sample, in (0,1]
    #[arg(long)]
    pub purity: f64,

    /// Number of bootstrap resamples used for each driver variant's CCF confidence interval
    #[arg(long, default_value_t = DEFAULT_RESAMPLE_COUNT)]
    pub resample_count: usize,

    /// Random seed for bootstrap resampling
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// INFO key of the pipe-delimited consequence annotation
    #[arg(long, default_value = DEFAULT_ANNOTATION_KEY)]
    pub annotation_key: String,

    /// Handling of tumors with no nonsynonymous or no driver variants, for which a burden ratio is
    /// undefined
    #[arg(long, value_enum, default_value_t)]
    pub zero_ratio_policy: ZeroRatioPolicy,

    /// Method used to compute the expected number of mutated copies from the tumor copy number
    ///
    /// The truncated method keeps only the integer part of the expectation, which reproduces
    /// earlier clonality tables. In particular, a heterozygous mutation at VAF 0.5 in a diploid
    /// region of a pure sample gets CCF 1.0 only with this method.
    ///
    #[arg(long, value_enum, default_value_t)]
    pub mutation_copy_number_mode: MutationCopyNumberMode,
}

impl CcfSettings {
    pub fn get_ccf_model_settings(&self) -> CcfModelSettings {
        CcfModelSettings {
            purity: self.purity,
            resample_count: self.resample_count,
            mutation_copy_number_mode: self.mutation_copy_number_mode,
        }
    }
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_ccf_settings(settings: CcfSettings) -> SimpleResult<CcfSettings> {
    check_required_filename(&settings.clinical_filename, "clinical")?;
    check_required_filename(&settings.segment_filename, "copy number segment")?;
    check_required_filename(&settings.driver_gene_filename, "driver gene")?;
    for vcf_filename in settings.vcf_filenames.iter() {
        check_required_filename(vcf_filename, "variant")?;
    }

    if !(settings.purity > 0.0 && settings.purity <= 1.0) {
        bail!(
            "--purity argument must be in (0,1], observed {}",
            settings.purity
        );
    }

    if settings.resample_count < 2 {
        bail!("--resample-count argument must be at least 2");
    }

    if settings.annotation_key.is_empty() {
        bail!("--annotation-key argument must not be empty");
    }

    Ok(settings)
}

pub fn write_ccf_settings(output_dir: &Utf8Path, settings: &CcfSettings) {
    write_settings(output_dir, CCF_SETTINGS_FILENAME, "ccf", settings);
}
