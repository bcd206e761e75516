mod ccf;
mod lda;
mod shared;
mod utils;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use simple_error::{SimpleResult, bail};

use self::ccf::validate_and_fix_ccf_settings;
pub use self::ccf::{CcfSettings, write_ccf_settings};
use self::lda::validate_and_fix_lda_settings;
pub use self::lda::{LdaSettings, write_lda_settings};
use self::shared::validate_and_fix_shared_settings;
pub use self::shared::SharedSettings;

/// Default random seed shared by all commands
pub const DEFAULT_SEED: u64 = 42;

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate driver variant clonality and write a per-tumor feature table
    Ccf(CcfSettings),

    /// Train and evaluate a two-class linear discriminant classifier on a tumor feature table
    Lda(LdaSettings),
}

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}"
)]
#[clap(propagate_version = true, rename_all = "kebab_case")]
pub struct Settings {
    #[command(flatten)]
    pub shared: SharedSettings,

    #[command(subcommand)]
    pub command: Commands,
}

impl Settings {
    pub fn get_output_dir(&self) -> &Utf8Path {
        match &self.command {
            Commands::Ccf(x) => &x.output_dir,
            Commands::Lda(x) => &x.output_dir,
        }
    }
}

/// Checks if a directory does not exist
///
pub fn check_novel_dirname(dirname: &Utf8Path, label: &str) -> SimpleResult<()> {
    if dirname.exists() {
        bail!("{label} already exists: \"{dirname}\"");
    }
    Ok(())
}

/// Validate settings and update parameters that can't be processed by clap
///
fn validate_and_fix_settings_impl(mut settings: Settings) -> SimpleResult<Settings> {
    settings.shared = validate_and_fix_shared_settings(settings.shared)?;

    settings.command = match settings.command {
        Commands::Ccf(x) => Commands::Ccf(validate_and_fix_ccf_settings(x)?),
        Commands::Lda(x) => Commands::Lda(validate_and_fix_lda_settings(x)?),
    };

    Ok(settings)
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
pub fn validate_and_fix_settings(settings: Settings) -> Settings {
    match validate_and_fix_settings_impl(settings) {
        Ok(x) => x,
        Err(msg) => {
            eprintln!("Invalid command-line setting: {msg}");
            std::process::exit(exitcode::USAGE);
        }
    }
}

pub fn parse_settings() -> Settings {
    Settings::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ccf_command_line() {
        let settings = Settings::try_parse_from([
            "clonality",
            "ccf",
            "--clinical",
            "clinical.tsv",
            "--segments",
            "segments.tsv",
            "--vcf",
            "TCGA-A3-3306-01A.vcf",
            "TCGA-A3-3307-01A.vcf.gz",
            "--driver-genes",
            "drivers.txt",
            "--purity",
            "0.7",
            "--zero-ratio-policy",
            "exclude",
            "--threads",
            "2",
        ])
        .unwrap();

        let Commands::Ccf(ccf) = &settings.command else {
            panic!("Expected ccf command");
        };
        assert_eq!(ccf.vcf_filenames.len(), 2);
        assert_eq!(ccf.purity, 0.7);
        assert_eq!(ccf.seed, DEFAULT_SEED);
        assert_eq!(
            ccf.zero_ratio_policy,
            crate::feature_table::ZeroRatioPolicy::Exclude
        );
        assert_eq!(settings.get_output_dir().as_str(), "clonality_ccf_output");
    }

    #[test]
    fn test_parse_lda_command_line() {
        let settings = Settings::try_parse_from([
            "clonality",
            "lda",
            "--features",
            "tumor.features.tsv",
            "--feature-columns",
            "3,4,13",
            "--axes",
            "1",
            "--legacy-within-class-scatter",
        ])
        .unwrap();

        let Commands::Lda(lda) = &settings.command else {
            panic!("Expected lda command");
        };
        assert_eq!(lda.feature_columns, vec![3, 4, 13]);
        assert_eq!(lda.axis_count, 1);
        assert_eq!(lda.label_column, 1);
        assert!(lda.legacy_within_class_scatter);
        assert_eq!(lda.train_count, None);
    }

    #[test]
    fn test_ccf_command_requires_purity() {
        let result = Settings::try_parse_from([
            "clonality",
            "ccf",
            "--clinical",
            "clinical.tsv",
            "--segments",
            "segments.tsv",
            "--vcf",
            "a.vcf",
            "--driver-genes",
            "drivers.txt",
        ]);
        assert!(result.is_err());
    }
}
