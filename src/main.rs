mod ccf;
mod ccf_pipeline;
mod chrom_utils;
mod cli;
mod clinical;
mod copy_number_segments;
mod driver_genes;
mod errors;
mod expected_copy_number;
mod feature_table;
mod filenames;
mod globals;
mod lda;
mod lda_pipeline;
mod logger;
mod mutation_burden;
mod os_utils;
mod run_stats;
mod variant;

use std::process;

use hhmmss::Hhmmss;
use log::{error, info};

use crate::ccf_pipeline::run_ccf;
use crate::cli::Commands;
use crate::globals::{PROGRAM_NAME, PROGRAM_VERSION};
use crate::lda_pipeline::run_lda;
use crate::logger::setup_output_dir_and_logger;

fn run(settings: &cli::Settings) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting {PROGRAM_NAME} {PROGRAM_VERSION}");
    info!(
        "cmdline: {}",
        std::env::args().collect::<Vec<_>>().join(" ")
    );
    info!("Running on {} threads", settings.shared.thread_count);

    let start = std::time::Instant::now();

    match &settings.command {
        Commands::Ccf(x) => {
            run_ccf(&settings.shared, x);
        }
        Commands::Lda(x) => {
            run_lda(x)?;
        }
    }

    info!(
        "{PROGRAM_NAME} completed. Total Runtime: {}",
        start.elapsed().hhmmssxxx()
    );
    Ok(())
}

fn main() {
    let settings = cli::validate_and_fix_settings(cli::parse_settings());

    // Setup logger, including creation of the output directory for the log file:
    setup_output_dir_and_logger(
        settings.get_output_dir(),
        settings.shared.clobber,
        settings.shared.debug,
    );

    if let Err(err) = run(&settings) {
        error!("{err}");
        process::exit(1);
    }
}
