//! Log setup shared by the ccf and lda commands
//!
//! Every message goes to stderr and to a log file in the command's output directory.
//!

use camino::Utf8Path;
use log::{LevelFilter, warn};

use crate::cli;
use crate::filenames::LOG_FILENAME;
use crate::globals::PROGRAM_NAME;
use crate::os_utils::create_dir_all;

fn get_log_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn setup_logger(log_filename: &Utf8Path, level: LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{PROGRAM_NAME}][{}] {message}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.level(),
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .chain(fern::log_file(log_filename)?)
        .apply()?;
    Ok(())
}

/// Check and create output directory, then setup logger to write there
///
/// # Arguments
/// * `clobber` - If true, allow an existing output directory to be reused
/// * `debug` - If true use debug log level, and info level otherwise
///
pub fn setup_output_dir_and_logger(output_dir: &Utf8Path, clobber: bool, debug: bool) {
    // No logger exists yet, so errors here follow the pre-logging pattern used in settings
    // validation
    let reused_output_dir = match cli::check_novel_dirname(output_dir, "Output directory") {
        Ok(_) => false,
        Err(msg) => {
            if !clobber {
                eprintln!("Invalid command-line setting: {msg}");
                std::process::exit(exitcode::USAGE);
            }
            true
        }
    };
    create_dir_all(output_dir, "output");

    let log_filename = output_dir.join(LOG_FILENAME);
    if let Err(e) = setup_logger(&log_filename, get_log_level(debug)) {
        eprintln!("Unable to setup logger at '{log_filename}': {e}");
        std::process::exit(exitcode::CANTCREAT);
    }

    if reused_output_dir {
        warn!("Reusing existing output directory '{output_dir}', earlier results may be overwritten");
    }
}
