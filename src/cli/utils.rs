use camino::Utf8Path;
use serde::Serialize;
use simple_error::{SimpleResult, bail};
use unwrap::unwrap;

/// Check a required input filename
///
/// Assumes no logger has been configured yet
///
pub fn check_required_filename(filename: &Utf8Path, label: &str) -> SimpleResult<()> {
    if filename.as_str().is_empty() {
        bail!("Must specify {label} file");
    }
    if !filename.exists() {
        bail!("Can't find specified {label} file: '{filename}'");
    }
    if !filename.is_file() {
        bail!("Specified {label} file path does not appear to be a file: '{filename}'");
    }
    Ok(())
}

/// Write command settings out in json format
///
/// # Arguments
/// * `label` - Command name used in log and error messages
///
pub fn write_settings<T: Serialize>(
    output_dir: &Utf8Path,
    settings_filename: &str,
    label: &str,
    settings: &T,
) {
    use log::info;

    let filename = output_dir.join(settings_filename);

    info!("Writing {label} settings to file: '{filename}'");

    let f = unwrap!(
        std::fs::File::create(&filename),
        "Unable to create {label} settings json file: '{filename}'"
    );

    serde_json::to_writer_pretty(&f, &settings).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_required_filename() {
        assert!(check_required_filename(Utf8Path::new(""), "clinical").is_err());
        assert!(check_required_filename(Utf8Path::new("./not_there.tsv"), "clinical").is_err());
        assert!(check_required_filename(Utf8Path::new("src"), "clinical").is_err());
        assert!(check_required_filename(Utf8Path::new("Cargo.toml"), "clinical").is_ok());
    }
}
