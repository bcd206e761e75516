//! Utilities pertaining to the filesystem
//!

use camino::Utf8Path;

/// Create a novel directory path if it does not exist already
///
/// If the directory already exists no operations are performed
///
/// * `label` - used to describe the error directory in an error message
///
pub fn create_dir_all(dir: &Utf8Path, label: &str) {
    if !dir.is_dir() {
        match std::fs::create_dir_all(dir) {
            Ok(_) => {}
            Err(e) => {
                panic!("Can't create new {label} directory at '{dir}': {e}");
            }
        }
    }
}

/// Read the full text content of a plain or bgzip/gzip compressed file
///
/// # Arguments
/// * `label` - Describes the file type in error messages
///
pub fn read_text_file(filename: &Utf8Path, label: &str) -> String {
    use rust_htslib::bgzf;
    use std::io::Read;
    use unwrap::unwrap;

    let mut reader = unwrap!(
        bgzf::Reader::from_path(filename),
        "Unable to open {label} file: '{filename}'"
    );

    let mut content = String::new();
    unwrap!(
        reader.read_to_string(&mut content),
        "Can't parse text from {label} file: '{filename}'"
    );
    content
}
