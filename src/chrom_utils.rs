/// Convert a chromosome label to the form used for all internal lookups
///
/// Any "chr" prefix is removed, and the numeric sex chromosome codes 23 and 24 used in some
/// segmentation outputs are translated to X and Y.
///
pub fn normalize_chrom_name(chrom: &str) -> String {
    let chrom = chrom.strip_prefix("chr").unwrap_or(chrom);
    match chrom {
        "23" => "X".to_string(),
        "24" => "Y".to_string(),
        _ => chrom.to_string(),
    }
}

/// Reduce a sample barcode to the tumor id shared across all input tables
///
/// The tumor id is the first three dash-separated tokens, so that "TCGA-A3-3306-01A-01D" becomes
/// "TCGA-A3-3306". Shorter labels are returned unchanged.
///
pub fn normalize_tumor_id(label: &str) -> String {
    label.split('-').take(3).collect::<Vec<_>>().join("-")
}

/// Derive the tumor id from a per-tumor variant file path
///
pub fn tumor_id_from_filename(filename: &camino::Utf8Path) -> String {
    let basename = filename.file_name().unwrap_or(filename.as_str());
    let basename = basename.split('.').next().unwrap_or(basename);
    normalize_tumor_id(basename)
}
