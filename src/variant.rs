//! Typed somatic variant records parsed from annotated VCF-like text
//!

use camino::Utf8Path;
use log::{info, warn};
use strum::EnumString;

use crate::chrom_utils::normalize_chrom_name;
use crate::errors::{ClonalityError, ClonalityResult};
use crate::os_utils::read_text_file;

/// Default name of the INFO entry holding the pipe-delimited consequence annotation
pub const DEFAULT_ANNOTATION_KEY: &str = "CSQ";

/// Zero-indexed position of the consequence term within one pipe-delimited annotation
const ANNOTATION_CONSEQUENCE_INDEX: usize = 1;

/// Zero-indexed position of the gene symbol within one pipe-delimited annotation
const ANNOTATION_GENE_INDEX: usize = 3;

/// Sequence ontology consequence terms treated as nonsynonymous
///
#[derive(Clone, Copy, Debug, EnumString, Eq, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum NonsynonymousConsequence {
    FrameshiftVariant,
    MissenseVariant,
    SpliceAcceptorVariant,
    SpliceRegionVariant,
    StopGained,
    InframeDeletion,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    /// Normalized chromosome name
    pub chrom: String,

    /// 1-indexed position
    pub pos: i64,

    pub is_pass: bool,

    /// Consequence annotation, possibly several '&'-joined terms
    pub consequence: String,
    pub gene: String,
    pub mutant_count: u32,
    pub wild_type_count: u32,
}

impl Variant {
    /// Return true if any consequence term of this variant is nonsynonymous
    ///
    pub fn is_nonsynonymous(&self) -> bool {
        self.consequence
            .split('&')
            .any(|x| x.parse::<NonsynonymousConsequence>().is_ok())
    }
}

/// Result of reading all variant records of one tumor
///
pub struct TumorVariants {
    pub variants: Vec<Variant>,
    pub malformed_count: usize,
}

/// Read the variants of one tumor from a plain or compressed VCF-like file
///
pub fn read_variant_file(filename: &Utf8Path, annotation_key: &str) -> TumorVariants {
    let content = read_text_file(filename, "variant");
    let tumor_variants = parse_variant_content(&content, annotation_key, filename.as_str());
    info!(
        "Read {} variant records from file '{filename}'",
        tumor_variants.variants.len()
    );
    tumor_variants
}

/// Parse variant records from VCF-like content
///
/// Header lines are skipped. Malformed records are reported as warnings and skipped.
///
/// # Arguments
/// * `source_label` - Used in warning messages to identify the input
///
pub fn parse_variant_content(
    content: &str,
    annotation_key: &str,
    source_label: &str,
) -> TumorVariants {
    let mut variants = Vec::new();
    let mut malformed_count = 0;
    for (line_index, line) in content.lines().enumerate() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_variant_line(line, line_index + 1, annotation_key) {
            Ok(x) => variants.push(x),
            Err(e) => {
                warn!("{e} in file '{source_label}'");
                malformed_count += 1;
            }
        }
    }
    TumorVariants {
        variants,
        malformed_count,
    }
}

/// Find the value of `key` in a VCF INFO column
///
fn get_info_value<'a>(info: &'a str, key: &str) -> Option<&'a str> {
    info.split(';').find_map(|entry| {
        let (entry_key, value) = entry.split_once('=')?;
        (entry_key == key).then_some(value)
    })
}

/// Parse the (wild_type, mutant) counts from the AD entry of the sample column
///
fn parse_allele_depths(format: &str, sample: &str) -> Option<(u32, u32)> {
    let ad_index = format.split(':').position(|x| x == "AD")?;
    let ad = sample.split(':').nth(ad_index)?;
    let mut counts = ad.split(',').map(|x| x.parse::<u32>());
    let wild_type_count = counts.next()?.ok()?;
    let mutant_count = counts.next()?.ok()?;
    Some((wild_type_count, mutant_count))
}

fn parse_variant_line(
    line: &str,
    line_number: usize,
    annotation_key: &str,
) -> ClonalityResult<Variant> {
    let label = "variant";
    let words = line.split('\t').collect::<Vec<_>>();
    if words.len() < 10 {
        return Err(ClonalityError::malformed(
            label,
            line_number,
            format!("expected at least 10 columns, found {}", words.len()),
        ));
    }

    let pos = words[1].parse::<i64>().map_err(|_| {
        ClonalityError::malformed(
            label,
            line_number,
            format!("can't parse position '{}'", words[1]),
        )
    })?;

    let annotation = get_info_value(words[7], annotation_key).ok_or_else(|| {
        ClonalityError::malformed(
            label,
            line_number,
            format!("no '{annotation_key}' annotation in INFO column"),
        )
    })?;

    // Only the first annotation is used when several are listed
    let annotation = annotation.split(',').next().unwrap_or(annotation);
    let fields = annotation.split('|').collect::<Vec<_>>();
    if fields.len() <= ANNOTATION_GENE_INDEX {
        return Err(ClonalityError::malformed(
            label,
            line_number,
            format!("too few fields in annotation '{annotation}'"),
        ));
    }

    let (wild_type_count, mutant_count) = parse_allele_depths(words[8], words[words.len() - 1])
        .ok_or_else(|| {
            ClonalityError::malformed(
                label,
                line_number,
                "can't parse allele depths from AD sample field",
            )
        })?;

    Ok(Variant {
        chrom: normalize_chrom_name(words[0]),
        pos,
        is_pass: words[6] == "PASS",
        consequence: fields[ANNOTATION_CONSEQUENCE_INDEX].to_string(),
        gene: fields[ANNOTATION_GENE_INDEX].to_string(),
        mutant_count,
        wild_type_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VCF_CONTENT: &str = "\
##fileformat=VCFv4.2
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tTUMOR
chr3\t10183800\t.\tC\tT\t.\tPASS\tDP=40;CSQ=T|missense_variant|MODERATE|VHL|ENSG1,T|intron_variant|MODIFIER|X1|ENSG2\tGT:AD\t0/1:12,8
chr1\t1000\t.\tA\tG\t.\tLowQual\tCSQ=G|synonymous_variant|LOW|ABC|ENSG3\tGT:AD:DP\t0/1:30,3:33
chrX\t5000\t.\tA\tG\t.\tPASS\tCSQ=G|splice_region_variant&intron_variant|LOW|KDM5C|ENSG4\tAD:GT\t20,20:0/1
";

    #[test]
    fn test_parse_variant_content() {
        let result = parse_variant_content(VCF_CONTENT, DEFAULT_ANNOTATION_KEY, "test");
        assert_eq!(result.malformed_count, 0);
        assert_eq!(result.variants.len(), 3);

        let v = &result.variants[0];
        assert_eq!(v.chrom, "3");
        assert_eq!(v.pos, 10183800);
        assert!(v.is_pass);
        assert_eq!(v.consequence, "missense_variant");
        assert_eq!(v.gene, "VHL");
        assert_eq!(v.wild_type_count, 12);
        assert_eq!(v.mutant_count, 8);
        assert!(v.is_nonsynonymous());

        let v = &result.variants[1];
        assert!(!v.is_pass);
        assert_eq!((v.wild_type_count, v.mutant_count), (30, 3));
        assert!(!v.is_nonsynonymous());

        let v = &result.variants[2];
        assert_eq!(v.chrom, "X");
        assert_eq!((v.wild_type_count, v.mutant_count), (20, 20));
        assert!(v.is_nonsynonymous());
    }

    #[test]
    fn test_malformed_variant_records() {
        let content = "\
chr1\t1000\t.\tA\tG\t.\tPASS\tCSQ=G|missense_variant|LOW|ABC\tGT:AD\t0/1:3,4
chr1\tabc\t.\tA\tG\t.\tPASS\tCSQ=G|missense_variant|LOW|ABC\tGT:AD\t0/1:3,4
chr1\t1000\t.\tA\tG\t.\tPASS\tDP=4\tGT:AD\t0/1:3,4
chr1\t1000\t.\tA\tG\t.\tPASS\tCSQ=G|missense_variant\tGT:AD\t0/1:3,4
chr1\t1000\t.\tA\tG\t.\tPASS\tCSQ=G|missense_variant|LOW|ABC\tGT:DP\t0/1:7
chr1\t1000\t.\tA\tG
";
        let result = parse_variant_content(content, DEFAULT_ANNOTATION_KEY, "test");
        assert_eq!(result.variants.len(), 1);
        assert_eq!(result.malformed_count, 5);
    }

    #[test]
    fn test_alternate_annotation_key() {
        let content =
            "1\t1000\t.\tA\tG\t.\tPASS\tANN=G|stop_gained|HIGH|TP53|x\tGT:AD\t0/1:3,4\n";
        let result = parse_variant_content(content, "ANN", "test");
        assert_eq!(result.variants.len(), 1);
        assert_eq!(result.variants[0].gene, "TP53");

        let result = parse_variant_content(content, DEFAULT_ANNOTATION_KEY, "test");
        assert_eq!(result.malformed_count, 1);
    }

    #[test]
    fn test_nonsynonymous_terms() {
        for (term, expected) in [
            ("frameshift_variant", true),
            ("missense_variant", true),
            ("splice_acceptor_variant", true),
            ("splice_region_variant", true),
            ("stop_gained", true),
            ("inframe_deletion", true),
            ("inframe_insertion", false),
            ("synonymous_variant", false),
            ("intron_variant&stop_gained", true),
        ] {
            let v = Variant {
                chrom: "1".to_string(),
                pos: 1,
                is_pass: true,
                consequence: term.to_string(),
                gene: "A".to_string(),
                mutant_count: 1,
                wild_type_count: 1,
            };
            assert_eq!(v.is_nonsynonymous(), expected, "{term}");
        }
    }
}
