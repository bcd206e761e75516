//! Run the ccf command, from input tables to the tumor feature table
//!

use std::collections::HashMap;
use std::sync::mpsc::channel;

use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thousands::Separable;

use crate::chrom_utils::tumor_id_from_filename;
use crate::cli::{CcfSettings, SharedSettings, write_ccf_settings};
use crate::clinical::{ClinicalRecord, read_clinical_file};
use crate::copy_number_segments::SegmentIndex;
use crate::driver_genes::DriverGenes;
use crate::feature_table::{TumorFeatureRow, ZeroRatioPolicy, write_feature_table};
use crate::mutation_burden::{
    CcfModelSettings, MutationBurden, TumorContext, aggregate_tumor_variants,
};
use crate::run_stats::{CcfRunStats, write_ccf_run_stats};
use crate::variant::{Variant, read_variant_file};

/// Read-only data shared by all tumor tasks
///
struct SharedTumorData<'a> {
    segments: &'a SegmentIndex,
    driver_genes: &'a DriverGenes,
    model_settings: CcfModelSettings,
    seed: u64,
    zero_ratio_policy: ZeroRatioPolicy,
}

struct TumorTask<'a> {
    /// Index of the tumor in the clinical table
    tumor_index: usize,
    clinical: &'a ClinicalRecord,
    vcf_filename: &'a Utf8Path,
}

struct TumorResult {
    tumor_index: usize,
    burden: MutationBurden,

    /// None if the tumor is excluded from the feature table
    row: Option<TumorFeatureRow>,

    variant_record_count: usize,
    malformed_variant_record_count: usize,
}

/// Per-tumor random source, independent of processing order and thread count
///
fn get_tumor_rng(seed: u64, tumor_index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(tumor_index as u64);
    rng
}

/// Map each tumor id to its variant file
///
/// Returns a 2-tuple of (map, duplicate_count)
///
fn get_vcf_filename_map(vcf_filenames: &[Utf8PathBuf]) -> (HashMap<String, &Utf8Path>, usize) {
    let mut vcf_map = HashMap::new();
    let mut duplicate_count = 0;
    for vcf_filename in vcf_filenames {
        let tumor_id = tumor_id_from_filename(vcf_filename);
        if let Some(previous) = vcf_map.get(&tumor_id) {
            warn!(
                "Ignoring variant file '{vcf_filename}', tumor id {tumor_id} already assigned to variant file '{previous}'"
            );
            duplicate_count += 1;
        } else {
            vcf_map.insert(tumor_id, vcf_filename.as_path());
        }
    }
    (vcf_map, duplicate_count)
}

/// Select the clinical table tumors with both copy number segments and a variant file
///
fn get_tumor_tasks<'a>(
    clinical_records: &'a [ClinicalRecord],
    segments: &SegmentIndex,
    vcf_map: &HashMap<String, &'a Utf8Path>,
    run_stats: &mut CcfRunStats,
) -> Vec<TumorTask<'a>> {
    let mut tasks = Vec::new();
    for (tumor_index, clinical) in clinical_records.iter().enumerate() {
        let tumor_id = clinical.tumor_id.as_str();
        if !segments.contains_tumor(tumor_id) {
            warn!("Skipping tumor {tumor_id}: no copy number segments");
            run_stats.tumor_stats.tumors_without_segments += 1;
            continue;
        }
        let Some(&vcf_filename) = vcf_map.get(tumor_id) else {
            warn!("Skipping tumor {tumor_id}: no variant file");
            run_stats.tumor_stats.tumors_without_variant_file += 1;
            continue;
        };
        tasks.push(TumorTask {
            tumor_index,
            clinical,
            vcf_filename,
        });
    }

    for (tumor_id, vcf_filename) in vcf_map.iter() {
        if !clinical_records.iter().any(|x| &x.tumor_id == tumor_id) {
            warn!("Variant file '{vcf_filename}' does not match any clinical table tumor id");
            run_stats.tumor_stats.unmatched_variant_file_count += 1;
        }
    }
    tasks
}

/// Summarize one tumor's variants into its feature table row
///
fn process_tumor_variants(
    tumor_index: usize,
    clinical: &ClinicalRecord,
    variants: &[Variant],
    shared_data: &SharedTumorData,
) -> (MutationBurden, Option<TumorFeatureRow>) {
    let tumor = TumorContext {
        tumor_id: &clinical.tumor_id,
        sex: clinical.sex,
        segments: shared_data.segments,
        driver_genes: shared_data.driver_genes,
    };
    let mut rng = get_tumor_rng(shared_data.seed, tumor_index);
    let burden =
        aggregate_tumor_variants(&tumor, &shared_data.model_settings, variants, &mut rng);
    let row = TumorFeatureRow::finalize(
        clinical.clone(),
        burden.clone(),
        shared_data.zero_ratio_policy,
    );
    (burden, row)
}

fn process_tumor(
    task: &TumorTask,
    annotation_key: &str,
    shared_data: &SharedTumorData,
) -> TumorResult {
    let tumor_variants = read_variant_file(task.vcf_filename, annotation_key);
    let (burden, row) = process_tumor_variants(
        task.tumor_index,
        task.clinical,
        &tumor_variants.variants,
        shared_data,
    );
    info!(
        "Tumor {}: {} PASS variants, {} nonsynonymous, {} drivers ({} clonal, {} subclonal)",
        task.clinical.tumor_id,
        burden.total_count,
        burden.nonsynonymous_count,
        burden.driver_count,
        burden.clonal_driver_count,
        burden.subclonal_driver_count
    );
    TumorResult {
        tumor_index: task.tumor_index,
        burden,
        row,
        variant_record_count: tumor_variants.variants.len(),
        malformed_variant_record_count: tumor_variants.malformed_count,
    }
}

/// Process all tumors on a worker pool, returning results in clinical table order
///
fn process_all_tumors(
    thread_count: usize,
    tasks: Vec<TumorTask>,
    annotation_key: &str,
    shared_data: &SharedTumorData,
) -> Vec<TumorResult> {
    let worker_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .unwrap();

    let (tx, rx) = channel();
    worker_pool.scope(move |scope| {
        for task in tasks {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let result = process_tumor(&task, annotation_key, shared_data);
                tx.send(result).unwrap();
            });
        }
    });

    let mut results = rx.into_iter().collect::<Vec<_>>();
    results.sort_by_key(|x| x.tumor_index);
    results
}

pub fn run_ccf(shared_settings: &SharedSettings, settings: &CcfSettings) {
    let output_dir = settings.output_dir.as_path();
    write_ccf_settings(output_dir, settings);

    let mut run_stats = CcfRunStats::default();

    let clinical_table = read_clinical_file(&settings.clinical_filename);
    run_stats.input_stats.clinical_tumor_count = clinical_table.records.len();
    run_stats.input_stats.malformed_clinical_record_count = clinical_table.malformed_count;

    let (segments, malformed_segment_count) =
        SegmentIndex::from_segment_file(&settings.segment_filename);
    run_stats.input_stats.segment_tumor_count = segments.tumor_count();
    run_stats.input_stats.malformed_segment_record_count = malformed_segment_count;

    let driver_genes = DriverGenes::from_file(&settings.driver_gene_filename);

    let (vcf_map, duplicate_vcf_count) = get_vcf_filename_map(&settings.vcf_filenames);
    run_stats.input_stats.variant_file_count = vcf_map.len();
    run_stats.tumor_stats.duplicate_variant_file_count = duplicate_vcf_count;

    let tasks = get_tumor_tasks(
        &clinical_table.records,
        &segments,
        &vcf_map,
        &mut run_stats,
    );
    info!("Processing {} tumors", tasks.len());

    let shared_data = SharedTumorData {
        segments: &segments,
        driver_genes: &driver_genes,
        model_settings: settings.get_ccf_model_settings(),
        seed: settings.seed,
        zero_ratio_policy: settings.zero_ratio_policy,
    };
    let results = process_all_tumors(
        shared_settings.thread_count,
        tasks,
        &settings.annotation_key,
        &shared_data,
    );

    let mut rows = Vec::new();
    for result in results {
        let input_stats = &mut run_stats.input_stats;
        input_stats.variant_record_count += result.variant_record_count;
        input_stats.malformed_variant_record_count += result.malformed_variant_record_count;

        let driver_stats = &mut run_stats.driver_stats;
        driver_stats.driver_variant_count += result.burden.driver_count;
        driver_stats.clonal_driver_count += result.burden.clonal_driver_count;
        driver_stats.subclonal_driver_count += result.burden.subclonal_driver_count;
        driver_stats.unclassified_driver_count += result.burden.unclassified_driver_count;

        run_stats.tumor_stats.processed_tumor_count += 1;
        match result.row {
            Some(row) => rows.push(row),
            None => run_stats.tumor_stats.zero_ratio_excluded_tumor_count += 1,
        }
    }
    run_stats.tumor_stats.feature_row_count = rows.len();

    info!(
        "Read {} variant records from {} variant files",
        run_stats
            .input_stats
            .variant_record_count
            .separate_with_commas(),
        run_stats.input_stats.variant_file_count
    );
    info!(
        "Classified {} driver variants: {} clonal, {} subclonal, {} unclassified",
        run_stats.driver_stats.driver_variant_count,
        run_stats.driver_stats.clonal_driver_count,
        run_stats.driver_stats.subclonal_driver_count,
        run_stats.driver_stats.unclassified_driver_count
    );

    write_feature_table(output_dir, &rows);
    write_ccf_run_stats(output_dir, &run_stats);
}
