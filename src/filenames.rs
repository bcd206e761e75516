pub const FEATURE_TABLE_FILENAME: &str = "tumor.features.tsv";
pub const LDA_RESULTS_FILENAME: &str = "lda.results.json";
pub const RUN_STATS_FILENAME: &str = "run.stats.json";
pub const CCF_SETTINGS_FILENAME: &str = "ccf.settings.json";
pub const LDA_SETTINGS_FILENAME: &str = "lda.settings.json";
pub const LOG_FILENAME: &str = "clonality.log";
