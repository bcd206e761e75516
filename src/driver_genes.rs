use std::collections::HashSet;

use camino::Utf8Path;
use log::info;

use crate::os_utils::read_text_file;

/// Symbol of the gene tracked by the VHL-mutation flag
pub const VHL_GENE: &str = "VHL";

pub struct DriverGenes {
    genes: HashSet<String>,
}

impl DriverGenes {
    pub fn from_file(filename: &Utf8Path) -> Self {
        let label = "driver gene";
        info!("Reading {label} list from file '{filename}'");
        let driver_genes = Self::from_content(&read_text_file(filename, label));
        info!("Read {} driver genes", driver_genes.genes.len());
        driver_genes
    }

    /// Parse a newline-delimited list of gene symbols, skipping blank and '#' lines
    ///
    pub fn from_content(content: &str) -> Self {
        let genes = content
            .lines()
            .map(|x| x.trim())
            .filter(|x| !x.is_empty() && !x.starts_with('#'))
            .map(|x| x.to_string())
            .collect();
        Self { genes }
    }

    pub fn contains(&self, gene: &str) -> bool {
        self.genes.contains(gene)
    }
}
