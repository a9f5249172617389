use std::fs;

use camino::Utf8Path;
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::domain::Library;
use crate::error::OraError;

pub const RESULTS_FILE_NAME: &str = "enrichment_results.csv";

/// One enriched category as reported by Enrichr.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentRecord {
    pub gene_set: String,
    pub term: String,
    pub overlap: String,
    pub p_value: f64,
    pub adjusted_p_value: f64,
    pub old_p_value: Option<f64>,
    pub old_adjusted_p_value: Option<f64>,
    pub odds_ratio: f64,
    pub combined_score: f64,
    pub genes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ExportRow {
    #[serde(rename = "Term")]
    term: String,
    #[serde(rename = "Overlap")]
    overlap: String,
    #[serde(rename = "P-value")]
    p_value: f64,
    #[serde(rename = "Adjusted P-value")]
    adjusted_p_value: f64,
    #[serde(rename = "Old P-value", default, deserialize_with = "csv::invalid_option")]
    old_p_value: Option<f64>,
    #[serde(
        rename = "Old Adjusted P-value",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    old_adjusted_p_value: Option<f64>,
    #[serde(rename = "Odds Ratio")]
    odds_ratio: f64,
    #[serde(rename = "Combined Score")]
    combined_score: f64,
    #[serde(rename = "Genes", default)]
    genes: String,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Gene_set")]
    gene_set: &'a str,
    #[serde(rename = "Term")]
    term: &'a str,
    #[serde(rename = "Overlap")]
    overlap: &'a str,
    #[serde(rename = "P-value")]
    p_value: f64,
    #[serde(rename = "Adjusted P-value")]
    adjusted_p_value: f64,
    #[serde(rename = "Old P-value")]
    old_p_value: Option<f64>,
    #[serde(rename = "Old Adjusted P-value")]
    old_adjusted_p_value: Option<f64>,
    #[serde(rename = "Odds Ratio")]
    odds_ratio: f64,
    #[serde(rename = "Combined Score")]
    combined_score: f64,
    #[serde(rename = "Genes")]
    genes: String,
}

impl<'a> From<&'a EnrichmentRecord> for CsvRow<'a> {
    fn from(value: &'a EnrichmentRecord) -> Self {
        Self {
            gene_set: &value.gene_set,
            term: &value.term,
            overlap: &value.overlap,
            p_value: value.p_value,
            adjusted_p_value: value.adjusted_p_value,
            old_p_value: value.old_p_value,
            old_adjusted_p_value: value.old_adjusted_p_value,
            odds_ratio: value.odds_ratio,
            combined_score: value.combined_score,
            genes: value.genes.join(";"),
        }
    }
}

const REQUIRED_EXPORT_COLUMNS: [&str; 2] = ["Term", "Adjusted P-value"];

/// Parses the tab-separated table returned by the Enrichr `export` endpoint.
pub fn parse_export(library: &Library, text: &str) -> Result<Vec<EnrichmentRecord>, OraError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|err| OraError::EnrichrPayload(format!("export for {library}: {err}")))?;
    if let Some(missing) = REQUIRED_EXPORT_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(OraError::EnrichrPayload(format!(
            "export for {library}: missing column `{missing}`"
        )));
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<ExportRow>() {
        let row = row.map_err(|err| {
            OraError::EnrichrPayload(format!("export for {library}: {err}"))
        })?;
        records.push(EnrichmentRecord {
            gene_set: library.to_string(),
            term: row.term,
            overlap: row.overlap,
            p_value: row.p_value,
            adjusted_p_value: row.adjusted_p_value,
            old_p_value: row.old_p_value,
            old_adjusted_p_value: row.old_adjusted_p_value,
            odds_ratio: row.odds_ratio,
            combined_score: row.combined_score,
            genes: row
                .genes
                .split(';')
                .map(str::trim)
                .filter(|gene| !gene.is_empty())
                .map(str::to_string)
                .collect(),
        });
    }
    Ok(records)
}

/// All records of one analysis, libraries in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultsTable {
    records: Vec<EnrichmentRecord>,
}

impl ResultsTable {
    pub fn new(records: Vec<EnrichmentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[EnrichmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by ascending adjusted p-value; ties keep table order.
    pub fn sorted_by_adjusted_p(&self) -> Vec<&EnrichmentRecord> {
        let mut sorted: Vec<&EnrichmentRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| a.adjusted_p_value.total_cmp(&b.adjusted_p_value));
        sorted
    }

    pub fn top(&self, n: usize) -> Vec<&EnrichmentRecord> {
        let mut sorted = self.sorted_by_adjusted_p();
        sorted.truncate(n);
        sorted
    }

    pub fn significant_count(&self, cutoff: f64) -> usize {
        self.records
            .iter()
            .filter(|record| record.adjusted_p_value <= cutoff)
            .count()
    }

    /// Writes the full table as CSV through a temp file in the target directory.
    pub fn write_csv(&self, path: &Utf8Path) -> Result<(), OraError> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| OraError::Filesystem(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix("kira-ora-results")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| OraError::Filesystem(err.to_string()))?;

        {
            let mut writer = WriterBuilder::new()
                .quote_style(QuoteStyle::Necessary)
                .from_writer(temp.as_file_mut());
            for record in &self.records {
                writer
                    .serialize(CsvRow::from(record))
                    .map_err(|err| OraError::Csv(err.to_string()))?;
            }
            if self.records.is_empty() {
                writer
                    .write_record(CSV_HEADER)
                    .map_err(|err| OraError::Csv(err.to_string()))?;
            }
            writer
                .flush()
                .map_err(|err| OraError::Csv(err.to_string()))?;
        }

        if path.as_std_path().exists() {
            fs::remove_file(path.as_std_path())
                .map_err(|err| OraError::Filesystem(err.to_string()))?;
        }
        temp.persist(path.as_std_path())
            .map_err(|err| OraError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

const CSV_HEADER: [&str; 10] = [
    "Gene_set",
    "Term",
    "Overlap",
    "P-value",
    "Adjusted P-value",
    "Old P-value",
    "Old Adjusted P-value",
    "Odds Ratio",
    "Combined Score",
    "Genes",
];
