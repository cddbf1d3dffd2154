//! JSON and CSV/TSV dataset readers.
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;
use serde::Deserialize;

use crate::data_handling::{Dataset, Sample};

/// Configuration for reading delimited text datasets.
#[derive(Debug, Clone)]
pub struct DatasetReaderConfig {
    /// Column holding the raw text.
    pub input_column: String,
    /// Column holding the category label.
    pub output_column: String,
    pub delimiter: u8,
    /// Fixed category list. When `None`, categories are inferred in order of
    /// first appearance.
    pub categories: Option<Vec<String>>,
}

impl Default for DatasetReaderConfig {
    fn default() -> Self {
        Self {
            input_column: "input".to_string(),
            output_column: "output".to_string(),
            delimiter: b',',
            categories: None,
        }
    }
}

/// Accepted JSON layouts: a bare sample array, or an object carrying an
/// explicit category list.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDataset {
    Samples(Vec<Sample>),
    WithCategories {
        categories: Vec<String>,
        samples: Vec<Sample>,
    },
}

fn build_dataset(samples: Vec<Sample>, categories: Option<Vec<String>>) -> Result<Dataset> {
    match categories {
        Some(categories) => Ok(Dataset::new(samples, categories)?),
        None => Ok(Dataset::from_samples(samples)),
    }
}

/// Read a dataset, choosing the format from the file extension
/// (`.json`, `.csv` or `.tsv`).
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => read_json(path),
        Some("csv") => read_delimited(path, b','),
        Some("tsv") => read_delimited(path, b'\t'),
        _ => Err(anyhow!(
            "Unsupported dataset format: {} (expected .json, .csv or .tsv)",
            path.as_ref().display()
        )),
    }
}

pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read dataset: {}", path.as_ref().display()))?;
    let parsed: JsonDataset = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse dataset: {}", path.as_ref().display()))?;

    match parsed {
        JsonDataset::Samples(samples) => build_dataset(samples, None),
        JsonDataset::WithCategories {
            categories,
            samples,
        } => build_dataset(samples, Some(categories)),
    }
}

pub fn read_delimited<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Dataset> {
    let config = DatasetReaderConfig {
        delimiter,
        ..DatasetReaderConfig::default()
    };
    read_delimited_with_config(path, &config)
}

/// Read a delimited file with a header row using a custom configuration.
pub fn read_delimited_with_config<P: AsRef<Path>>(
    path: P,
    config: &DatasetReaderConfig,
) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open dataset: {}", path.as_ref().display()))?;

    let headers = reader
        .headers()
        .context("Failed to read dataset header row")?
        .clone();

    let input_idx = find_column(&headers, &config.input_column)
        .ok_or_else(|| anyhow!("Missing input column '{}'", config.input_column))?;
    let output_idx = find_column(&headers, &config.output_column)
        .ok_or_else(|| anyhow!("Missing output column '{}'", config.output_column))?;

    let mut samples = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        let input = record
            .get(input_idx)
            .ok_or_else(|| anyhow!("Missing input value at row {}", row_idx + 1))?;
        let output = record
            .get(output_idx)
            .ok_or_else(|| anyhow!("Missing output value at row {}", row_idx + 1))?
            .trim();
        if output.is_empty() {
            return Err(anyhow!("Empty output label at row {}", row_idx + 1));
        }
        samples.push(Sample::new(input, output));
    }

    build_dataset(samples, config.categories.clone())
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}
