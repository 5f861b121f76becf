//! Scenario export
//!
//! Sealed scenarios serialize to:
//!
//! - **json**: one self-describing document that can be parsed back
//! - **csv**: manifest, nodes and edges tables, separated by blank lines
//! - **markdown**: the narrative plus an export metadata block (output only)
//!
//! Every format carries the artificial-data warning.

pub mod csv;
pub mod json;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Scenario, ARTIFICIAL_DATA_WARNING};
use crate::orchestrator::ForgeError;

pub use self::csv::CsvTables;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "markdown",
        }
    }

    /// File extension used by `write_to_dir`
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "md",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ForgeError;

    /// Case-insensitive; `md` is accepted for markdown
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(ForgeError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Serializes sealed scenarios
pub struct Exporter;

impl Exporter {
    /// Serialize a scenario in the given format
    ///
    /// # Example
    /// ```
    /// use scenario_forge_core_rs::{generate, ExportFormat};
    ///
    /// let scenario = generate("cross_chain_laundering", Some(42)).unwrap();
    /// let bytes = scenario.export("json".parse::<ExportFormat>().unwrap()).unwrap();
    /// let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    /// assert_eq!(doc["integrity_hash"], scenario.integrity_hash());
    /// ```
    pub fn export(scenario: &Scenario, format: ExportFormat) -> Result<Vec<u8>, ForgeError> {
        let bytes = match format {
            ExportFormat::Json => json::export(scenario)?,
            ExportFormat::Csv => csv::export(scenario)?,
            ExportFormat::Markdown => markdown(scenario).into_bytes(),
        };
        tracing::debug!(
            scenario_id = %scenario.scenario_id(),
            format = %format,
            bytes = bytes.len(),
            "exported scenario"
        );
        Ok(bytes)
    }

    /// Manifest, nodes and edges as separate CSV documents
    pub fn export_csv_tables(scenario: &Scenario) -> Result<CsvTables, ForgeError> {
        csv::tables(scenario)
    }

    /// Write the export into `dir`, returning the files created
    ///
    /// JSON and markdown produce `<scenario_id>.<ext>`; CSV produces
    /// `<scenario_id>_manifest.csv`, `_nodes.csv` and `_edges.csv`. The
    /// directory is created if missing.
    pub fn write_to_dir(
        scenario: &Scenario,
        dir: &Path,
        format: ExportFormat,
    ) -> Result<Vec<PathBuf>, ForgeError> {
        fs::create_dir_all(dir)?;
        let stem = scenario.scenario_id();

        let files: Vec<(PathBuf, Vec<u8>)> = match format {
            ExportFormat::Csv => {
                let tables = csv::tables(scenario)?;
                vec![
                    (dir.join(format!("{}_manifest.csv", stem)), tables.manifest),
                    (dir.join(format!("{}_nodes.csv", stem)), tables.nodes),
                    (dir.join(format!("{}_edges.csv", stem)), tables.edges),
                ]
            }
            other => {
                let path = dir.join(format!("{}.{}", stem, other.extension()));
                vec![(path, Self::export(scenario, other)?)]
            }
        };

        let mut written = Vec::with_capacity(files.len());
        for (path, bytes) in files {
            fs::write(&path, bytes)?;
            tracing::debug!(path = %path.display(), "wrote export file");
            written.push(path);
        }
        Ok(written)
    }
}

fn markdown(scenario: &Scenario) -> String {
    let provenance = scenario.provenance();
    format!(
        "{narrative}\n\n---\n\n## Export Metadata\n\n\
         - **Scenario ID:** `{id}`\n\
         - **Integrity Hash:** `{hash}`\n\
         - **Seed:** {seed}\n\
         - **Template Version:** {version}\n\
         - **Generated At:** {generated}\n\n\
         **WARNING:** {warning}\n",
        narrative = scenario.narrative(),
        id = scenario.scenario_id(),
        hash = scenario.integrity_hash(),
        seed = provenance.seed,
        version = provenance.template_version,
        generated = provenance.generated_at.to_rfc3339(),
        warning = ARTIFICIAL_DATA_WARNING,
    )
}
