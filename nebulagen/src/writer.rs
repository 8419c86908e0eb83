use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::batch::{BatchContent, EmissionBatch};
use crate::config::OutputConfig;
use crate::errors::Result;

/// Persists emission batches under an output root, one file per batch.
///
/// Each file is fully written and closed before the next one is opened.
/// Existing files are overwritten.
pub struct BatchWriter {
    config: OutputConfig,
}

impl BatchWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn write(&self, batch: &EmissionBatch) -> Result<PathBuf> {
        let dir = self.config.group_dir(batch.unit.group);
        fs::create_dir_all(dir)?;
        let path = batch.unit.path_in(dir);

        match &batch.content {
            BatchContent::Statements(statements) => save_statements(statements, &path)?,
            BatchContent::Table { header, rows } => save_table(header, rows, &path)?,
        }

        log::debug!("Wrote {:?} ({} records)", path, batch.data_count());
        Ok(path)
    }

    pub fn write_all(&self, batches: &[EmissionBatch]) -> Result<Vec<PathBuf>> {
        let paths = batches
            .iter()
            .map(|batch| self.write(batch))
            .collect::<Result<Vec<_>>>()?;
        log::info!(
            "Wrote {} files under {:?}",
            paths.len(),
            self.config.output_dir
        );
        Ok(paths)
    }
}

/// Saves nGQL statements, one per line.
fn save_statements(statements: &[String], path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    for statement in statements {
        writeln!(file, "{}", statement)?;
    }
    file.flush()?;
    Ok(())
}

/// Saves a header row and data rows in CSV format.
fn save_table(header: &[String], rows: &[Vec<String>], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
