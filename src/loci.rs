//! Normalised locus and allele-call records for the relational store.
//!
//! Records are written through a [`RecordSink`]; this crate ships CSV and
//! SQL-script sinks and leaves the database connection to the caller.

use anyhow::{Context, Result};
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::types::MarkerPanel;

/// Locus index ids advance in steps of eight per marker row
pub const LOCUS_INDEX_STRIDE: u64 = 8;

/// One row of `tbl_loci`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocusRecord {
    pub index_id: u64,
    pub chromosome: u8,
    pub locus_id: String,
    /// Physical position of the marker
    pub distance: u64,
}

/// One row of `tbl_alleles`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlleleRecord {
    pub dog_id: u64,
    pub source_id: u64,
    pub locus_index: u64,
    pub allele_1: char,
    pub allele_2: char,
}

fn locus_index(row: usize) -> u64 {
    (row as u64 + 1) * LOCUS_INDEX_STRIDE
}

pub fn build_loci(panel: &MarkerPanel) -> Vec<LocusRecord> {
    panel
        .markers
        .iter()
        .enumerate()
        .map(|(row, marker)| LocusRecord {
            index_id: locus_index(row),
            chromosome: marker.chromosome,
            locus_id: marker.marker_id.clone(),
            distance: marker.position,
        })
        .collect()
}

pub fn build_alleles(panel: &MarkerPanel, dog_id: u64, source_id: u64) -> Vec<AlleleRecord> {
    panel
        .markers
        .iter()
        .enumerate()
        .map(|(row, marker)| AlleleRecord {
            dog_id,
            source_id,
            locus_index: locus_index(row),
            allele_1: marker.alleles.first().as_char(),
            allele_2: marker.alleles.second().as_char(),
        })
        .collect()
}

/// Destination for normalised records
pub trait RecordSink {
    fn write_loci(&mut self, loci: &[LocusRecord]) -> Result<()>;
    fn write_alleles(&mut self, alleles: &[AlleleRecord]) -> Result<()>;
}

/// Writes `tbl_loci.csv` and `tbl_alleles.csv`
pub struct CsvSink {
    output_dir: PathBuf,
}

impl CsvSink {
    pub fn new(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    fn write_rows<T: Serialize>(&self, file_name: &str, rows: &[T]) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        let mut wtr = Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(path)
    }
}

impl RecordSink for CsvSink {
    fn write_loci(&mut self, loci: &[LocusRecord]) -> Result<()> {
        let path = self.write_rows("tbl_loci.csv", loci)?;
        info!("Wrote {} loci to {}", loci.len(), path.display());
        Ok(())
    }

    fn write_alleles(&mut self, alleles: &[AlleleRecord]) -> Result<()> {
        let path = self.write_rows("tbl_alleles.csv", alleles)?;
        info!("Wrote {} allele calls to {}", alleles.len(), path.display());
        Ok(())
    }
}

/// Writes `INSERT` scripts `tbl_loci.sql` and `tbl_alleles.sql`
pub struct SqlScriptSink {
    output_dir: PathBuf,
}

impl SqlScriptSink {
    pub fn new(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    fn create(&self, file_name: &str) -> Result<(PathBuf, BufWriter<File>)> {
        let path = self.output_dir.join(file_name);
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        Ok((path, BufWriter::new(file)))
    }
}

fn sql_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl RecordSink for SqlScriptSink {
    fn write_loci(&mut self, loci: &[LocusRecord]) -> Result<()> {
        let (path, mut out) = self.create("tbl_loci.sql")?;
        for locus in loci {
            writeln!(
                out,
                "INSERT INTO tbl_loci (indexID, chromossome, locusID, distance) VALUES ({}, {}, {}, {});",
                locus.index_id,
                locus.chromosome,
                sql_quote(&locus.locus_id),
                locus.distance
            )?;
        }
        out.flush()?;
        info!("Wrote {} loci to {}", loci.len(), path.display());
        Ok(())
    }

    fn write_alleles(&mut self, alleles: &[AlleleRecord]) -> Result<()> {
        let (path, mut out) = self.create("tbl_alleles.sql")?;
        for call in alleles {
            writeln!(
                out,
                "INSERT INTO tbl_alleles (dog, source, locus, allele1, allele2) VALUES ({}, {}, {}, '{}', '{}');",
                call.dog_id, call.source_id, call.locus_index, call.allele_1, call.allele_2
            )?;
        }
        out.flush()?;
        info!("Wrote {} allele calls to {}", alleles.len(), path.display());
        Ok(())
    }
}

/// Build both tables for a panel and hand them to the sink
pub fn export_panel(
    panel: &MarkerPanel,
    dog_id: u64,
    source_id: u64,
    sink: &mut dyn RecordSink,
) -> Result<()> {
    sink.write_loci(&build_loci(panel))?;
    sink.write_alleles(&build_alleles(panel, dog_id, source_id))?;
    Ok(())
}
