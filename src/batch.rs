//! Trio sheets: CSV files listing many trios to verify in one run.
//!
//! ```text
//! trio_id,offspring,dam,sire
//! litter-7,pups/31220610301940.tped,31221010705445.tped,31220911009336.tped
//! ```
//!
//! Relative panel paths are resolved against the sheet's directory.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::parentage::Trio;
use crate::parsers::FileParser;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TrioSheetRow {
    pub trio_id: String,
    pub offspring: PathBuf,
    pub dam: PathBuf,
    pub sire: PathBuf,
}

pub fn read_trio_sheet(path: &Path) -> Result<Vec<TrioSheetRow>> {
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open trio sheet {}", path.display()))?;

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<TrioSheetRow>().enumerate() {
        let mut row =
            record.with_context(|| format!("Invalid trio sheet row {} in {}", i + 1, path.display()))?;
        row.offspring = base.join(&row.offspring);
        row.dam = base.join(&row.dam);
        row.sire = base.join(&row.sire);
        rows.push(row);
    }

    Ok(rows)
}

/// Parse the panels of one sheet row
pub fn load_trio(row: &TrioSheetRow, parser: &FileParser) -> Result<Trio> {
    let parse = |path: &Path| {
        parser
            .parse(path)
            .with_context(|| format!("Failed to parse panel {}", path.display()))
    };

    Ok(Trio::new(
        row.trio_id.clone(),
        parse(&row.offspring)?,
        parse(&row.dam)?,
        parse(&row.sire)?,
    ))
}

/// Load every trio in parallel. Trios whose panels fail to parse are logged
/// and left out; the rest are returned in sheet order.
pub fn load_trios(rows: &[TrioSheetRow], parser: &FileParser) -> Vec<Trio> {
    rows.par_iter()
        .filter_map(|row| match load_trio(row, parser) {
            Ok(trio) => Some(trio),
            Err(e) => {
                warn!("Skipping trio {}: {:#}", row.trio_id, e);
                None
            }
        })
        .collect()
}
