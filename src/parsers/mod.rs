use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

use crate::types::{MarkerPanel, MITOCHONDRIAL_CHROMOSOME, X_CHROMOSOME, Y_CHROMOSOME};

pub mod tped;

pub use tped::TpedParser;

/// Errors raised while reading a marker panel
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Line {line}: expected 4 + 2N fields with at least one allele pair, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("Line {line}: sample index {index} out of range ({samples} samples)")]
    SampleIndex {
        line: usize,
        index: usize,
        samples: usize,
    },

    #[error("Line {line}: invalid chromosome '{value}'")]
    InvalidChromosome { line: usize, value: String },

    #[error("Line {line}: invalid genetic distance '{value}'")]
    InvalidDistance { line: usize, value: String },

    #[error("Line {line}: invalid position '{value}'")]
    InvalidPosition { line: usize, value: String },

    #[error("Line {line}: invalid allele '{value}'")]
    InvalidAllele { line: usize, value: String },

    #[error("Unsupported panel file: {0}")]
    UnsupportedFormat(String),
}

/// Anything that can produce a marker panel from a path
pub trait PanelParser {
    fn parse(&self, path: &Path) -> Result<MarkerPanel, ParseError>;
}

/// Entry point choosing a parser from the file name
pub struct FileParser {
    sample_index: usize,
}

impl Default for FileParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FileParser {
    pub fn new() -> Self {
        Self { sample_index: 0 }
    }

    pub fn with_sample_index(sample_index: usize) -> Self {
        Self { sample_index }
    }

    pub fn parse(&self, path: &Path) -> Result<MarkerPanel, ParseError> {
        if !is_tped_path(path) {
            return Err(ParseError::UnsupportedFormat(path.display().to_string()));
        }
        TpedParser::with_sample_index(self.sample_index).parse(path)
    }
}

/// `.tped`, optionally followed by a compression suffix
pub fn is_tped_path(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let name = strip_compression_suffix(&name);
    name.ends_with(".tped")
}

fn strip_compression_suffix(name: &str) -> &str {
    for suffix in [".gz", ".bz2", ".xz"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            return stripped;
        }
    }
    name
}

/// Sample id from a panel file name: `dir/3122.tped.gz` -> `3122`
pub fn sample_id_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let lower = name.to_lowercase();
    let stem_len = strip_compression_suffix(&lower)
        .strip_suffix(".tped")
        .map(str::len)
        .unwrap_or_else(|| strip_compression_suffix(&lower).len());
    name.get(..stem_len).unwrap_or(name.as_str()).to_string()
}

/// Open a file for buffered reading, decompressing by extension
pub fn open_file(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let reader: Box<dyn Read> = match extension.as_str() {
        "gz" => Box::new(flate2::read::MultiGzDecoder::new(file)),
        "bz2" => Box::new(bzip2::read::BzDecoder::new(file)),
        "xz" => Box::new(xz2::read::XzDecoder::new(file)),
        _ => Box::new(file),
    };

    Ok(Box::new(BufReader::new(reader)))
}

/// Map a chromosome label to the dog numeric code
pub fn normalize_chromosome(value: &str) -> Option<u8> {
    let trimmed = value.trim();
    let without_prefix = trimmed
        .strip_prefix("chr")
        .or_else(|| trimmed.strip_prefix("Chr"))
        .or_else(|| trimmed.strip_prefix("CHR"))
        .unwrap_or(trimmed);

    match without_prefix.to_uppercase().as_str() {
        "X" => Some(X_CHROMOSOME),
        "Y" => Some(Y_CHROMOSOME),
        "MT" | "M" => Some(MITOCHONDRIAL_CHROMOSOME),
        other => other.parse().ok(),
    }
}
