use std::io::BufRead;
use std::path::Path;
use tracing::debug;

use crate::parsers::{normalize_chromosome, open_file, sample_id_from_path, PanelParser, ParseError};
use crate::types::*;

/// TPED parser for transposed PLINK genotype files
///
/// Each line holds: chromosome, marker id, genetic distance, position and then
/// one allele pair per individual. The genetic distance is validated and
/// discarded.
pub struct TpedParser {
    sample_index: usize,
}

impl Default for TpedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TpedParser {
    pub fn new() -> Self {
        Self { sample_index: 0 }
    }

    /// Read the allele pair of the `index`-th individual (0-based)
    pub fn with_sample_index(sample_index: usize) -> Self {
        Self { sample_index }
    }

    pub fn parse(&self, path: &Path) -> Result<MarkerPanel, ParseError> {
        let reader = open_file(path)?;
        let markers = self.parse_reader(reader)?;

        debug!("Parsed {} markers from {}", markers.len(), path.display());

        Ok(MarkerPanel::new(sample_id_from_path(path), markers))
    }

    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<Vec<MarkerRecord>, ParseError> {
        let mut markers = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if let Some(marker) = self.parse_line(&line, i + 1)? {
                markers.push(marker);
            }
        }

        Ok(markers)
    }

    pub fn parse_str(&self, text: &str) -> Result<Vec<MarkerRecord>, ParseError> {
        self.parse_reader(text.as_bytes())
    }

    fn parse_line(&self, line: &str, line_number: usize) -> Result<Option<MarkerRecord>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 || (fields.len() - 4) % 2 != 0 {
            return Err(ParseError::FieldCount {
                line: line_number,
                found: fields.len(),
            });
        }

        let samples = (fields.len() - 4) / 2;
        if self.sample_index >= samples {
            return Err(ParseError::SampleIndex {
                line: line_number,
                index: self.sample_index,
                samples,
            });
        }

        let chromosome =
            normalize_chromosome(fields[0]).ok_or_else(|| ParseError::InvalidChromosome {
                line: line_number,
                value: fields[0].to_string(),
            })?;

        let marker_id = fields[1].to_string();

        fields[2]
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidDistance {
                line: line_number,
                value: fields[2].to_string(),
            })?;

        let position = fields[3]
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidPosition {
                line: line_number,
                value: fields[3].to_string(),
            })?;

        let allele_idx = 4 + self.sample_index * 2;
        let allele_1 = parse_allele(fields[allele_idx], line_number)?;
        let allele_2 = parse_allele(fields[allele_idx + 1], line_number)?;

        Ok(Some(MarkerRecord::new(
            chromosome, marker_id, position, allele_1, allele_2,
        )))
    }
}

fn parse_allele(token: &str, line_number: usize) -> Result<Allele, ParseError> {
    Allele::from_token(token).ok_or_else(|| ParseError::InvalidAllele {
        line: line_number,
        value: token.to_string(),
    })
}

impl PanelParser for TpedParser {
    fn parse(&self, path: &Path) -> Result<MarkerPanel, ParseError> {
        self.parse(path)
    }
}
