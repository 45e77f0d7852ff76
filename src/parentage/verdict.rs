use serde::{Deserialize, Serialize};

use crate::types::Verdict;

/// Error-rate cut-offs used to grade a trio
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VerdictThresholds {
    /// Autosomal error rate below this is very strong evidence
    pub very_strong: f64,
    /// Autosomal error rate below this is strong evidence
    pub strong: f64,
    /// Mitochondrial and sex-chromosome rates below this rescue a trio to moderate
    pub supporting: f64,
    /// Fewer evaluated autosomal markers than this caps the verdict at weak.
    /// Zero disables the check.
    pub min_autosomal_markers: usize,
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            very_strong: 0.01,
            strong: 0.02,
            supporting: 0.02,
            min_autosomal_markers: 0,
        }
    }
}

/// Rates the verdict is computed from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorRates {
    pub autosomal: f64,
    pub mitochondrial: f64,
    pub sex_chromosome: f64,
    pub autosomal_markers: usize,
}

pub fn synthesize(rates: &ErrorRates, thresholds: &VerdictThresholds) -> Verdict {
    if rates.autosomal_markers < thresholds.min_autosomal_markers {
        return Verdict::Weak;
    }

    if rates.autosomal < thresholds.very_strong {
        Verdict::VeryStrong
    } else if rates.autosomal < thresholds.strong {
        Verdict::Strong
    } else if rates.mitochondrial < thresholds.supporting
        && rates.sex_chromosome < thresholds.supporting
    {
        Verdict::Moderate
    } else {
        Verdict::Weak
    }
}
