use serde::{Deserialize, Serialize};
use std::fmt;

/// Dog chromosome codes as used by the genotyping panels
pub const LAST_AUTOSOME: u8 = 38;
pub const X_CHROMOSOME: u8 = 39;
pub const Y_CHROMOSOME: u8 = 40;
pub const UNMAPPED_CHROMOSOME: u8 = 41;
pub const MITOCHONDRIAL_CHROMOSOME: u8 = 42;

/// A single base call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Allele {
    A,
    C,
    G,
    T,
    Missing, // 0
}

impl Allele {
    /// Parse a TPED allele token. Accepts letters and PLINK 1/2/3/4 coding.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "A" | "a" | "1" => Some(Allele::A),
            "C" | "c" | "2" => Some(Allele::C),
            "G" | "g" | "3" => Some(Allele::G),
            "T" | "t" | "4" => Some(Allele::T),
            "0" => Some(Allele::Missing),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Allele::Missing)
    }

    pub fn as_char(&self) -> char {
        match self {
            Allele::A => 'A',
            Allele::C => 'C',
            Allele::G => 'G',
            Allele::T => 'T',
            Allele::Missing => '0',
        }
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Unordered biologically, but kept in file order because the inheritance
/// rules look at each slot explicitly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AllelePair(pub Allele, pub Allele);

impl AllelePair {
    pub fn new(first: Allele, second: Allele) -> Self {
        Self(first, second)
    }

    pub fn first(&self) -> Allele {
        self.0
    }

    pub fn second(&self) -> Allele {
        self.1
    }

    /// Alleles by slot index (0 or 1)
    pub fn slot(&self, index: usize) -> Allele {
        if index == 0 {
            self.0
        } else {
            self.1
        }
    }
}

impl fmt::Display for AllelePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

/// Chromosome category derived from the numeric chromosome code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ChromosomeCategory {
    Autosomal,
    X,
    Y,
    Mitochondrial,
    Unused,
}

impl ChromosomeCategory {
    /// 1-38 autosomes, 39 X, 40 Y, 42 MT. Code 41 and anything outside the
    /// known range is unused.
    pub fn from_code(code: u8) -> Self {
        match code {
            1..=LAST_AUTOSOME => ChromosomeCategory::Autosomal,
            X_CHROMOSOME => ChromosomeCategory::X,
            Y_CHROMOSOME => ChromosomeCategory::Y,
            MITOCHONDRIAL_CHROMOSOME => ChromosomeCategory::Mitochondrial,
            _ => ChromosomeCategory::Unused,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChromosomeCategory::Autosomal => "autosomal",
            ChromosomeCategory::X => "X",
            ChromosomeCategory::Y => "Y",
            ChromosomeCategory::Mitochondrial => "mitochondrial",
            ChromosomeCategory::Unused => "unused",
        }
    }
}

impl fmt::Display for ChromosomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of an individual's marker panel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkerRecord {
    pub chromosome: u8,
    pub marker_id: String,
    pub position: u64,
    pub alleles: AllelePair,
}

impl MarkerRecord {
    pub fn new(
        chromosome: u8,
        marker_id: impl Into<String>,
        position: u64,
        allele_1: Allele,
        allele_2: Allele,
    ) -> Self {
        Self {
            chromosome,
            marker_id: marker_id.into(),
            position,
            alleles: AllelePair::new(allele_1, allele_2),
        }
    }

    pub fn key(&self) -> MarkerKey<'_> {
        MarkerKey {
            chromosome: self.chromosome,
            marker_id: &self.marker_id,
            position: self.position,
        }
    }

    pub fn category(&self) -> ChromosomeCategory {
        ChromosomeCategory::from_code(self.chromosome)
    }
}

/// Identity of a physical marker across individuals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerKey<'a> {
    pub chromosome: u8,
    pub marker_id: &'a str,
    pub position: u64,
}

/// All markers for one individual, in file order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkerPanel {
    pub sample_id: String,
    pub markers: Vec<MarkerRecord>,
}

impl MarkerPanel {
    pub fn new(sample_id: impl Into<String>, markers: Vec<MarkerRecord>) -> Self {
        Self {
            sample_id: sample_id.into(),
            markers,
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// A marker present in the offspring, dam and sire panels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrioRow {
    pub chromosome: u8,
    pub marker_id: String,
    pub position: u64,
    pub offspring: AllelePair,
    pub dam: AllelePair,
    pub sire: AllelePair,
}

impl TrioRow {
    pub fn category(&self) -> ChromosomeCategory {
        ChromosomeCategory::from_code(self.chromosome)
    }
}

/// Genetic sex of the offspring as inferred from Y markers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => f.write_str("male"),
            Sex::Female => f.write_str("female"),
        }
    }
}

/// Which inheritance rule a category result was scored with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InheritanceRule {
    Autosomal,
    XMale,
    XFemale,
    YPaternal,
    Maternal,
}

/// Mendelian error summary for one chromosome category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryResult {
    pub category: ChromosomeCategory,
    pub rule: InheritanceRule,
    pub total_markers_evaluated: usize,
    pub inconsistent_marker_count: usize,
    pub error_rate: f64,
}

impl CategoryResult {
    pub fn new(
        category: ChromosomeCategory,
        rule: InheritanceRule,
        total_markers_evaluated: usize,
        inconsistent_marker_count: usize,
    ) -> Self {
        let error_rate = if total_markers_evaluated > 0 {
            inconsistent_marker_count as f64 / total_markers_evaluated as f64
        } else {
            0.0
        };

        Self {
            category,
            rule,
            total_markers_evaluated,
            inconsistent_marker_count,
            error_rate,
        }
    }
}

/// Qualitative parentage verdict, strongest first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verdict {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
}

impl Verdict {
    pub fn description(&self) -> &'static str {
        match self {
            Verdict::VeryStrong => "Very strong evidence of parentage",
            Verdict::Strong => "Strong evidence of parentage",
            Verdict::Moderate => "Moderate evidence of parentage",
            Verdict::Weak => "Weak evidence of parentage",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Full outcome of one trio evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParentageReport {
    pub trio_id: String,
    pub offspring_id: String,
    pub dam_id: String,
    pub sire_id: String,
    pub markers_joined: usize,
    pub markers_unused: usize,
    pub offspring_sex: Sex,
    pub autosomal: CategoryResult,
    pub x: CategoryResult,
    /// Only scored for male offspring
    pub y: Option<CategoryResult>,
    pub mitochondrial: CategoryResult,
    pub sex_chromosome_error_rate: f64,
    pub verdict: Verdict,
}

impl ParentageReport {
    pub fn category_results(&self) -> Vec<&CategoryResult> {
        let mut results = vec![&self.autosomal, &self.x];
        if let Some(y) = &self.y {
            results.push(y);
        }
        results.push(&self.mitochondrial);
        results
    }
}
