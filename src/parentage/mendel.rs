//! Mendelian consistency rules per chromosome category.
//!
//! Each rule is a table of allele origins. A row is consistent when any entry
//! in its table holds; otherwise it counts as a Mendelian error.

use crate::types::{AllelePair, CategoryResult, ChromosomeCategory, InheritanceRule, TrioRow};

/// Which slot of each parent explains which offspring allele.
///
/// `from_dam` is the offspring slot inherited from the dam; the other
/// offspring slot is inherited from the sire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub from_dam: usize,
    pub dam_slot: usize,
    pub sire_slot: usize,
}

const fn origin(from_dam: usize, dam_slot: usize, sire_slot: usize) -> Origin {
    Origin {
        from_dam,
        dam_slot,
        sire_slot,
    }
}

/// Biparental inheritance: any offspring slot, any dam slot, any sire slot
pub const AUTOSOMAL_ORIGINS: [Origin; 8] = [
    origin(0, 0, 0),
    origin(0, 1, 0),
    origin(0, 0, 1),
    origin(0, 1, 1),
    origin(1, 0, 0),
    origin(1, 1, 0),
    origin(1, 0, 1),
    origin(1, 1, 1),
];

/// Daughters get the sire's single X, read from his first slot
pub const X_FEMALE_ORIGINS: [Origin; 4] = [
    origin(0, 0, 0),
    origin(0, 1, 0),
    origin(1, 0, 0),
    origin(1, 1, 0),
];

impl Origin {
    pub fn explains(&self, offspring: AllelePair, dam: AllelePair, sire: AllelePair) -> bool {
        let from_sire = 1 - self.from_dam;
        offspring.slot(self.from_dam) == dam.slot(self.dam_slot)
            && offspring.slot(from_sire) == sire.slot(self.sire_slot)
    }
}

fn explained_by_any(origins: &[Origin], row: &TrioRow) -> bool {
    origins
        .iter()
        .any(|o| o.explains(row.offspring, row.dam, row.sire))
}

pub fn autosomal_consistent(row: &TrioRow) -> bool {
    explained_by_any(&AUTOSOMAL_ORIGINS, row)
}

pub fn x_female_consistent(row: &TrioRow) -> bool {
    explained_by_any(&X_FEMALE_ORIGINS, row)
}

/// Males are hemizygous on X: only the first offspring slot is meaningful
pub fn x_male_consistent(row: &TrioRow) -> bool {
    let allele = row.offspring.first();
    allele == row.dam.first() || allele == row.dam.second()
}

pub fn y_consistent(row: &TrioRow) -> bool {
    row.offspring.first() == row.sire.first()
}

pub fn mitochondrial_consistent(row: &TrioRow) -> bool {
    row.offspring.first() == row.dam.first()
}

impl InheritanceRule {
    pub fn is_consistent(&self, row: &TrioRow) -> bool {
        match self {
            InheritanceRule::Autosomal => autosomal_consistent(row),
            InheritanceRule::XMale => x_male_consistent(row),
            InheritanceRule::XFemale => x_female_consistent(row),
            InheritanceRule::YPaternal => y_consistent(row),
            InheritanceRule::Maternal => mitochondrial_consistent(row),
        }
    }
}

/// Score a category's rows with the given rule
pub fn evaluate(
    category: ChromosomeCategory,
    rule: InheritanceRule,
    rows: &[&TrioRow],
) -> CategoryResult {
    let inconsistent = rows.iter().filter(|row| !rule.is_consistent(row)).count();
    CategoryResult::new(category, rule, rows.len(), inconsistent)
}
