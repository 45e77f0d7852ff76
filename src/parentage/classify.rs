use crate::types::{ChromosomeCategory, TrioRow};

/// Trio rows split by chromosome category. Rows borrow from the joined table.
#[derive(Debug, Default)]
pub struct CategorizedRows<'a> {
    pub autosomal: Vec<&'a TrioRow>,
    pub x: Vec<&'a TrioRow>,
    pub y: Vec<&'a TrioRow>,
    pub mitochondrial: Vec<&'a TrioRow>,
    /// Count of rows excluded from analysis (code 41 and unknown codes)
    pub unused: usize,
}

pub fn classify(rows: &[TrioRow]) -> CategorizedRows<'_> {
    let mut categorized = CategorizedRows::default();

    for row in rows {
        match row.category() {
            ChromosomeCategory::Autosomal => categorized.autosomal.push(row),
            ChromosomeCategory::X => categorized.x.push(row),
            ChromosomeCategory::Y => categorized.y.push(row),
            ChromosomeCategory::Mitochondrial => categorized.mitochondrial.push(row),
            ChromosomeCategory::Unused => categorized.unused += 1,
        }
    }

    categorized
}
