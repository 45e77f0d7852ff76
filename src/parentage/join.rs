use std::collections::HashMap;

use crate::types::{MarkerKey, MarkerRecord, TrioRow};

/// Inner join of the three panels on (chromosome, marker id, position).
///
/// Rows come out in offspring panel order. Markers missing from any panel are
/// dropped. If a parent panel repeats a key, its first occurrence is used.
pub fn join_trio(
    offspring: &[MarkerRecord],
    dam: &[MarkerRecord],
    sire: &[MarkerRecord],
) -> Vec<TrioRow> {
    if offspring.is_empty() || dam.is_empty() || sire.is_empty() {
        return Vec::new();
    }

    let dam_index = index_panel(dam);
    let sire_index = index_panel(sire);

    offspring
        .iter()
        .filter_map(|child| {
            let key = child.key();
            let dam_marker = dam_index.get(&key)?;
            let sire_marker = sire_index.get(&key)?;

            Some(TrioRow {
                chromosome: child.chromosome,
                marker_id: child.marker_id.clone(),
                position: child.position,
                offspring: child.alleles,
                dam: dam_marker.alleles,
                sire: sire_marker.alleles,
            })
        })
        .collect()
}

fn index_panel(panel: &[MarkerRecord]) -> HashMap<MarkerKey<'_>, &MarkerRecord> {
    let mut index = HashMap::with_capacity(panel.len());
    for marker in panel {
        index.entry(marker.key()).or_insert(marker);
    }
    index
}
