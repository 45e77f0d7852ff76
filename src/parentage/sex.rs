use tracing::debug;

use crate::types::{AllelePair, Sex, TrioRow};

/// Infer offspring sex from its Y-chromosome calls.
///
/// The most frequent offspring allele pair decides: a real base call in its
/// first slot means male, the missing sentinel means female. When two pairs
/// are equally frequent, the one seen first in row order wins. No Y markers
/// at all means female.
pub fn infer_sex(y_rows: &[&TrioRow]) -> Sex {
    let Some((pair, count)) = most_frequent_pair(y_rows) else {
        return Sex::Female;
    };

    debug!(
        "Most frequent offspring Y genotype {} ({} of {} markers)",
        pair,
        count,
        y_rows.len()
    );

    if pair.first().is_missing() {
        Sex::Female
    } else {
        Sex::Male
    }
}

fn most_frequent_pair(rows: &[&TrioRow]) -> Option<(AllelePair, usize)> {
    // First-seen order is kept so ties resolve deterministically
    let mut counts: Vec<(AllelePair, usize)> = Vec::new();

    for row in rows {
        match counts.iter_mut().find(|(pair, _)| *pair == row.offspring) {
            Some((_, count)) => *count += 1,
            None => counts.push((row.offspring, 1)),
        }
    }

    counts.into_iter().fold(None, |best, (pair, count)| match best {
        Some((_, best_count)) if best_count >= count => best,
        _ => Some((pair, count)),
    })
}
