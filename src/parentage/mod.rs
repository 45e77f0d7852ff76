//! Trio parentage verification.
//!
//! Panels are joined on marker identity, split by chromosome category,
//! scored against Mendelian inheritance rules and graded into a [`Verdict`].

pub mod classify;
pub mod join;
pub mod mendel;
pub mod sex;
pub mod verdict;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::types::*;

pub use classify::{classify, CategorizedRows};
pub use join::join_trio;
pub use mendel::evaluate;
pub use sex::infer_sex;
pub use verdict::{synthesize, ErrorRates, VerdictThresholds};

/// A proposed offspring / dam / sire trio
#[derive(Debug, Clone)]
pub struct Trio {
    pub id: String,
    pub offspring: MarkerPanel,
    pub dam: MarkerPanel,
    pub sire: MarkerPanel,
}

impl Trio {
    pub fn new(
        id: impl Into<String>,
        offspring: MarkerPanel,
        dam: MarkerPanel,
        sire: MarkerPanel,
    ) -> Self {
        Self {
            id: id.into(),
            offspring,
            dam,
            sire,
        }
    }
}

/// Parentage tester. Holds only configuration; every evaluation is independent.
pub struct ParentageTester {
    thresholds: VerdictThresholds,
}

impl Default for ParentageTester {
    fn default() -> Self {
        Self::new(VerdictThresholds::default())
    }
}

impl ParentageTester {
    pub fn new(thresholds: VerdictThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &VerdictThresholds {
        &self.thresholds
    }

    /// Evaluate many trios in parallel
    pub fn test_all(&self, trios: &[Trio]) -> Vec<ParentageReport> {
        trios.par_iter().map(|trio| self.test(trio)).collect()
    }

    pub fn test(&self, trio: &Trio) -> ParentageReport {
        let rows = join_trio(
            &trio.offspring.markers,
            &trio.dam.markers,
            &trio.sire.markers,
        );

        if rows.is_empty() {
            warn!(
                "Trio {}: no markers shared by offspring, dam and sire",
                trio.id
            );
        }

        let categorized = classify(&rows);
        debug!(
            "Trio {}: {} joined markers ({} autosomal, {} X, {} Y, {} MT, {} unused)",
            trio.id,
            rows.len(),
            categorized.autosomal.len(),
            categorized.x.len(),
            categorized.y.len(),
            categorized.mitochondrial.len(),
            categorized.unused
        );

        let sex = infer_sex(&categorized.y);

        let autosomal = evaluate(
            ChromosomeCategory::Autosomal,
            InheritanceRule::Autosomal,
            &categorized.autosomal,
        );
        let mitochondrial = evaluate(
            ChromosomeCategory::Mitochondrial,
            InheritanceRule::Maternal,
            &categorized.mitochondrial,
        );

        let (x, y, sex_chromosome_error_rate) = match sex {
            Sex::Male => {
                let y = evaluate(
                    ChromosomeCategory::Y,
                    InheritanceRule::YPaternal,
                    &categorized.y,
                );
                let x = evaluate(
                    ChromosomeCategory::X,
                    InheritanceRule::XMale,
                    &categorized.x,
                );
                let combined = (y.error_rate + x.error_rate) / 2.0;
                (x, Some(y), combined)
            }
            Sex::Female => {
                let x = evaluate(
                    ChromosomeCategory::X,
                    InheritanceRule::XFemale,
                    &categorized.x,
                );
                let rate = x.error_rate;
                (x, None, rate)
            }
        };

        let rates = ErrorRates {
            autosomal: autosomal.error_rate,
            mitochondrial: mitochondrial.error_rate,
            sex_chromosome: sex_chromosome_error_rate,
            autosomal_markers: autosomal.total_markers_evaluated,
        };

        if autosomal.total_markers_evaluated < self.thresholds.min_autosomal_markers {
            warn!(
                "Trio {}: only {} autosomal markers evaluated (minimum {})",
                trio.id, autosomal.total_markers_evaluated, self.thresholds.min_autosomal_markers
            );
        }

        let verdict = synthesize(&rates, &self.thresholds);

        info!(
            "Trio {}: {} offspring, autosomal error rate {:.4}, verdict: {}",
            trio.id, sex, autosomal.error_rate, verdict
        );

        ParentageReport {
            trio_id: trio.id.clone(),
            offspring_id: trio.offspring.sample_id.clone(),
            dam_id: trio.dam.sample_id.clone(),
            sire_id: trio.sire.sample_id.clone(),
            markers_joined: rows.len(),
            markers_unused: categorized.unused,
            offspring_sex: sex,
            autosomal,
            x,
            y,
            mitochondrial,
            sex_chromosome_error_rate,
            verdict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Allele::*;

    fn panel(id: &str, markers: Vec<MarkerRecord>) -> MarkerPanel {
        MarkerPanel::new(id, markers)
    }

    fn m(chr: u8, id: &str, a1: Allele, a2: Allele) -> MarkerRecord {
        MarkerRecord::new(chr, id, 1000, a1, a2)
    }

    /// `good` consistent autosomal markers followed by `bad` inconsistent ones
    fn autosomal_trio(good: usize, bad: usize) -> (Vec<MarkerRecord>, Vec<MarkerRecord>, Vec<MarkerRecord>) {
        let mut offspring = Vec::new();
        let mut dam = Vec::new();
        let mut sire = Vec::new();
        for i in 0..good + bad {
            let id = format!("snp{}", i);
            dam.push(m(1, &id, A, G));
            sire.push(m(1, &id, C, T));
            if i < good {
                offspring.push(m(1, &id, A, C));
            } else {
                offspring.push(m(1, &id, A, A));
            }
        }
        (offspring, dam, sire)
    }

    fn run(offspring: Vec<MarkerRecord>, dam: Vec<MarkerRecord>, sire: Vec<MarkerRecord>) -> ParentageReport {
        let trio = Trio::new("t", panel("o", offspring), panel("d", dam), panel("s", sire));
        ParentageTester::default().test(&trio)
    }

    #[test]
    fn test_empty_panels() {
        let report = run(vec![], vec![], vec![]);

        assert_eq!(report.markers_joined, 0);
        assert_eq!(report.autosomal.error_rate, 0.0);
        assert_eq!(report.x.error_rate, 0.0);
        assert_eq!(report.mitochondrial.error_rate, 0.0);
        assert_eq!(report.sex_chromosome_error_rate, 0.0);
        assert_eq!(report.offspring_sex, Sex::Female);
        assert!(report.y.is_none());
        assert_eq!(report.verdict, Verdict::VeryStrong);
    }

    #[test]
    fn test_all_consistent_is_very_strong() {
        let (o, d, s) = autosomal_trio(100, 0);
        let report = run(o, d, s);
        assert_eq!(report.autosomal.error_rate, 0.0);
        assert_eq!(report.verdict, Verdict::VeryStrong);
    }

    #[test]
    fn test_three_in_two_hundred_is_strong() {
        let (o, d, s) = autosomal_trio(197, 3);
        let report = run(o, d, s);
        assert_eq!(report.autosomal.total_markers_evaluated, 200);
        assert_eq!(report.autosomal.inconsistent_marker_count, 3);
        assert!((report.autosomal.error_rate - 0.015).abs() < 1e-12);
        assert_eq!(report.verdict, Verdict::Strong);
    }

    #[test]
    fn test_moderate_and_weak() {
        let (mut o, mut d, mut s) = autosomal_trio(95, 5);
        // Two clean mitochondrial markers
        for i in 0..2 {
            let id = format!("mt{}", i);
            o.push(m(42, &id, T, T));
            d.push(m(42, &id, T, T));
            s.push(m(42, &id, C, C));
        }
        let report = run(o.clone(), d.clone(), s.clone());
        assert!((report.autosomal.error_rate - 0.05).abs() < 1e-12);
        assert_eq!(report.mitochondrial.error_rate, 0.0);
        assert_eq!(report.sex_chromosome_error_rate, 0.0);
        assert_eq!(report.verdict, Verdict::Moderate);

        // Break one of the two mitochondrial markers
        let last = d.len() - 1;
        d[last] = m(42, "mt1", C, C);
        let report = run(o, d, s);
        assert_eq!(report.mitochondrial.error_rate, 0.5);
        assert_eq!(report.verdict, Verdict::Weak);
    }

    #[test]
    fn test_male_offspring_averages_x_and_y() {
        let (mut o, mut d, mut s) = autosomal_trio(90, 10);
        // Y: called in offspring -> male, one of two inconsistent with sire
        o.push(m(40, "y1", G, G));
        d.push(m(40, "y1", Missing, Missing));
        s.push(m(40, "y1", G, G));
        o.push(m(40, "y2", G, G));
        d.push(m(40, "y2", Missing, Missing));
        s.push(m(40, "y2", A, A));
        // X: one consistent marker (hemizygous call from the dam)
        o.push(m(39, "x1", C, C));
        d.push(m(39, "x1", A, C));
        s.push(m(39, "x1", T, T));

        let report = run(o, d, s);

        assert_eq!(report.offspring_sex, Sex::Male);
        let y = report.y.as_ref().expect("male offspring scores Y");
        assert_eq!(y.error_rate, 0.5);
        assert_eq!(report.x.rule, InheritanceRule::XMale);
        assert_eq!(report.x.error_rate, 0.0);
        assert_eq!(report.sex_chromosome_error_rate, 0.25);
        assert_eq!(report.verdict, Verdict::Weak);
    }

    #[test]
    fn test_female_offspring_uses_x_only() {
        let (mut o, mut d, mut s) = autosomal_trio(90, 10);
        o.push(m(40, "y1", Missing, Missing));
        d.push(m(40, "y1", Missing, Missing));
        s.push(m(40, "y1", G, G));
        o.push(m(39, "x1", A, C));
        d.push(m(39, "x1", A, A));
        s.push(m(39, "x1", C, C));

        let report = run(o, d, s);

        assert_eq!(report.offspring_sex, Sex::Female);
        assert!(report.y.is_none());
        assert_eq!(report.x.rule, InheritanceRule::XFemale);
        assert_eq!(report.sex_chromosome_error_rate, 0.0);
        assert_eq!(report.verdict, Verdict::Moderate);
        assert_eq!(report.category_results().len(), 3);
    }

    #[test]
    fn test_unmapped_markers_are_ignored() {
        let (mut o, mut d, mut s) = autosomal_trio(10, 0);
        o.push(m(41, "u1", A, A));
        d.push(m(41, "u1", C, C));
        s.push(m(41, "u1", G, G));

        let report = run(o, d, s);
        assert_eq!(report.markers_joined, 11);
        assert_eq!(report.markers_unused, 1);
        assert_eq!(report.autosomal.total_markers_evaluated, 10);
        assert_eq!(report.verdict, Verdict::VeryStrong);
    }

    #[test]
    fn test_join_fixture_is_inconsistent() {
        let report = run(
            vec![MarkerRecord::new(1, "m1", 100, A, A)],
            vec![MarkerRecord::new(1, "m1", 100, A, C)],
            vec![MarkerRecord::new(1, "m1", 100, C, C)],
        );
        assert_eq!(report.markers_joined, 1);
        assert_eq!(report.autosomal.inconsistent_marker_count, 1);
        assert_eq!(report.autosomal.error_rate, 1.0);
    }

    #[test]
    fn test_near_empty_join_with_minimum() {
        let (o, d, s) = autosomal_trio(3, 0);
        let trio = Trio::new("t", panel("o", o), panel("d", d), panel("s", s));

        let lenient = ParentageTester::default().test(&trio);
        assert_eq!(lenient.verdict, Verdict::VeryStrong);

        let strict = ParentageTester::new(VerdictThresholds {
            min_autosomal_markers: 100,
            ..VerdictThresholds::default()
        })
        .test(&trio);
        assert_eq!(strict.verdict, Verdict::Weak);
    }

    #[test]
    fn test_idempotent() {
        let (o, d, s) = autosomal_trio(150, 4);
        let trio = Trio::new("t", panel("o", o), panel("d", d), panel("s", s));
        let tester = ParentageTester::default();

        let first = tester.test(&trio);
        let second = tester.test(&trio);
        assert_eq!(first, second);
    }

    #[test]
    fn test_batch_matches_single() {
        let (o1, d1, s1) = autosomal_trio(100, 0);
        let (o2, d2, s2) = autosomal_trio(90, 10);
        let trios = vec![
            Trio::new("a", panel("o1", o1), panel("d1", d1), panel("s1", s1)),
            Trio::new("b", panel("o2", o2), panel("d2", d2), panel("s2", s2)),
        ];
        let tester = ParentageTester::default();

        let reports = tester.test_all(&trios);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].trio_id, "a");
        assert_eq!(reports[1].trio_id, "b");
        assert_eq!(reports[1], tester.test(&trios[1]));
    }
}
