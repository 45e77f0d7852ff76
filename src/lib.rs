//! # Canine Parentage
//!
//! Parentage verification for dog trios genotyped on SNP panels.
//!
//! ## Features
//!
//! - TPED marker panel parsing (plain, gzip, bzip2 or xz compressed)
//! - Trio join on (chromosome, marker, position)
//! - Mendelian error rates for autosomes, X, Y and mitochondria
//! - Offspring sex inference from Y-chromosome calls
//! - Qualitative parentage verdicts, single trio or parallel batches
//! - Locus / allele-call export for the relational store
//! - Zip upload intake
//! - JSON, CSV, TSV and HTML reports

pub mod archive;
pub mod batch;
pub mod config;
pub mod discovery;
pub mod loci;
pub mod output;
pub mod parentage;
pub mod parsers;
pub mod types;

// Re-export key types
pub use config::Settings;
pub use discovery::FileDiscovery;
pub use output::{ReportFormat, ReportGenerator};
pub use parentage::{ParentageTester, Trio, VerdictThresholds};
pub use parsers::{FileParser, ParseError, TpedParser};
pub use types::*;
