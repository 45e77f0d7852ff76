use anyhow::{Context, Result};
use chrono::Local;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use serde_json::to_string_pretty;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::types::*;

/// Supported report formats
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
    Tsv,
    Html,
    All,
}

const COLUMNS: [&str; 18] = [
    "trio_id",
    "offspring_id",
    "dam_id",
    "sire_id",
    "offspring_sex",
    "markers_joined",
    "markers_unused",
    "autosomal_markers",
    "autosomal_errors",
    "autosomal_error_rate",
    "x_markers",
    "x_errors",
    "x_error_rate",
    "y_error_rate",
    "mitochondrial_markers",
    "mitochondrial_error_rate",
    "sex_chromosome_error_rate",
    "verdict",
];

/// Report generator for parentage results
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: &Path) -> Result<Self> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;
        }

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Generate reports in the requested format(s), returning the files written
    pub fn generate(&self, reports: &[ParentageReport], format: ReportFormat) -> Result<Vec<PathBuf>> {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let mut written = Vec::new();

        let formats: &[ReportFormat] = match format {
            ReportFormat::All => &[
                ReportFormat::Json,
                ReportFormat::Csv,
                ReportFormat::Tsv,
                ReportFormat::Html,
            ],
            ref single => std::slice::from_ref(single),
        };

        for format in formats {
            let path = match format {
                ReportFormat::Json => self.generate_json_report(reports, &timestamp)?,
                ReportFormat::Csv => {
                    self.generate_delimited_report(reports, &timestamp, b',', "csv")?
                }
                ReportFormat::Tsv => {
                    self.generate_delimited_report(reports, &timestamp, b'\t', "tsv")?
                }
                ReportFormat::Html | ReportFormat::All => {
                    self.generate_html_report(reports, &timestamp)?
                }
            };
            written.push(path);
        }

        for path in &written {
            info!("Wrote report {}", path.display());
        }

        Ok(written)
    }

    fn report_path(&self, timestamp: &str, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("parentage_{}.{}", timestamp, extension))
    }

    fn generate_json_report(&self, reports: &[ParentageReport], timestamp: &str) -> Result<PathBuf> {
        let path = self.report_path(timestamp, "json");

        let json_content =
            to_string_pretty(reports).with_context(|| "Failed to serialize results to JSON")?;

        fs::write(&path, json_content)
            .with_context(|| format!("Failed to write JSON report to {}", path.display()))?;

        Ok(path)
    }

    fn generate_delimited_report(
        &self,
        reports: &[ParentageReport],
        timestamp: &str,
        delimiter: u8,
        extension: &str,
    ) -> Result<PathBuf> {
        let path = self.report_path(timestamp, extension);

        let mut wtr = WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        wtr.write_record(COLUMNS)?;

        for report in reports {
            wtr.write_record(row_fields(report))?;
        }

        wtr.flush()?;
        Ok(path)
    }

    fn generate_html_report(&self, reports: &[ParentageReport], timestamp: &str) -> Result<PathBuf> {
        let path = self.report_path(timestamp, "html");

        fs::write(&path, create_html_content(reports))
            .with_context(|| format!("Failed to write HTML report to {}", path.display()))?;

        Ok(path)
    }
}

fn rate(value: f64) -> String {
    format!("{:.4}", value)
}

fn row_fields(report: &ParentageReport) -> Vec<String> {
    vec![
        report.trio_id.clone(),
        report.offspring_id.clone(),
        report.dam_id.clone(),
        report.sire_id.clone(),
        report.offspring_sex.to_string(),
        report.markers_joined.to_string(),
        report.markers_unused.to_string(),
        report.autosomal.total_markers_evaluated.to_string(),
        report.autosomal.inconsistent_marker_count.to_string(),
        rate(report.autosomal.error_rate),
        report.x.total_markers_evaluated.to_string(),
        report.x.inconsistent_marker_count.to_string(),
        rate(report.x.error_rate),
        report
            .y
            .as_ref()
            .map(|y| rate(y.error_rate))
            .unwrap_or_default(),
        report.mitochondrial.total_markers_evaluated.to_string(),
        rate(report.mitochondrial.error_rate),
        rate(report.sex_chromosome_error_rate),
        report.verdict.to_string(),
    ]
}

fn verdict_class(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::VeryStrong | Verdict::Strong => "verdict-high",
        Verdict::Moderate => "verdict-medium",
        Verdict::Weak => "verdict-low",
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn create_html_content(reports: &[ParentageReport]) -> String {
    let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let mut sections = String::new();
    for report in reports {
        let mut rows = String::new();
        for result in report.category_results() {
            rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.4}</td></tr>\n",
                result.category,
                result.total_markers_evaluated,
                result.inconsistent_marker_count,
                result.error_rate
            ));
        }

        sections.push_str(&format!(
            r#"<div class="section">
    <h2>Trio {trio}</h2>
    <p>Offspring {offspring} ({sex}), dam {dam}, sire {sire}. {joined} shared markers.</p>
    <p class="{class}"><strong>{verdict}</strong></p>
    <table>
        <tr><th>Category</th><th>Markers</th><th>Mendelian errors</th><th>Error rate</th></tr>
{rows}    </table>
</div>
"#,
            trio = escape_html(&report.trio_id),
            offspring = escape_html(&report.offspring_id),
            sex = report.offspring_sex,
            dam = escape_html(&report.dam_id),
            sire = escape_html(&report.sire_id),
            joined = report.markers_joined,
            class = verdict_class(report.verdict),
            verdict = report.verdict,
            rows = rows,
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Parentage Verification Report</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; }}
        table {{ border-collapse: collapse; margin: 20px 0; }}
        th, td {{ border: 1px solid #ddd; padding: 8px 12px; text-align: left; }}
        th {{ background-color: #3498db; color: white; }}
        .verdict-high {{ background-color: #d4edda; }}
        .verdict-medium {{ background-color: #fff3cd; }}
        .verdict-low {{ background-color: #f8d7da; }}
    </style>
</head>
<body>
    <h1>Parentage Verification Report</h1>
    <p>Generated on: {}</p>
    <p>{} trio(s) evaluated.</p>
{}
</body>
</html>
"#,
        generated,
        reports.len(),
        sections
    )
}
