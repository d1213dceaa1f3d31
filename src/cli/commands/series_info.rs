//! Series-info command implementation
//!
//! Indexes a directory of DICOM files and prints either the
//! description-grouped table or the per-series records as CSV or JSON.

use crate::adapters::clinical::csv::write_record;
use crate::config::load_config_or_default;
use crate::core::index::{aggregate_by_description, index, SeriesReport, SkipCounts};
use crate::domain::SeriesRecord;
use clap::{Args, ValueEnum};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Output format of the series report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SeriesFormat {
    /// Description-grouped table
    #[default]
    Table,
    /// One row per series
    Csv,
    /// One object per series
    Json,
}

/// Arguments for the series-info command
#[derive(Args, Debug)]
pub struct SeriesInfoArgs {
    /// Directory to index (defaults to the configured input directory)
    pub input_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = SeriesFormat::Table)]
    pub format: SeriesFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SeriesInfoArgs {
    /// Execute the series-info command
    pub async fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<i32> {
        let root = match &self.input_dir {
            Some(dir) => dir.clone(),
            None => match load_config_or_default(config_path) {
                Ok(config) => config.pipeline.input_dir,
                Err(e) => {
                    eprintln!("{e}");
                    return Ok(2);
                }
            },
        };

        if !root.is_dir() {
            eprintln!("Input directory does not exist: {}", root.display());
            return Ok(2);
        }

        tracing::info!(root = %root.display(), format = ?self.format, "Indexing series");
        let series_index = tokio::task::spawn_blocking(move || index(&root)).await??;
        let skipped = series_index.skipped();

        let rendered = match self.format {
            SeriesFormat::Table => {
                render_table(&aggregate_by_description(series_index.records()), skipped)
            }
            SeriesFormat::Csv => render_csv(series_index.records()),
            SeriesFormat::Json => serde_json::to_string_pretty(series_index.records())? + "\n",
        };

        match &self.output {
            Some(path) => {
                std::fs::write(path, rendered)?;
                println!("Series report written to {}", path.display());
            }
            None => print!("{rendered}"),
        }

        Ok(0)
    }
}

const TABLE_HEADERS: [&str; 6] = [
    "Series Description",
    "Modalities",
    "Patients",
    "Studies",
    "Series",
    "Images",
];

/// Renders the description-grouped table with totals
pub fn render_table(report: &SeriesReport, skipped: SkipCounts) -> String {
    let rows: Vec<[String; 6]> = report
        .groups
        .iter()
        .map(|group| {
            [
                group.series_description.clone(),
                group
                    .modalities
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                group.patient_count.to_string(),
                group.study_count.to_string(),
                group.series_count.to_string(),
                group.image_count.to_string(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = TABLE_HEADERS.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Total count of Patients: {}", report.total_patients);
    let _ = writeln!(out, "Total count of Studies: {}", report.total_studies);
    let _ = writeln!(out, "Total count of Series: {}", report.total_series);
    let _ = writeln!(out, "Total count of Images: {}", report.total_images);
    if skipped.total() > 0 {
        let _ = writeln!(
            out,
            "Skipped files: {} unsupported, {} unreadable",
            skipped.unsupported, skipped.unreadable
        );
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

const CSV_HEADERS: [&str; 7] = [
    "patient_id",
    "study_uid",
    "series_uid",
    "modality",
    "series_description",
    "study_description",
    "image_count",
];

/// Renders one CSV row per series
pub fn render_csv(records: &[SeriesRecord]) -> String {
    let mut out = write_record(&CSV_HEADERS.map(String::from));
    for record in records {
        out.push_str(&write_record(&[
            record.patient_id.clone(),
            record.study_uid.clone(),
            record.series_uid.clone(),
            record.modality.clone(),
            record.series_description.clone(),
            record.study_description.clone(),
            record.image_count.to_string(),
        ]));
    }
    out
}
