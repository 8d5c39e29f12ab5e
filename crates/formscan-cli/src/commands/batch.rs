//! Batch command - extract fields from many forms.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use formscan_core::{FormScanner, ScanReport, TesseractEngine, DIABETES_FIELDS};

use super::extract::{field_cells, format_report, scan_file, OutputFormat};

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp", "txt"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching input files
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file reports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of scanning a single file.
struct FileOutcome {
    path: PathBuf,
    report: Option<ScanReport>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files = matching_files(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} forms")?
            .progress_chars("=>-"),
    );

    let scanner = FormScanner::new(Arc::new(TesseractEngine::new(config.ocr.clone())));
    let mut outcomes = Vec::with_capacity(files.len());

    for path in files {
        match scan_file(&scanner, &path, false) {
            Ok(report) => outcomes.push(FileOutcome {
                path,
                report: Some(report),
                error: None,
            }),
            Err(e) => {
                let message = e.to_string();
                if !args.continue_on_error {
                    error!("Failed to process {}: {}", path.display(), message);
                    pb.abandon();
                    anyhow::bail!("Processing failed for {}: {}", path.display(), message);
                }
                warn!("Failed to process {}: {}", path.display(), message);
                outcomes.push(FileOutcome {
                    path,
                    report: None,
                    error: Some(message),
                });
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for outcome in &outcomes {
            if let Some(report) = &outcome.report {
                let stem = outcome
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("form");
                let output_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));
                fs::write(&output_path, format_report(report, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = outcomes.iter().filter(|o| o.error.is_some()).collect();
    let complete = outcomes
        .iter()
        .filter_map(|o| o.report.as_ref())
        .filter(|r| r.is_complete(DIABETES_FIELDS))
        .count();

    println!();
    println!(
        "{} Processed {} forms in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} complete, {} partial, {} failed",
        style(complete).green(),
        style(outcomes.len() - complete - failed.len()).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in &failed {
            println!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn matching_files(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && is_supported(p))
        .collect();
    files.sort();
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

fn write_summary(path: &Path, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(DIABETES_FIELDS.iter().map(|spec| spec.name));
    header.extend(["warnings", "processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for outcome in outcomes {
        let filename = outcome
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let mut row = vec![filename];
        match &outcome.report {
            Some(report) => {
                let status = if report.is_complete(DIABETES_FIELDS) {
                    "complete"
                } else {
                    "partial"
                };
                row.push(status.to_string());
                row.extend(field_cells(report));
                row.push(report.warnings.join("; "));
                row.push(report.processing_time_ms.to_string());
                row.push(String::new());
            }
            None => {
                row.push("error".to_string());
                row.extend(DIABETES_FIELDS.iter().map(|_| String::new()));
                row.push(String::new());
                row.push(String::new());
                row.push(outcome.error.clone().unwrap_or_default());
            }
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported(Path::new("a/form.PNG")));
        assert!(is_supported(Path::new("form.txt")));
        assert!(!is_supported(Path::new("form.pdf")));
        assert!(!is_supported(Path::new("README")));
    }

    #[test]
    fn test_matching_files_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt", "notes.md"] {
            fs::write(dir.path().join(name), "Age 40").unwrap();
        }

        let pattern = format!("{}/*", dir.path().display());
        let files = matching_files(&pattern).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let scanner = FormScanner::new(Arc::new(TesseractEngine::default()));

        let outcomes = vec![
            FileOutcome {
                path: PathBuf::from("one.txt"),
                report: Some(scanner.scan_text("Glucose 120 Age 41")),
                error: None,
            },
            FileOutcome {
                path: PathBuf::from("two.png"),
                report: None,
                error: Some("OCR failed".to_string()),
            },
        ];

        write_summary(&path, &outcomes).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("filename,status,Pregnancies,Glucose"));
        assert!(lines[1].starts_with("one.txt,partial,,120,"));
        assert!(lines[2].starts_with("two.png,error,"));
        assert!(lines[2].ends_with(",OCR failed"));
    }
}
