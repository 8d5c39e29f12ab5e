//! Extract command - extract screening values from a single form.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use console::style;
use tracing::{debug, info};

use formscan_core::{FormScanner, ScanReport, TesseractEngine, DIABETES_FIELDS};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (image, or recognized text with --text / .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Treat the input as already-recognized text
    #[arg(long)]
    text: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print the recognized text to stderr
    #[arg(long)]
    show_text: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON report
    Json,
    /// CSV row with one column per field
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for written reports.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let scanner = FormScanner::new(Arc::new(TesseractEngine::new(config.ocr.clone())));
    let report = scan_file(&scanner, &args.input, args.text)?;

    if args.show_text {
        eprintln!("{}", style("Recognized text:").bold());
        eprintln!("{}", report.raw_text);
        eprintln!();
    }

    for warning in &report.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_report(&report, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {}ms", report.processing_time_ms);

    Ok(())
}

/// Whether `path` holds recognized text rather than an image.
pub fn is_text_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

/// Scan a file from disk, reading it as text when asked or when it is a `.txt`.
pub fn scan_file(scanner: &FormScanner, path: &Path, force_text: bool) -> anyhow::Result<ScanReport> {
    let report = if force_text || is_text_input(path) {
        let text = fs::read_to_string(path)?;
        scanner.scan_text(&text)
    } else {
        let data = fs::read(path)?;
        scanner
            .scan_image(&data)
            .map_err(|e| anyhow::anyhow!("OCR failed: {}", e))?
    };

    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    Ok(report.with_source(name))
}

/// Render a report in the requested format.
pub fn format_report(report: &ScanReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => format_csv(report),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_csv(report: &ScanReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["source"];
    header.extend(DIABETES_FIELDS.iter().map(|spec| spec.name));
    wtr.write_record(&header)?;

    let mut row = vec![report.source.clone().unwrap_or_default()];
    row.extend(field_cells(report));
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// One cell per table field, empty when the field was not extracted.
pub fn field_cells(report: &ScanReport) -> Vec<String> {
    DIABETES_FIELDS
        .iter()
        .map(|spec| {
            report
                .extracted
                .get(spec.name)
                .map(|v| v.to_string())
                .unwrap_or_default()
        })
        .collect()
}

fn format_text(report: &ScanReport) -> String {
    let mut output = String::new();

    if let Some(source) = &report.source {
        output.push_str(&format!("Form: {}\n\n", source));
    }

    for spec in DIABETES_FIELDS {
        match report.extracted.get(spec.name) {
            Some(value) => output.push_str(&format!("  {:<28} {}\n", spec.label, value)),
            None => output.push_str(&format!("  {:<28} -\n", spec.label)),
        }
    }

    let missing = report.missing(DIABETES_FIELDS);
    output.push('\n');
    if missing.is_empty() {
        output.push_str("All fields extracted\n");
    } else {
        output.push_str(&format!("Missing: {}\n", missing.join(", ")));
    }

    for warning in &report.warnings {
        output.push_str(&format!("Warning: {}\n", warning));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use formscan_core::{OcrBackend, OcrError};
    use formscan_core::ocr::ImageFormat;
    use pretty_assertions::assert_eq;

    struct NoOcr;

    impl OcrBackend for NoOcr {
        fn name(&self) -> &str {
            "none"
        }

        fn is_available(&self) -> bool {
            false
        }

        fn recognize(&self, _image: &[u8], _format: ImageFormat) -> Result<String, OcrError> {
            Err(OcrError::EngineUnavailable("disabled".to_string()))
        }
    }

    fn report(text: &str) -> ScanReport {
        FormScanner::new(Arc::new(NoOcr))
            .scan_text(text)
            .with_source("form-01.txt")
    }

    #[test]
    fn test_is_text_input() {
        assert!(is_text_input(Path::new("scan.txt")));
        assert!(is_text_input(Path::new("SCAN.TXT")));
        assert!(!is_text_input(Path::new("scan.png")));
        assert!(!is_text_input(Path::new("scan")));
    }

    #[test]
    fn test_format_csv() {
        let csv = format_report(&report("Glucose: 148 BMI 33.6 Age 50"), OutputFormat::Csv).unwrap();
        assert_eq!(
            csv,
            "source,Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age\n\
             form-01.txt,,148,,,,33.6,,50\n"
        );
    }

    #[test]
    fn test_format_text_lists_missing_fields() {
        let text = format_report(&report("Pregnancies 2 Age 31"), OutputFormat::Text).unwrap();
        assert!(text.starts_with("Form: form-01.txt"));
        assert!(text.contains("Missing: Glucose, BloodPressure"));
        assert!(!text.contains("Warning"));
    }

    #[test]
    fn test_format_json_includes_warnings() {
        let json = format_report(&report("Age: 99999999999"), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["source"], "form-01.txt");
        assert_eq!(value["extracted"], serde_json::json!({}));
        assert_eq!(value["warnings"].as_array().unwrap().len(), 1);
    }
}
