//! Predict command - request a prediction from the prediction service.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use console::style;
use tracing::info;

use formscan_core::{FormScanner, PredictionClient, PredictionInput, TesseractEngine};

use super::extract::scan_file;

/// Arguments for the predict command.
#[derive(Args)]
pub struct PredictArgs {
    /// JSON file with the eight fields (default: stdin)
    #[arg(conflicts_with = "from_image")]
    input: Option<PathBuf>,

    /// Extract the fields from a form first
    #[arg(long)]
    from_image: Option<PathBuf>,

    /// Prediction service URL (overrides config)
    #[arg(long)]
    url: Option<String>,

    /// Print the payload and response as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: PredictArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(url) = args.url {
        config.prediction.endpoint = url;
    }

    let input = match (&args.from_image, &args.input) {
        (Some(form), _) => {
            let scanner = FormScanner::new(Arc::new(TesseractEngine::new(config.ocr.clone())));
            let report = scan_file(&scanner, form, false)?;
            PredictionInput::try_from(&report.extracted)
                .map_err(|e| anyhow::anyhow!("Cannot predict from {}: {}", form.display(), e))?
        }
        (None, Some(path)) => read_input(path)?,
        (None, None) => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            parse_input(&buffer)?
        }
    };

    let client = PredictionClient::new(&config.prediction)?;
    info!("Requesting prediction from {}", client.endpoint());
    let prediction = client.predict(&input).await?;

    if args.json {
        let output = serde_json::json!({ "input": input, "prediction": prediction });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} Prediction: {}", style("✓").green(), style(&prediction).bold());
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<PredictionInput> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    parse_input(&content)
}

fn parse_input(content: &str) -> anyhow::Result<PredictionInput> {
    serde_json::from_str(content).map_err(|e| anyhow::anyhow!("Invalid prediction input: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        let input = parse_input(
            r#"{"pregnancies":6,"glucose":148,"bloodPressure":72,"skinThickness":35,
                "insulin":0,"bmi":33.6,"diabetesPedigreeFunction":0.627,"age":50}"#,
        )
        .unwrap();

        assert_eq!(input.pregnancies, 6);
        assert_eq!(input.glucose, 148.0);
        assert_eq!(input.age, 50);
    }

    #[test]
    fn test_parse_input_rejects_missing_fields() {
        let err = parse_input(r#"{"glucose":148}"#).unwrap_err();
        assert!(err.to_string().starts_with("Invalid prediction input"));
    }
}
