//! `validate` command
//!
//! Loads each file through the normal pipeline and reports the result
//! without starting a presentation.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::loader::{ConfigLoader, LoaderOptions};
use crate::error::{ConfigError, RevealError};

/// Per-file validation outcome.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    warnings: Vec<String>,
}

/// Validates configuration files.
///
/// Every file is checked even after a failure; the first failure is
/// returned once all reports are printed.
///
/// # Errors
///
/// Returns the first configuration error encountered.
pub fn run(args: &ValidateArgs) -> Result<(), RevealError> {
    let loader = ConfigLoader::new(LoaderOptions::default());
    let mut first_error: Option<ConfigError> = None;
    let mut reports = Vec::with_capacity(args.files.len());

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");
        let (report, error) = check(&loader, path);
        if first_error.is_none() {
            first_error = error;
        }
        reports.push(report);
    }

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                println!("{}", human_line(report));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    first_error.map_or(Ok(()), |e| Err(e.into()))
}

fn check(loader: &ConfigLoader, path: &Path) -> (FileReport, Option<ConfigError>) {
    let file = path.display().to_string();
    match loader.load(path) {
        Ok(result) => {
            let warnings = result
                .warnings
                .iter()
                .map(|w| match &w.location {
                    Some(location) => format!("{} at {location}", w.message),
                    None => w.message.clone(),
                })
                .collect();
            (
                FileReport {
                    file,
                    valid: true,
                    error: None,
                    warnings,
                },
                None,
            )
        }
        Err(e) => (
            FileReport {
                file,
                valid: false,
                error: Some(e.to_string()),
                warnings: Vec::new(),
            },
            Some(e),
        ),
    }
}

fn human_line(report: &FileReport) -> String {
    let mut line = if report.valid {
        format!("✓ {}", report.file)
    } else {
        format!(
            "✗ {}: {}",
            report.file,
            report.error.as_deref().unwrap_or("invalid")
        )
    };
    for warning in &report.warnings {
        line.push_str("\n  warning: ");
        line.push_str(warning);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_file_reports_ok() {
        let file = write_config("outcome: boy\n");
        let (report, error) = check(&ConfigLoader::default(), file.path());
        assert!(report.valid);
        assert!(error.is_none());
        assert!(human_line(&report).starts_with('✓'));
    }

    #[test]
    fn test_invalid_countdown_reports_error() {
        let file = write_config("timing:\n  countdown_from: 0\n");
        let (report, error) = check(&ConfigLoader::default(), file.path());
        assert!(!report.valid);
        assert!(matches!(error, Some(ConfigError::ValidationError { .. })));
        assert!(human_line(&report).contains("timing.countdown_from"));
    }

    #[test]
    fn test_missing_file_fails_run() {
        let args = ValidateArgs {
            files: vec!["/nonexistent/reveal.yaml".into()],
            format: OutputFormat::Json,
        };
        let err = run(&args).unwrap_err();
        assert!(matches!(err, RevealError::Config(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn test_json_report_shape() {
        let report = FileReport {
            file: "a.yaml".into(),
            valid: true,
            error: None,
            warnings: vec!["sound file not found".into()],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["valid"], true);
        assert!(value.get("error").is_none());
        assert_eq!(value["warnings"][0], "sound file not found");
    }
}
