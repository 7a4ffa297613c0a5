//! `drstat config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use drstat_core::config::DrstatConfig;
use drstat_core::error::{ConfigError, DrstatError};

use crate::cli::{ConfigAction, ConfigArgs, DEFAULT_CONFIG_PATH};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Source label used when no config file exists at the default location.
pub const BUILTIN_SOURCE: &str = "(built-in defaults)";

/// Load the effective configuration.
///
/// A missing file at the default path falls back to defaults plus environment overrides.
/// Any other missing path is an error. Returns the configuration and a source label.
pub async fn load_config(path: &Path) -> Result<(DrstatConfig, String), DrstatError> {
    match DrstatConfig::load(path).await {
        Ok(config) => Ok((config, path.display().to_string())),
        Err(DrstatError::Config(ConfigError::FileNotFound { .. }))
            if path == Path::new(DEFAULT_CONFIG_PATH) =>
        {
            info!("no drstat.toml found, using built-in defaults");
            Ok((DrstatConfig::from_env()?, BUILTIN_SOURCE.to_owned()))
        }
        Err(e) => Err(e),
    }
}

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration file, reporting any errors.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (parse errors, invalid values, missing file).
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match load_config(config_path).await {
        Ok((_, source)) => ConfigValidationReport {
            source,
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Display the effective configuration (file + env overrides + defaults).
///
/// # Errors
///
/// Returns the load error, or `CliError::Command` if the section name is unknown.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let (config, source) = load_config(config_path).await?;
    let report = build_config_report(&config, source, section.as_deref())?;
    writer.render(&report)?;
    Ok(())
}

/// Serialize the whole configuration or one section of it.
pub fn build_config_report(
    config: &DrstatConfig,
    source: String,
    section: Option<&str>,
) -> Result<ConfigReport, CliError> {
    let config_toml = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("stat") => toml::to_string_pretty(&config.stat),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: general, stat)",
                other
            )));
        }
    }
    .map_err(|e| CliError::Config(format!("failed to serialize configuration: {}", e)))?;

    Ok(ConfigReport {
        source,
        section: section.map(str::to_owned),
        config_toml,
    })
}

/// Configuration display report.
///
/// The `config_toml` field is skipped during JSON serialization (only used for text rendering).
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path or built-in label
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Serialized TOML configuration
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_report_full_config() {
        let report = build_config_report(&DrstatConfig::default(), "test.toml".to_owned(), None)
            .expect("default config serializes");

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Configuration"), "should contain header");
        assert!(output.contains("test.toml"), "should contain source filename");
        assert!(output.contains("log_level"), "should contain general section");
        assert!(output.contains("placeholder"), "should contain stat section");
    }

    #[test]
    fn test_config_report_specific_section() {
        let report = build_config_report(
            &DrstatConfig::default(),
            "/etc/drstat.toml".to_owned(),
            Some("stat"),
        )
        .expect("stat section serializes");

        assert!(report.config_toml.contains("eval_report_marker"));
        assert!(!report.config_toml.contains("log_level"));

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("[stat]"), "should show section name");
    }

    #[test]
    fn test_config_report_unknown_section() {
        let result = build_config_report(&DrstatConfig::default(), "x".to_owned(), Some("ebpf"));
        match result {
            Err(CliError::Command(msg)) => assert!(msg.contains("unknown section")),
            _ => panic!("expected Command error"),
        }
    }

    #[test]
    fn test_config_report_json_serialization() {
        let report = ConfigReport {
            source: "test.toml".to_owned(),
            section: Some("general".to_owned()),
            config_toml: "log_level = \"warn\"".to_owned(),
        };

        let json = serde_json::to_string(&report).expect("JSON serialization should succeed");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should parse JSON");

        assert_eq!(parsed["source"].as_str(), Some("test.toml"));
        assert_eq!(parsed["section"].as_str(), Some("general"));
        assert!(
            parsed.get("config_toml").is_none(),
            "config_toml should be skipped"
        );
    }

    #[test]
    fn test_config_validation_report_invalid() {
        let report = ConfigValidationReport {
            source: "bad.toml".to_owned(),
            valid: false,
            errors: vec!["invalid config value for 'stat.jobs'".to_owned()],
        };

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("INVALID"));
        assert!(output.contains("stat.jobs"));
    }

    #[tokio::test]
    async fn test_load_config_missing_explicit_path_is_error() {
        let result = load_config(Path::new("/nonexistent/drstat.toml")).await;
        assert!(matches!(
            result,
            Err(DrstatError::Config(ConfigError::FileNotFound { .. }))
        ));
    }
}
