//! `drstat rules` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use drstat_core::config::StatConfig;
use drstat_log_scan::profile::builtin;
use drstat_log_scan::{Profile, ProfileLoader, RuleState};

use crate::cli::{ProfileKind, RulesAction, RulesArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `rules` command.
pub async fn execute(
    args: RulesArgs,
    stat: &StatConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        RulesAction::List { profile } => execute_list(stat, profile, writer).await,
        RulesAction::Validate { path } => execute_validate(&path, writer).await,
    }
}

/// Resolve the profile for one slot: explicit path, then config path, then built-in.
///
/// Returns the profile and a source label.
pub async fn resolve_profile(
    kind: ProfileKind,
    explicit: Option<&Path>,
    stat: &StatConfig,
) -> Result<(Profile, String), CliError> {
    let configured = match kind {
        ProfileKind::Route => stat.route_profile_path(),
        ProfileKind::Eval => stat.eval_profile_path(),
    };

    match explicit.or(configured) {
        Some(path) => {
            info!(path = %path.display(), "loading extraction profile");
            let profile = ProfileLoader::load_file(path).await?;
            Ok((profile, path.display().to_string()))
        }
        None => {
            let name = kind.builtin_name();
            let profile = builtin::by_name(name).ok_or_else(|| {
                CliError::Profile(format!("no built-in profile named '{name}'"))
            })??;
            let label = format!("builtin:{}", profile.name());
            Ok((profile, label))
        }
    }
}

async fn execute_list(
    stat: &StatConfig,
    filter: Option<ProfileKind>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let kinds = match filter {
        Some(kind) => vec![kind],
        None => vec![ProfileKind::Route, ProfileKind::Eval],
    };

    let mut profiles = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let (profile, source) = resolve_profile(kind, None, stat).await?;
        profiles.push(ProfileEntry::from_profile(&profile, source));
    }

    writer.render(&RuleListReport { profiles })?;
    Ok(())
}

async fn execute_validate(path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %path.display(), "validating extraction profiles");

    let report = validate_path(path).await?;
    writer.render(&report)?;

    if report.invalid > 0 {
        return Err(CliError::Profile(format!(
            "{} invalid profile file(s)",
            report.invalid
        )));
    }

    Ok(())
}

/// Validate a single profile file or every YAML file in a directory.
pub async fn validate_path(path: &Path) -> Result<ProfileValidationReport, CliError> {
    let files: Vec<PathBuf> = if path.is_dir() {
        ProfileLoader::yaml_files(path).await?
    } else {
        vec![path.to_path_buf()]
    };

    let mut valid = Vec::new();
    let mut errors = Vec::new();
    for file in &files {
        match ProfileLoader::load_file(file).await {
            Ok(profile) => valid.push(profile.name().to_owned()),
            Err(e) => errors.push(ProfileError {
                file: file.display().to_string(),
                error: e.to_string(),
            }),
        }
    }

    Ok(ProfileValidationReport {
        path: path.display().to_string(),
        total_files: files.len(),
        valid: valid.len(),
        invalid: errors.len(),
        profiles: valid,
        errors,
    })
}

#[derive(Serialize)]
pub struct RuleListReport {
    pub profiles: Vec<ProfileEntry>,
}

#[derive(Serialize)]
pub struct ProfileEntry {
    pub name: String,
    pub source: String,
    pub description: String,
    pub columns: Vec<String>,
    pub rules: Vec<RuleEntry>,
    pub transforms: Vec<String>,
    /// Columns no rule writes; they always show the placeholder.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unproduced: Vec<String>,
}

#[derive(Serialize)]
pub struct RuleEntry {
    pub keys: Vec<String>,
    pub pattern: String,
    pub initial: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

impl ProfileEntry {
    fn from_profile(profile: &Profile, source: String) -> Self {
        let produced = profile.rules().produced_keys();
        Self {
            name: profile.name().to_owned(),
            source,
            description: profile.description().to_owned(),
            columns: profile.columns().to_vec(),
            rules: profile
                .rules()
                .rules()
                .iter()
                .map(|rule| RuleEntry {
                    keys: rule.keys().to_vec(),
                    pattern: rule.pattern().to_owned(),
                    initial: match rule.initial_state() {
                        RuleState::Active => "active".to_owned(),
                        RuleState::Inactive => "inactive".to_owned(),
                    },
                    trigger: rule.trigger().map(str::to_owned),
                })
                .collect(),
            transforms: profile
                .transforms()
                .iter()
                .map(|(key, transform)| format!("{key}: {transform}"))
                .collect(),
            unproduced: profile
                .columns()
                .iter()
                .filter(|column| !produced.contains(column.as_str()))
                .cloned()
                .collect(),
        }
    }
}

impl Render for RuleListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for (i, p) in self.profiles.iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            writeln!(
                w,
                "Profile {} ({} rules, source: {})",
                p.name.bold(),
                p.rules.len(),
                p.source
            )?;
            if !p.description.is_empty() {
                writeln!(w, "  {}", p.description)?;
            }
            writeln!(w, "  Columns: {}", p.columns.join(", "))?;
            if !p.transforms.is_empty() {
                writeln!(w, "  Transforms: {}", p.transforms.join(", "))?;
            }
            if !p.unproduced.is_empty() {
                writeln!(
                    w,
                    "  {} {}",
                    "Never produced:".yellow(),
                    p.unproduced.join(", ")
                )?;
            }
            writeln!(w)?;
            writeln!(w, "  {:<3} {:<30} {:<9} Pattern", "#", "Keys", "Initial")?;
            writeln!(w, "  {}", "-".repeat(86))?;

            for (idx, r) in p.rules.iter().enumerate() {
                let initial = match r.initial.as_str() {
                    "active" => r.initial.green(),
                    _ => r.initial.yellow(),
                };
                writeln!(
                    w,
                    "  {:<3} {:<30} {:<9} {}",
                    idx,
                    r.keys.join(", "),
                    initial,
                    r.pattern
                )?;
                if let Some(ref trigger) = r.trigger {
                    writeln!(w, "  {:<3} {:<30} {:<9} on: {}", "", "", "", trigger)?;
                }
            }
        }

        Ok(())
    }
}

#[derive(Serialize)]
pub struct ProfileValidationReport {
    pub path: String,
    pub total_files: usize,
    pub valid: usize,
    pub invalid: usize,
    pub profiles: Vec<String>,
    pub errors: Vec<ProfileError>,
}

#[derive(Serialize)]
pub struct ProfileError {
    pub file: String,
    pub error: String,
}

impl Render for ProfileValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Profile Validation: {}", self.path.bold())?;
        writeln!(
            w,
            "  Files: {} total, {} valid, {} invalid",
            self.total_files,
            self.valid.to_string().green(),
            if self.invalid > 0 {
                self.invalid.to_string().red()
            } else {
                self.invalid.to_string().normal()
            }
        )?;

        if !self.errors.is_empty() {
            writeln!(w)?;
            writeln!(w, "Errors:")?;
            for e in &self.errors {
                writeln!(w, "  {}: {}", e.file.red(), e.error)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_profile_defaults_to_builtin() {
        let stat = StatConfig::default();
        let (profile, source) = resolve_profile(ProfileKind::Eval, None, &stat)
            .await
            .expect("builtin eval profile");
        assert_eq!(profile.name(), "eval");
        assert_eq!(source, "builtin:eval");
    }

    #[tokio::test]
    async fn test_resolve_profile_explicit_path_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("route.yml");
        std::fs::write(
            &path,
            "name: mine\ncolumns: [v]\nrules:\n  - keys: [v]\n    pattern: 'v=(\\d+)'\n",
        )
        .expect("write profile");

        let stat = StatConfig {
            route_profile: "/nonexistent/configured.yml".to_owned(),
            ..StatConfig::default()
        };
        let (profile, source) = resolve_profile(ProfileKind::Route, Some(&path), &stat)
            .await
            .expect("explicit profile");
        assert_eq!(profile.name(), "mine");
        assert!(source.ends_with("route.yml"));

        // 설정 경로가 잘못되면 프로파일 에러
        let err = resolve_profile(ProfileKind::Route, None, &stat)
            .await
            .expect_err("configured path does not exist");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_rule_list_render_text() {
        let profile = builtin::route().expect("builtin route");
        let report = RuleListReport {
            profiles: vec![ProfileEntry::from_profile(&profile, "builtin:route".to_owned())],
        };

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("route"));
        assert!(output.contains("wire space, wire-wire, wire-fix"));
        assert!(output.contains("on: Finish all RRR iterations and PostRoute"));
        assert!(output.contains("mem: kib_to_gib"));
    }

    #[tokio::test]
    async fn test_resolve_profile_builtin_for_each_kind() {
        let stat = StatConfig::default();
        for kind in [ProfileKind::Route, ProfileKind::Eval] {
            let (profile, source) = resolve_profile(kind, None, &stat)
                .await
                .expect("builtin profile");
            assert_eq!(profile.name(), kind.builtin_name());
            assert_eq!(source, format!("builtin:{}", kind.builtin_name()));
        }
    }

    #[test]
    fn test_profile_entry_lists_unproduced_columns() {
        let profile = drstat_log_scan::ProfileLoader::parse_yaml(
            "name: partial\ncolumns: [v, missing]\nrules:\n  - keys: [v]\n    pattern: 'v=(\\d+)'\n",
            "partial.yml",
        )
        .expect("valid profile");
        let entry = ProfileEntry::from_profile(&profile, "partial.yml".to_owned());
        assert_eq!(entry.unproduced, vec!["missing".to_owned()]);

        let report = RuleListReport {
            profiles: vec![entry],
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Never produced:"));
        assert!(output.contains("missing"));

        let builtin = builtin::route().expect("builtin route");
        let entry = ProfileEntry::from_profile(&builtin, "builtin:route".to_owned());
        assert!(entry.unproduced.is_empty());
        let json = serde_json::to_value(&entry).expect("serialize");
        assert!(json.get("unproduced").is_none());
    }

    #[test]
    fn test_rule_entry_json_omits_missing_trigger() {
        let profile = builtin::eval().expect("builtin eval");
        let entry = ProfileEntry::from_profile(&profile, "builtin:eval".to_owned());
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["rules"][0]["keys"][0], "WL");
        assert_eq!(json["rules"][0]["initial"], "active");
        assert!(json["rules"][0].get("trigger").is_none());
    }

    #[tokio::test]
    async fn test_validate_path_reports_each_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("route.yml"), builtin::ROUTE_YAML).expect("write");
        std::fs::write(
            dir.path().join("broken.yaml"),
            "name: broken\ncolumns: [a]\nrules:\n  - keys: [a, b]\n    pattern: '(x)'\n",
        )
        .expect("write");

        let report = validate_path(dir.path()).await.expect("directory readable");
        assert_eq!(report.total_files, 2);
        assert_eq!(report.valid, 1);
        assert_eq!(report.invalid, 1);
        assert_eq!(report.profiles, vec!["route".to_owned()]);
        assert!(report.errors[0].file.ends_with("broken.yaml"));
        assert!(report.errors[0].error.contains("capture group"));
    }

    #[tokio::test]
    async fn test_validate_path_single_missing_file() {
        let report = validate_path(Path::new("/nonexistent/route.yml"))
            .await
            .expect("missing file is reported, not raised");
        assert_eq!(report.invalid, 1);
    }
}
