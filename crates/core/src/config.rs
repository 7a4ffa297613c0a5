//! 설정 관리 -- drstat.toml 파싱 및 런타임 설정
//!
//! [`DrstatConfig`]는 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`DRSTAT_STAT_JOBS=4` 형식)
//! 3. 설정 파일 (`drstat.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), drstat_core::error::DrstatError> {
//! use drstat_core::config::DrstatConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = DrstatConfig::load("drstat.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = DrstatConfig::parse("[stat]\nplaceholder = \"-\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, DrstatError};

/// 허용되는 최대 동시 스캔 수
pub const MAX_JOBS: usize = 256;

/// drstat 통합 설정
///
/// `drstat.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrstatConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 통계 설정
    #[serde(default)]
    pub stat: StatConfig,
}

impl DrstatConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DrstatError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DrstatError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DrstatError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                DrstatError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 기본값에 환경변수 오버라이드만 적용한 설정을 만듭니다.
    ///
    /// 설정 파일이 없을 때 사용합니다.
    pub fn from_env() -> Result<Self, DrstatError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, DrstatError> {
        toml::from_str(toml_str).map_err(|e| {
            DrstatError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `DRSTAT_{SECTION}_{FIELD}`
    /// 예: `DRSTAT_GENERAL_LOG_LEVEL=debug`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "DRSTAT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "DRSTAT_GENERAL_LOG_FORMAT");

        // Stat
        override_string(&mut self.stat.placeholder, "DRSTAT_STAT_PLACEHOLDER");
        override_string(
            &mut self.stat.eval_report_marker,
            "DRSTAT_STAT_EVAL_REPORT_MARKER",
        );
        override_string(
            &mut self.stat.eval_report_name,
            "DRSTAT_STAT_EVAL_REPORT_NAME",
        );
        override_csv(
            &mut self.stat.ignore_log_prefixes,
            "DRSTAT_STAT_IGNORE_LOG_PREFIXES",
        );
        override_string(&mut self.stat.route_profile, "DRSTAT_STAT_ROUTE_PROFILE");
        override_string(&mut self.stat.eval_profile, "DRSTAT_STAT_EVAL_PROFILE");
        override_usize(&mut self.stat.jobs, "DRSTAT_STAT_JOBS");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), DrstatError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.stat.placeholder.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "stat.placeholder".to_owned(),
                reason: "placeholder must not be empty".to_owned(),
            }
            .into());
        }

        if self.stat.eval_report_marker.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "stat.eval_report_marker".to_owned(),
                reason: "marker must not be empty".to_owned(),
            }
            .into());
        }

        if self.stat.eval_report_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "stat.eval_report_name".to_owned(),
                reason: "file name must not be empty".to_owned(),
            }
            .into());
        }

        if self.stat.jobs == 0 || self.stat.jobs > MAX_JOBS {
            return Err(ConfigError::InvalidValue {
                field: "stat.jobs".to_owned(),
                reason: format!("must be between 1 and {MAX_JOBS}"),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 로그 통계 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatConfig {
    /// 값이 없는 칸에 표시할 문자열
    pub placeholder: String,
    /// 평가 리포트를 식별하는 문자열 (한 줄이라도 포함하면 평가 리포트)
    pub eval_report_marker: String,
    /// 실행 디렉토리의 케이스별 평가 리포트 파일명
    pub eval_report_name: String,
    /// 라우터 로그 후보에서 제외할 파일명 접두사
    pub ignore_log_prefixes: Vec<String>,
    /// 라우터 로그 프로파일 YAML 경로 (비어 있으면 내장 프로파일)
    pub route_profile: String,
    /// 평가 리포트 프로파일 YAML 경로 (비어 있으면 내장 프로파일)
    pub eval_profile: String,
    /// 동시에 스캔할 파일 수
    pub jobs: usize,
}

impl StatConfig {
    /// 라우터 로그 프로파일 경로 (설정된 경우)
    pub fn route_profile_path(&self) -> Option<&Path> {
        non_empty_path(&self.route_profile)
    }

    /// 평가 리포트 프로파일 경로 (설정된 경우)
    pub fn eval_profile_path(&self) -> Option<&Path> {
        non_empty_path(&self.eval_profile)
    }
}

impl Default for StatConfig {
    fn default() -> Self {
        Self {
            placeholder: "N/A".to_owned(),
            eval_report_marker: "Guides and tracks Obedience".to_owned(),
            eval_report_name: "eval.score.rpt".to_owned(),
            ignore_log_prefixes: vec!["innovus".to_owned()],
            route_profile: String::new(),
            eval_profile: String::new(),
            jobs: 1,
        }
    }
}

fn non_empty_path(value: &str) -> Option<&Path> {
    if value.trim().is_empty() {
        None
    } else {
        Some(Path::new(value))
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
