//! 추출 프로파일 -- 이름 붙은 규칙 집합 + 리포트 컬럼 + 사후 값 변환
//!
//! 프로파일은 YAML로 기술됩니다.
//!
//! ```yaml
//! name: route
//! columns: [wire space, mem]
//! rules:
//!   - keys: [wire space]
//!     pattern: '.*SumW[ ]+\| ([\d.]+)'
//!     active: false
//!     trigger: Finish all RRR iterations and PostRoute
//!   - keys: [mem]
//!     pattern: '\tMaximum resident set size \(kbytes\): ([\d]+)'
//! transforms:
//!   mem: kib_to_gib
//! ```
//!
//! - [`Profile`]: 컴파일된 프로파일, 파일 하나를 스캔해 [`ResultMap`]을 만듭니다.
//! - [`loader`]: YAML 파일/디렉토리 로딩
//! - [`builtin`]: 내장 `route`/`eval` 프로파일

pub mod builtin;
pub mod loader;

pub use loader::ProfileLoader;

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LogScanError;
use crate::result::ResultMap;
use crate::rule::{FieldRuleSpec, RuleSet};

/// 프로파일 정의 (YAML 스키마)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSpec {
    /// 프로파일 이름
    pub name: String,
    /// 설명
    #[serde(default)]
    pub description: String,
    /// 리포트 컬럼 순서
    pub columns: Vec<String>,
    /// 등록 순서대로 적용되는 규칙
    pub rules: Vec<FieldRuleSpec>,
    /// 키별 사후 변환
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transforms: BTreeMap<String, ValueTransform>,
}

impl ProfileSpec {
    /// 규칙 컴파일 이전의 구조적 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogScanError> {
        let invalid = |reason: String| LogScanError::ProfileValidation {
            profile: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(LogScanError::ProfileValidation {
                profile: "(empty)".to_owned(),
                reason: "profile name must not be empty".to_owned(),
            });
        }

        if self.rules.is_empty() {
            return Err(invalid("profile must define at least one rule".to_owned()));
        }

        if self.columns.is_empty() {
            return Err(invalid("profile must define at least one column".to_owned()));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.trim().is_empty() {
                return Err(invalid("column names must not be empty".to_owned()));
            }
            if !seen.insert(column.as_str()) {
                return Err(invalid(format!("column '{column}' listed more than once")));
            }
        }

        for rule in &self.rules {
            rule.validate().map_err(|e| invalid(e.to_string()))?;
        }

        for key in self.transforms.keys() {
            let produced = self.rules.iter().any(|r| r.keys.iter().any(|k| k == key));
            if !produced {
                return Err(invalid(format!(
                    "transform target '{key}' is not produced by any rule"
                )));
            }
        }

        Ok(())
    }
}

/// 스캔 이후 값 변환
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTransform {
    /// KiB -> GiB (1048576으로 나누고 소수점 6자리 반올림)
    KibToGib,
}

impl ValueTransform {
    /// 값을 변환합니다. 숫자가 아니면 `None`.
    pub fn apply(self, value: &str) -> Option<String> {
        match self {
            Self::KibToGib => {
                let kib: f64 = value.trim().parse().ok()?;
                if !kib.is_finite() {
                    return None;
                }
                Some(format_rounded(kib / 1_048_576.0, 6))
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::KibToGib => "kib_to_gib",
        }
    }
}

impl std::fmt::Display for ValueTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `digits`자리에서 반올림한 최소 한 자리 소수 십진 표기 (`0.5`, `1.0`)
///
/// 고정 정밀도 포맷은 정확한 이진값 기준으로 반올림하며 정확히 절반이면 짝수 쪽으로 보냅니다.
fn format_rounded(value: f64, digits: usize) -> String {
    let fixed = format!("{value:.digits$}");
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_owned()
    }
}

/// 컴파일된 추출 프로파일
///
/// 스캔마다 규칙 상태를 초기화하므로 같은 인스턴스로 여러 파일을 차례로 스캔할 수 있습니다.
/// 동시 스캔에는 스캔마다 복제본을 사용합니다.
#[derive(Debug, Clone)]
pub struct Profile {
    spec: ProfileSpec,
    rules: RuleSet,
}

impl Profile {
    /// 프로파일 정의를 검증하고 규칙을 컴파일합니다.
    pub fn compile(spec: ProfileSpec) -> Result<Self, LogScanError> {
        spec.validate()?;

        let rules =
            RuleSet::from_specs(&spec.rules).map_err(|e| LogScanError::ProfileValidation {
                profile: spec.name.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self { spec, rules })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn description(&self) -> &str {
        &self.spec.description
    }

    pub fn columns(&self) -> &[String] {
        &self.spec.columns
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn transforms(&self) -> &BTreeMap<String, ValueTransform> {
        &self.spec.transforms
    }

    pub fn spec(&self) -> &ProfileSpec {
        &self.spec
    }

    /// 규칙 상태를 초기화한 뒤 입력을 스캔하고 변환을 적용합니다.
    pub fn scan_reader<R: BufRead>(&mut self, reader: R) -> Result<ResultMap, LogScanError> {
        self.rules.reset();
        let mut result = self.rules.scan_reader(reader)?;
        self.apply_transforms(&mut result);
        Ok(result)
    }

    /// 메모리 상의 줄들을 스캔합니다.
    pub fn scan_lines<I, S>(&mut self, lines: I) -> Result<ResultMap, LogScanError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rules.reset();
        let mut result = self.rules.scan(lines)?;
        self.apply_transforms(&mut result);
        Ok(result)
    }

    /// 파일 하나를 스캔합니다.
    pub fn scan_file(&mut self, path: impl AsRef<Path>) -> Result<ResultMap, LogScanError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LogScanError::Read {
            path: path.display().to_string(),
            source,
        })?;

        tracing::debug!(profile = %self.name(), path = %path.display(), "scanning file");

        self.scan_reader(BufReader::new(file)).map_err(|e| match e {
            LogScanError::Io(source) => LogScanError::Read {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    fn apply_transforms(&self, result: &mut ResultMap) {
        for (key, transform) in &self.spec.transforms {
            let Some(value) = result.get(key).map(str::to_owned) else {
                continue;
            };
            match transform.apply(&value) {
                Some(converted) => {
                    result.replace(key, converted);
                }
                None => {
                    tracing::warn!(
                        profile = %self.spec.name,
                        key = %key,
                        value = %value,
                        transform = %transform,
                        "value is not numeric, leaving unchanged"
                    );
                }
            }
        }
    }
}
