//! 필드 규칙 -- 앵커링된 정규식 + 활성화 상태 머신
//!
//! [`FieldRule`]은 한 줄씩 방문하며 두 상태 사이를 오갑니다.
//!
//! ```text
//!            trigger 포함 줄                 패턴 매칭 성공
//! Inactive ------------------> Active ----------------------> Inactive
//!     ^                                                          |
//!     +------------------------ reset() -------------------------+
//!                          (초기 상태로 복귀)
//! ```
//!
//! 비활성 상태의 방문은 trigger 검사만 하고, 같은 줄에 대해 패턴 매칭을 하지 않습니다.

use regex::Regex;

use super::types::FieldRuleSpec;
use crate::error::LogScanError;
use crate::result::ResultMap;

/// 규칙의 활성화 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleState {
    /// trigger를 기다리는 중 (패턴 매칭 안 함)
    Inactive,
    /// 다음 줄부터 패턴 매칭 시도
    Active,
}

impl RuleState {
    fn from_active(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }
}

/// 컴파일된 필드 추출 규칙
#[derive(Debug, Clone)]
pub struct FieldRule {
    keys: Vec<String>,
    /// 사용자가 작성한 원래 패턴
    source: String,
    /// `\A(?:source)` 형태로 줄 시작에 앵커링된 정규식
    regex: Regex,
    state: RuleState,
    initial: RuleState,
    trigger: Option<String>,
}

impl FieldRule {
    /// 구성 요소로부터 규칙을 만듭니다.
    pub fn new<K: Into<String>>(
        keys: impl IntoIterator<Item = K>,
        pattern: &str,
        active: bool,
        trigger: Option<&str>,
    ) -> Result<Self, LogScanError> {
        let spec = FieldRuleSpec {
            keys: keys.into_iter().map(Into::into).collect(),
            pattern: pattern.to_owned(),
            active,
            trigger: trigger.map(str::to_owned),
        };
        Self::from_spec(&spec)
    }

    /// 규칙 정의를 검증하고 정규식을 컴파일합니다.
    ///
    /// 캡처 그룹 수가 키 수와 다르면 첫 매칭 전에 실패합니다.
    pub fn from_spec(spec: &FieldRuleSpec) -> Result<Self, LogScanError> {
        spec.validate()?;

        // 원래 패턴을 먼저 컴파일해 `a)(b` 같은 패턴이 래핑으로 우연히 유효해지는 것을 막음
        Regex::new(&spec.pattern).map_err(|e| LogScanError::RuleValidation {
            rule: spec.label(),
            reason: format!("invalid pattern: {e}"),
        })?;
        let regex = Regex::new(&format!(r"\A(?:{})", spec.pattern)).map_err(|e| {
            LogScanError::RuleValidation {
                rule: spec.label(),
                reason: format!("invalid pattern: {e}"),
            }
        })?;

        let groups = regex.captures_len() - 1;
        if groups != spec.keys.len() {
            return Err(LogScanError::RuleValidation {
                rule: spec.label(),
                reason: format!(
                    "pattern has {groups} capture group(s) but {} key(s) are bound",
                    spec.keys.len()
                ),
            });
        }

        let initial = RuleState::from_active(spec.active);
        Ok(Self {
            keys: spec.keys.clone(),
            source: spec.pattern.clone(),
            regex,
            state: initial,
            initial,
            trigger: spec.trigger.clone(),
        })
    }

    /// 한 줄을 방문합니다. 값이 기록되었으면 `true`를 반환합니다.
    ///
    /// # Errors
    /// 매칭된 키 중 하나라도 `result`에 이미 있으면 [`LogScanError::DuplicateKey`].
    /// 이 경우 `result`는 변경되지 않습니다.
    pub fn visit(&mut self, result: &mut ResultMap, line: &str) -> Result<bool, LogScanError> {
        if self.state == RuleState::Inactive {
            if let Some(ref trigger) = self.trigger {
                if line.contains(trigger.as_str()) {
                    self.state = RuleState::Active;
                    tracing::trace!(rule = %self.label(), "rule activated");
                }
            }
            return Ok(false);
        }

        let Some(caps) = self.regex.captures(line) else {
            return Ok(false);
        };

        if let Some(key) = self.keys.iter().find(|k| result.contains_key(k)) {
            return Err(LogScanError::DuplicateKey {
                key: key.clone(),
                rule: self.label(),
            });
        }

        for (idx, key) in self.keys.iter().enumerate() {
            let value = caps.get(idx + 1).map_or("", |m| m.as_str());
            result
                .try_insert(key.as_str(), value)
                .map_err(|dup| LogScanError::DuplicateKey {
                    key: dup.0,
                    rule: self.label(),
                })?;
        }

        self.state = RuleState::Inactive;
        Ok(true)
    }

    /// 초기 활성화 상태로 되돌립니다. 이미 기록된 결과는 건드리지 않습니다.
    pub fn reset(&mut self) {
        self.state = self.initial;
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn pattern(&self) -> &str {
        &self.source
    }

    pub fn trigger(&self) -> Option<&str> {
        self.trigger.as_deref()
    }

    pub fn state(&self) -> RuleState {
        self.state
    }

    pub fn initial_state(&self) -> RuleState {
        self.initial
    }

    pub fn is_active(&self) -> bool {
        self.state == RuleState::Active
    }

    /// trigger 없이 비활성으로 시작해 절대 활성화될 수 없는 규칙인지
    pub fn is_inert(&self) -> bool {
        self.initial == RuleState::Inactive && self.trigger.is_none()
    }

    /// 표시 이름 (`[key1, key2]`)
    pub fn label(&self) -> String {
        format!("[{}]", self.keys.join(", "))
    }
}
