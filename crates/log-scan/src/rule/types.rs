//! 필드 규칙 데이터 타입
//!
//! 프로파일 YAML의 `rules` 항목에서 역직렬화되는 구조체를 정의합니다.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::LogScanError;

/// 필드 추출 규칙 정의
///
/// # YAML 스키마
/// ```yaml
/// keys: [wire space, wire-wire, wire-fix]
/// pattern: '.*SumW[ ]+\| ([\d.]+)[ ]+\| [\d.]+[ ]+\| [\d.]+[ ]+\| ([\d.]+)[ ]+\| ([\d.]+)[ ]+'
/// active: false
/// trigger: Finish all RRR iterations and PostRoute
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRuleSpec {
    /// 캡처 그룹 순서대로 바인딩될 키 목록
    pub keys: Vec<String>,
    /// 줄 시작에 앵커링되어 적용되는 정규식
    pub pattern: String,
    /// 초기 활성 상태 (기본값: 활성)
    #[serde(default = "default_active")]
    pub active: bool,
    /// 비활성 규칙을 활성화하는 부분 문자열
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

fn default_active() -> bool {
    true
}

impl FieldRuleSpec {
    /// 항상 활성인 규칙 정의를 만듭니다.
    pub fn new<K: Into<String>>(keys: impl IntoIterator<Item = K>, pattern: &str) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            pattern: pattern.to_owned(),
            active: true,
            trigger: None,
        }
    }

    /// 비활성 상태로 시작해 `trigger`가 보이면 활성화되는 규칙으로 바꿉니다.
    pub fn triggered_by(mut self, trigger: &str) -> Self {
        self.active = false;
        self.trigger = Some(trigger.to_owned());
        self
    }

    /// 로그/에러 메시지에 쓰는 규칙 표시 이름 (`[key1, key2]`)
    pub fn label(&self) -> String {
        format!("[{}]", self.keys.join(", "))
    }

    /// 정규식 컴파일 이전의 구조적 유효성을 검증합니다.
    ///
    /// 정규식 자체와 캡처 그룹 수는 [`FieldRule::from_spec`](super::FieldRule::from_spec)에서 검증합니다.
    pub fn validate(&self) -> Result<(), LogScanError> {
        if self.keys.is_empty() {
            return Err(LogScanError::RuleValidation {
                rule: self.label(),
                reason: "rule must bind at least one key".to_owned(),
            });
        }

        let mut seen = HashSet::new();
        for key in &self.keys {
            if key.trim().is_empty() {
                return Err(LogScanError::RuleValidation {
                    rule: self.label(),
                    reason: "keys must not be empty".to_owned(),
                });
            }
            if !seen.insert(key.as_str()) {
                return Err(LogScanError::RuleValidation {
                    rule: self.label(),
                    reason: format!("key '{key}' listed more than once"),
                });
            }
        }

        if self.pattern.is_empty() {
            return Err(LogScanError::RuleValidation {
                rule: self.label(),
                reason: "pattern must not be empty".to_owned(),
            });
        }

        if self.trigger.as_deref() == Some("") {
            return Err(LogScanError::RuleValidation {
                rule: self.label(),
                reason: "trigger must not be empty when set".to_owned(),
            });
        }

        Ok(())
    }
}
