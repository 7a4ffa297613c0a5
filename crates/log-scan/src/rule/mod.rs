//! 순차 필드 추출 엔진 -- 순서 있는 규칙 집합으로 로그에서 필드를 뽑아냅니다.
//!
//! 줄마다 등록 순서대로 규칙을 방문하고, 처음 매칭된 규칙에서 멈춥니다.
//! 매칭된 규칙의 캡처 그룹은 [`ResultMap`]에 키별로 기록됩니다.
//!
//! # 아키텍처
//! - [`RuleSet`]: 규칙 순서, 줄 단위 디스패치, 매칭 카운터
//! - [`field`]: 활성화 상태 머신을 가진 단일 규칙
//! - [`types`]: 규칙 정의 데이터 구조
//!
//! # 사용 예시
//! ```
//! use drstat_log_scan::rule::RuleSet;
//!
//! let mut rules = RuleSet::new();
//! rules.add(["v"], r"value=(\d+)", false, Some("START")).unwrap();
//! rules.add(["x"], "(ignore)", true, None).unwrap();
//!
//! let result = rules.scan(["value=5", "START", "value=5"]).unwrap();
//! assert_eq!(result.get("v"), Some("5"));
//! assert!(!result.contains_key("x"));
//! ```

pub mod field;
pub mod types;

pub use field::{FieldRule, RuleState};
pub use types::FieldRuleSpec;

use std::collections::BTreeSet;
use std::io::BufRead;

use crate::error::LogScanError;
use crate::result::ResultMap;

/// 순서 있는 필드 규칙 집합
///
/// 규칙은 가변 활성화 상태를 가지므로 한 인스턴스를 여러 스캔에서 동시에 쓸 수 없습니다.
/// 다른 파일을 스캔하기 전에는 소유자가 [`RuleSet::reset`]을 호출해야 합니다.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<FieldRule>,
    /// 성공적으로 추출한 줄 수
    match_count: u64,
}

impl RuleSet {
    /// 빈 규칙 집합을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 규칙 정의 목록으로부터 규칙 집합을 만듭니다.
    pub fn from_specs<'a>(
        specs: impl IntoIterator<Item = &'a FieldRuleSpec>,
    ) -> Result<Self, LogScanError> {
        let mut set = Self::new();
        for spec in specs {
            set.add_rule(FieldRule::from_spec(spec)?);
        }
        Ok(set)
    }

    /// 규칙을 컴파일해 맨 뒤에 추가합니다.
    pub fn add<K: Into<String>>(
        &mut self,
        keys: impl IntoIterator<Item = K>,
        pattern: &str,
        active: bool,
        trigger: Option<&str>,
    ) -> Result<(), LogScanError> {
        let rule = FieldRule::new(keys, pattern, active, trigger)?;
        self.add_rule(rule);
        Ok(())
    }

    /// 컴파일된 규칙을 맨 뒤에 추가합니다.
    ///
    /// 다른 규칙과 같은 키를 가진 규칙도 등록할 수 있습니다.
    /// 한 스캔에서 둘 다 매칭되는 경우에만 에러가 됩니다.
    pub fn add_rule(&mut self, rule: FieldRule) {
        if rule.is_inert() {
            tracing::debug!(rule = %rule.label(), "rule starts inactive without trigger");
        }
        self.rules.push(rule);
    }

    /// 한 줄을 방문합니다. 매칭된 규칙의 인덱스를 반환합니다.
    ///
    /// 첫 번째로 매칭된 규칙 이후의 규칙은 이 줄에 대해 방문하지 않습니다.
    pub fn visit_line(
        &mut self,
        result: &mut ResultMap,
        line: &str,
    ) -> Result<Option<usize>, LogScanError> {
        for (idx, rule) in self.rules.iter_mut().enumerate() {
            if rule.visit(result, line)? {
                self.match_count += 1;
                return Ok(Some(idx));
            }
        }
        Ok(None)
    }

    /// 주어진 줄들을 한 번 훑어 새 결과 매핑을 만듭니다.
    ///
    /// 규칙 상태를 초기화하지 않습니다.
    pub fn scan<I, S>(&mut self, lines: I) -> Result<ResultMap, LogScanError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut result = ResultMap::new();
        for line in lines {
            self.visit_line(&mut result, line.as_ref())?;
        }
        Ok(result)
    }

    /// 줄 단위 입력을 스캔합니다.
    ///
    /// 줄 끝의 `\n`/`\r\n`은 제거되고, UTF-8이 아닌 바이트는 대체 문자로 바뀝니다.
    pub fn scan_reader<R: BufRead>(&mut self, mut reader: R) -> Result<ResultMap, LogScanError> {
        let mut result = ResultMap::new();
        let mut buf = Vec::new();
        let mut lines = 0_u64;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            lines += 1;
            let line = String::from_utf8_lossy(trim_line_end(&buf));
            self.visit_line(&mut result, &line)?;
        }

        tracing::debug!(
            lines,
            matched = self.match_count,
            keys = result.len(),
            "scan finished"
        );
        Ok(result)
    }

    /// 모든 규칙을 초기 상태로, 카운터를 0으로 되돌립니다.
    pub fn reset(&mut self) {
        for rule in &mut self.rules {
            rule.reset();
        }
        self.match_count = 0;
    }

    pub fn match_count(&self) -> u64 {
        self.match_count
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// 규칙들이 기록할 수 있는 모든 키
    pub fn produced_keys(&self) -> BTreeSet<&str> {
        self.rules
            .iter()
            .flat_map(|r| r.keys().iter().map(String::as_str))
            .collect()
    }
}

fn trim_line_end(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_rules() -> RuleSet {
        let mut rules = RuleSet::new();
        rules
            .add(["v"], r"value=(\d+)", false, Some("START"))
            .unwrap();
        rules.add(["x"], "(ignore)", true, None).unwrap();
        rules
    }

    #[test]
    fn mem_rule_extracts_first_fitting_line() {
        let mut rules = RuleSet::new();
        rules
            .add(
                ["mem"],
                r"\tMaximum resident set size \(kbytes\): (\d+)",
                true,
                None,
            )
            .unwrap();

        let mut result = rules
            .scan([
                "foo",
                "\tMaximum resident set size (kbytes): 524288",
                "bar",
            ])
            .unwrap();
        assert_eq!(result.get("mem"), Some("524288"));
        assert_eq!(result.len(), 1);
        assert_eq!(rules.match_count(), 1);

        // 이후 방문은 결과를 바꾸지 않음
        rules
            .visit_line(&mut result, "\tMaximum resident set size (kbytes): 1")
            .unwrap();
        assert_eq!(result.get("mem"), Some("524288"));
    }

    #[test]
    fn trigger_scenario_leaves_untouched_key_missing() {
        let mut rules = start_rules();
        let result = rules.scan(["value=5", "START", "value=5"]).unwrap();

        assert_eq!(result.get("v"), Some("5"));
        assert_eq!(result.get_or("x", "N/A"), "N/A");
        assert_eq!(rules.match_count(), 1);
    }

    #[test]
    fn first_match_wins_per_line() {
        let mut rules = RuleSet::new();
        rules.add(["a"], r"(\d+)", true, None).unwrap();
        rules.add(["b"], r"(\d+)", true, None).unwrap();

        let mut result = ResultMap::new();
        assert_eq!(rules.visit_line(&mut result, "42").unwrap(), Some(0));
        assert!(!result.contains_key("b"));
        // a가 비활성화된 뒤에는 b가 매칭
        assert_eq!(rules.visit_line(&mut result, "43").unwrap(), Some(1));
        assert_eq!(result.get("b"), Some("43"));
        assert_eq!(rules.visit_line(&mut result, "44").unwrap(), None);
    }

    #[test]
    fn alternative_rules_for_same_key_are_allowed() {
        let mut rules = RuleSet::new();
        rules
            .add(["#sv"], r".*Total via count \|[ ]+([\d.]+)", true, None)
            .unwrap();
        rules
            .add(["#sv"], r".*Total SCut via count \|[ ]+([\d.]+)", true, None)
            .unwrap();

        let result = rules.scan(["| Total SCut via count |   1234 |"]).unwrap();
        assert_eq!(result.get("#sv"), Some("1234"));
    }

    #[test]
    fn same_key_from_two_rules_is_fatal() {
        let mut rules = RuleSet::new();
        rules.add(["k"], r"a=(\d+)", true, None).unwrap();
        rules.add(["k"], r"b=(\d+)", true, None).unwrap();

        let err = rules.scan(["a=1", "b=2"]).unwrap_err();
        match err {
            LogScanError::DuplicateKey { key, .. } => assert_eq!(key, "k"),
            other => panic!("expected DuplicateKey, got {other:?}"),
        }
    }

    #[test]
    fn reset_and_replay_reproduces_mapping() {
        let mut rules = start_rules();
        let lines = ["value=1", "START", "value=2", "ignore", "START", "value=3"];

        let first = rules.scan(lines).unwrap();
        let count = rules.match_count();
        rules.reset();
        assert_eq!(rules.match_count(), 0);
        let second = rules.scan(lines).unwrap();

        assert_eq!(first, second);
        assert_eq!(rules.match_count(), count);
    }

    #[test]
    fn scan_without_reset_keeps_state() {
        let mut rules = start_rules();
        rules.scan(["START"]).unwrap();
        // 이전 스캔에서 활성화된 상태가 유지됨
        let result = rules.scan(["value=9"]).unwrap();
        assert_eq!(result.get("v"), Some("9"));
    }

    #[test]
    fn scan_reader_strips_line_terminators() {
        let mut rules = RuleSet::new();
        rules.add(["v"], r"value=(\d+)$", true, None).unwrap();
        rules.add(["w"], r"w=(.*)", true, None).unwrap();

        let input: &[u8] = b"value=7\r\nw=end\n";
        let result = rules.scan_reader(input).unwrap();
        assert_eq!(result.get("v"), Some("7"));
        assert_eq!(result.get("w"), Some("end"));
    }

    #[test]
    fn scan_reader_tolerates_invalid_utf8() {
        let mut rules = RuleSet::new();
        rules.add(["v"], r"value=(\d+)", true, None).unwrap();

        let input: &[u8] = b"\xff\xfe junk\nvalue=3";
        let result = rules.scan_reader(input).unwrap();
        assert_eq!(result.get("v"), Some("3"));
    }

    #[test]
    fn produced_keys_collects_all_rule_keys() {
        let rules = start_rules();
        let keys: Vec<_> = rules.produced_keys().into_iter().collect();
        assert_eq!(keys, vec!["v", "x"]);
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn from_specs_preserves_order() {
        let specs = vec![
            FieldRuleSpec::new(["a"], r"(a)"),
            FieldRuleSpec::new(["b"], r"(b)").triggered_by("go"),
        ];
        let rules = RuleSet::from_specs(&specs).unwrap();
        assert_eq!(rules.rules()[0].keys(), ["a"]);
        assert_eq!(rules.rules()[1].state(), RuleState::Inactive);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn line() -> impl Strategy<Value = String> {
            prop_oneof![
                Just("START".to_owned()),
                Just("ignore".to_owned()),
                (0u32..1000).prop_map(|n| format!("value={n}")),
                (0u32..1000).prop_map(|n| format!("other={n}")),
                "[a-z ]{0,12}",
            ]
        }

        fn rules() -> RuleSet {
            let mut rules = RuleSet::new();
            rules
                .add(["v"], r"value=(\d+)", false, Some("START"))
                .unwrap();
            rules.add(["o"], r"other=(\d+)", true, None).unwrap();
            rules.add(["x"], "(ignore)", true, None).unwrap();
            rules
        }

        proptest! {
            #[test]
            fn reset_replay_is_deterministic(lines in prop::collection::vec(line(), 0..40)) {
                let mut set = rules();
                let first = set.scan(&lines);
                let count = set.match_count();
                set.reset();
                let second = set.scan(&lines);

                prop_assert_eq!(first.is_ok(), second.is_ok());
                if let (Ok(a), Ok(b)) = (first, second) {
                    prop_assert_eq!(a, b);
                    prop_assert_eq!(count, set.match_count());
                }
            }

            #[test]
            fn triggered_rule_ignores_lines_before_trigger(lines in prop::collection::vec(line(), 0..40)) {
                let mut set = rules();
                let before_trigger: Vec<_> = lines
                    .iter()
                    .take_while(|l| !l.contains("START"))
                    .cloned()
                    .collect();
                let result = set.scan(&before_trigger).unwrap();
                prop_assert!(!result.contains_key("v"));
            }
        }
    }
}
