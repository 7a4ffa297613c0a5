#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use drstat_log_scan::RuleSet;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 규칙 목록 (최대 8개로 제한)
    rules: Vec<FuzzRule>,
    /// 스캔할 줄
    lines: Vec<String>,
}

#[derive(Arbitrary, Debug)]
struct FuzzRule {
    keys: Vec<String>,
    pattern: String,
    active: bool,
    trigger: Option<String>,
}

fuzz_target!(|input: FuzzInput| {
    let mut rules = RuleSet::new();
    for rule in input.rules.iter().take(8) {
        // 잘못된 규칙은 등록 단계에서 거부되어야 하고 크래시는 안 됨
        let _ = rules.add(
            rule.keys.iter().take(4).cloned(),
            &rule.pattern,
            rule.active,
            rule.trigger.as_deref(),
        );
    }

    let first = rules.scan(&input.lines);
    rules.reset();
    let second = rules.scan(&input.lines);

    // reset 후 재스캔은 같은 결과
    match (first, second) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
        (a, b) => panic!("replay diverged: {a:?} vs {b:?}"),
    }
});
