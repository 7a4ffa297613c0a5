//! 내장 프로파일 (`route`, `eval`)
//!
//! YAML 정의는 `profiles/` 디렉토리에 있으며 컴파일 시점에 포함됩니다.

use crate::error::LogScanError;

use super::{Profile, ProfileLoader};

/// 라우터 로그 프로파일 정의
pub const ROUTE_YAML: &str = include_str!("../../profiles/route.yml");

/// 평가기 리포트 프로파일 정의
pub const EVAL_YAML: &str = include_str!("../../profiles/eval.yml");

/// 내장 프로파일 이름 목록
pub const NAMES: [&str; 2] = ["route", "eval"];

/// 내장 라우터 로그 프로파일
pub fn route() -> Result<Profile, LogScanError> {
    ProfileLoader::parse_yaml(ROUTE_YAML, "builtin:route")
}

/// 내장 평가기 리포트 프로파일
pub fn eval() -> Result<Profile, LogScanError> {
    ProfileLoader::parse_yaml(EVAL_YAML, "builtin:eval")
}

/// 이름으로 내장 프로파일을 찾습니다.
pub fn by_name(name: &str) -> Option<Result<Profile, LogScanError>> {
    match name {
        "route" => Some(route()),
        "eval" => Some(eval()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE_LOG: &[&str] = &[
        "[info] iter 3 | SumW   | 100.5   | 1   | 2   | 30   | 4   |",
        "[info] Finish all RRR iterations and PostRoute",
        "[info] SumW   | 1234.5   | 10   | 20   | 3   | 4   |",
        "[info] BigSumV   | 55   | 6   | 7   |",
        "[info] # min-area vio: 2",
        "[info] total score = 1.5e+07",
        "\tElapsed (wall clock) time (h:mm:ss or m:ss): 1:02:03",
        "\tMaximum resident set size (kbytes): 524288",
    ];

    #[test]
    fn builtin_profiles_compile() {
        for name in NAMES {
            let profile = by_name(name).unwrap().unwrap();
            assert_eq!(profile.name(), name);
        }
        assert!(by_name("view").is_none());
    }

    #[test]
    fn route_profile_extracts_all_columns() {
        let mut profile = route().unwrap();
        let result = profile.scan_lines(ROUTE_LOG).unwrap();

        assert_eq!(result.get("wire space"), Some("1234.5"));
        assert_eq!(result.get("wire-wire"), Some("3"));
        assert_eq!(result.get("wire-fix"), Some("4"));
        assert_eq!(result.get("via-via"), Some("55"));
        assert_eq!(result.get("via-wire"), Some("6"));
        assert_eq!(result.get("via-fix"), Some("7"));
        assert_eq!(result.get("min area"), Some("2"));
        assert_eq!(result.get("est score"), Some("1.5e+07"));
        assert_eq!(result.get("runtime"), Some("1:02:03"));
        assert_eq!(result.get("mem"), Some("0.5"));
        for column in profile.columns() {
            assert!(result.contains_key(column), "missing {column}");
        }
    }

    #[test]
    fn route_summary_before_marker_is_ignored() {
        let mut profile = route().unwrap();
        let result = profile.scan_lines(&ROUTE_LOG[..1]).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn eval_profile_accepts_both_via_count_wordings() {
        let mut profile = eval().unwrap();
        let old = profile
            .scan_lines(["| Total via count |     9876 |"])
            .unwrap();
        let new = profile
            .scan_lines(["| Total SCut via count |     9876 |"])
            .unwrap();
        assert_eq!(old.get("#sv"), Some("9876"));
        assert_eq!(new.get("#sv"), Some("9876"));
    }

    #[test]
    fn eval_profile_extracts_scores() {
        let mut profile = eval().unwrap();
        let result = profile
            .scan_lines([
                "| Guides and tracks Obedience |",
                "| Total wire length |   1000 |   250.5 |",
                "| Area of metal/cut shorts |   3 |   0.25 |",
                "| #open nets |   0 |",
                "| Total Score |   12345.6 |",
            ])
            .unwrap();
        assert_eq!(result.get("WL"), Some("250.5"));
        assert_eq!(result.get("short a"), Some("0.25"));
        assert_eq!(result.get("#o"), Some("0"));
        assert_eq!(result.get("tot"), Some("12345.6"));
        assert!(!result.contains_key("#sv"));
    }
}
