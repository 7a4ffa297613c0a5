#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`rule`]: 순차 필드 추출 엔진 (필드 규칙, 규칙 집합)
//! - [`result`]: 한 번만 기록 가능한 스캔 결과 매핑
//! - [`profile`]: YAML 프로파일, 내장 `route`/`eval` 프로파일, 사후 값 변환
//! - [`report`]: 정렬된 텍스트 결과 테이블
//! - [`scanner`]: 파일/실행 디렉토리 스캔 및 로그 종류 판별
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! log file -> LogKind::detect -> Profile (RuleSet + transforms) -> ResultMap -> ResultTable
//!                  |                     |
//!           marker substring      first match wins per line
//! ```

pub mod error;
pub mod profile;
pub mod report;
pub mod result;
pub mod rule;
pub mod scanner;

// --- 주요 타입 re-export ---

// 에러
pub use error::LogScanError;

// 규칙 엔진
pub use rule::{FieldRule, FieldRuleSpec, RuleSet, RuleState};

// 결과
pub use result::{DuplicateKey, ResultMap};

// 프로파일
pub use profile::{Profile, ProfileLoader, ProfileSpec, ValueTransform};

// 리포트
pub use report::{DEFAULT_PLACEHOLDER, ResultTable};

// 스캐너
pub use scanner::{LogKind, RunLayout, ScanMode, ScanTask, ScannedLog, StatReport, StatScanner};
