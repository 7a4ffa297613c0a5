//! 로그 스캔 에러 타입
//!
//! [`LogScanError`]는 규칙 등록, 프로파일 로딩, 로그 스캔 중 발생하는 모든 에러를 표현합니다.
//! 종료 코드 매핑은 CLI가 변형별로 직접 수행합니다.

/// 로그 스캔 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogScanError {
    /// 규칙 유효성 검증 실패 (등록 시점)
    #[error("rule validation error: rule {rule}: {reason}")]
    RuleValidation {
        /// 문제가 된 규칙 (키 목록 또는 패턴)
        rule: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// 한 스캔에서 같은 키를 두 번 기록하려 함
    ///
    /// 두 규칙이 같은 키를 소유하도록 등록된 작성 오류이며, 스캔을 즉시 중단합니다.
    #[error("duplicate key '{key}' written by rule {rule}")]
    DuplicateKey {
        /// 중복 기록된 키
        key: String,
        /// 두 번째로 기록하려던 규칙
        rule: String,
    },

    /// 프로파일 정의 오류
    #[error("profile error: '{profile}': {reason}")]
    ProfileValidation {
        /// 프로파일 이름
        profile: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// 프로파일 파일 로딩 실패
    #[error("profile load error: {path}: {reason}")]
    ProfileLoad {
        /// 프로파일 파일 경로
        path: String,
        /// 로딩 실패 사유
        reason: String,
    },

    /// 입력 로그 파일을 열거나 읽을 수 없음
    #[error("failed to read {path}: {source}")]
    Read {
        /// 입력 파일 경로
        path: String,
        /// 원인 I/O 에러
        #[source]
        source: std::io::Error,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
