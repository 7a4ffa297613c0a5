//! 통계 스캐너 -- 입력 파일 또는 실행 디렉토리를 스캔해 두 개의 결과 테이블을 만듭니다.
//!
//! # 처리 흐름
//! ```text
//! FILES... --plan_files--+
//!                        +--> [ScanTask] --scan_task--> [ScannedLog] --report--> StatReport
//! --dir DIR --plan_run_dir+        |
//!                            LogKind::detect (라우터 로그 / 평가 리포트)
//! ```
//!
//! 계획 단계와 스캔 단계가 분리되어 있어 호출자가 [`ScanTask`]들을 병렬로 스캔한 뒤
//! 입력 순서대로 [`StatScanner::report`]에 넘길 수 있습니다.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use drstat_core::config::StatConfig;
use serde::Serialize;

use crate::error::LogScanError;
use crate::profile::{Profile, builtin};
use crate::report::{DEFAULT_PLACEHOLDER, ResultTable};
use crate::result::ResultMap;

/// 실행 디렉토리 모드에서 추가되는 케이스 이름 키
pub const CASE_KEY: &str = "case";

/// 평가 리포트 판별 기본 마커
pub const DEFAULT_EVAL_MARKER: &str = "Guides and tracks Obedience";

/// 로그 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// 라우터 로그
    Route,
    /// 평가기 점수 리포트
    Eval,
}

impl LogKind {
    /// 어느 줄이든 `marker`를 포함하면 평가 리포트, 아니면 라우터 로그입니다.
    pub fn detect(path: impl AsRef<Path>, marker: &str) -> Result<Self, LogScanError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LogScanError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::detect_reader(BufReader::new(file), marker).map_err(|source| LogScanError::Read {
            path: path.display().to_string(),
            source,
        })
    }

    /// 줄 단위 입력에서 로그 종류를 판별합니다.
    pub fn detect_reader<R: BufRead>(mut reader: R, marker: &str) -> std::io::Result<Self> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(Self::Route);
            }
            if String::from_utf8_lossy(&buf).contains(marker) {
                return Ok(Self::Eval);
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::Eval => "eval",
        }
    }
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 실행 디렉토리 파일 배치 규칙
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    /// 평가 리포트 판별 마커
    pub eval_report_marker: String,
    /// 케이스 디렉토리 안의 평가 리포트 파일 이름
    pub eval_report_name: String,
    /// 라우터 로그 후보에서 제외할 파일 이름 접두사
    pub ignore_log_prefixes: Vec<String>,
}

impl Default for RunLayout {
    fn default() -> Self {
        Self {
            eval_report_marker: DEFAULT_EVAL_MARKER.to_owned(),
            eval_report_name: "eval.score.rpt".to_owned(),
            ignore_log_prefixes: vec!["innovus".to_owned()],
        }
    }
}

impl RunLayout {
    pub fn from_config(config: &StatConfig) -> Self {
        Self {
            eval_report_marker: config.eval_report_marker.clone(),
            eval_report_name: config.eval_report_name.clone(),
            ignore_log_prefixes: config.ignore_log_prefixes.clone(),
        }
    }

    /// 케이스 디렉토리의 라우터 로그 후보인지
    fn is_route_log(&self, file_name: &str) -> bool {
        file_name.ends_with(".log")
            && !file_name.ends_with("_eval.log")
            && !self
                .ignore_log_prefixes
                .iter()
                .any(|prefix| file_name.starts_with(prefix.as_str()))
    }
}

/// 스캔할 파일 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTask {
    pub path: PathBuf,
    /// 미리 알려진 로그 종류 (없으면 마커로 판별)
    pub kind: Option<LogKind>,
    /// 실행 디렉토리 모드의 케이스 이름
    pub case: Option<String>,
}

impl ScanTask {
    /// 종류를 판별해야 하는 단일 파일
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: None,
            case: None,
        }
    }

    fn in_case(path: PathBuf, kind: LogKind, case: &str) -> Self {
        Self {
            path,
            kind: Some(kind),
            case: Some(case.to_owned()),
        }
    }
}

/// 파일 하나의 스캔 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedLog {
    pub source: String,
    pub kind: LogKind,
    pub values: ResultMap,
}

/// 스캔 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// 명시적 파일 목록
    Files,
    /// 케이스별 하위 디렉토리를 가진 실행 디렉토리
    RunDir,
}

/// 라우터/평가 결과 모음
#[derive(Debug, Clone, Serialize)]
pub struct StatReport {
    #[serde(skip)]
    route_columns: Vec<String>,
    #[serde(skip)]
    eval_columns: Vec<String>,
    #[serde(skip)]
    placeholder: String,
    pub route: Vec<ScannedLog>,
    pub eval: Vec<ScannedLog>,
}

impl StatReport {
    pub fn route_columns(&self) -> &[String] {
        &self.route_columns
    }

    pub fn eval_columns(&self) -> &[String] {
        &self.eval_columns
    }

    /// 라우터 결과 테이블
    pub fn route_table(&self) -> ResultTable<'_> {
        self.table(&self.route_columns, &self.route)
    }

    /// 평가 결과 테이블
    pub fn eval_table(&self) -> ResultTable<'_> {
        self.table(&self.eval_columns, &self.eval)
    }

    fn table<'a>(&self, columns: &[String], logs: &'a [ScannedLog]) -> ResultTable<'a> {
        let mut table = ResultTable::new(columns.iter().cloned(), self.placeholder.clone());
        for log in logs {
            table.push(&log.values);
        }
        table
    }

    /// 두 테이블을 제목과 함께 출력합니다.
    pub fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "### ROUTER INFO")?;
        self.route_table().render_text(w)?;
        writeln!(w)?;
        writeln!(w, "### EVALUATOR INFO")?;
        self.eval_table().render_text(w)
    }
}

/// 통계 스캐너
///
/// 스캔마다 프로파일 복제본을 사용하므로 `&self`로 여러 스레드에서 호출할 수 있습니다.
#[derive(Debug, Clone)]
pub struct StatScanner {
    route: Profile,
    eval: Profile,
    layout: RunLayout,
    placeholder: String,
}

impl StatScanner {
    pub fn new(route: Profile, eval: Profile, layout: RunLayout) -> Self {
        Self {
            route,
            eval,
            layout,
            placeholder: DEFAULT_PLACEHOLDER.to_owned(),
        }
    }

    /// 내장 프로파일을 사용하는 스캐너
    pub fn builtin(layout: RunLayout) -> Result<Self, LogScanError> {
        Ok(Self::new(builtin::route()?, builtin::eval()?, layout))
    }

    /// 누락 값 표시를 바꿉니다.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn profile(&self, kind: LogKind) -> &Profile {
        match kind {
            LogKind::Route => &self.route,
            LogKind::Eval => &self.eval,
        }
    }

    pub fn layout(&self) -> &RunLayout {
        &self.layout
    }

    /// 입력 파일 목록을 스캔 작업으로 만듭니다. 존재하지 않는 파일은 경고 후 건너뜁니다.
    pub fn plan_files<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<ScanTask> {
        paths
            .iter()
            .map(|path| path.as_ref())
            .filter(|path| {
                let exists = path.is_file();
                if !exists {
                    tracing::warn!(path = %path.display(), "file does not exist, skipping");
                }
                exists
            })
            .map(ScanTask::file)
            .collect()
    }

    /// 실행 디렉토리의 각 하위 디렉토리(이름순)를 케이스로 보고 스캔 작업을 만듭니다.
    ///
    /// # Errors
    /// 실행 디렉토리 또는 케이스 디렉토리를 읽을 수 없는 경우
    pub fn plan_run_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<ScanTask>, LogScanError> {
        let dir = dir.as_ref();
        let mut cases = Vec::new();
        for entry in read_dir(dir)? {
            let path = entry.path();
            if path.is_dir() {
                cases.push((entry.file_name().to_string_lossy().into_owned(), path));
            }
        }
        cases.sort();

        let mut tasks = Vec::new();
        for (case, case_dir) in cases {
            match self.find_route_log(&case_dir)? {
                Some(log) => tasks.push(ScanTask::in_case(log, LogKind::Route, &case)),
                None => tracing::warn!(case = %case, "no router log in case directory"),
            }

            let report = case_dir.join(&self.layout.eval_report_name);
            if report.is_file() {
                tasks.push(ScanTask::in_case(report, LogKind::Eval, &case));
            } else {
                tracing::warn!(
                    case = %case,
                    path = %report.display(),
                    "evaluator report does not exist"
                );
            }
        }

        tracing::debug!(dir = %dir.display(), tasks = tasks.len(), "planned run directory");
        Ok(tasks)
    }

    fn find_route_log(&self, case_dir: &Path) -> Result<Option<PathBuf>, LogScanError> {
        let mut logs = Vec::new();
        for entry in read_dir(case_dir)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.layout.is_route_log(&name) && entry.path().is_file() {
                logs.push(entry.path());
            }
        }
        logs.sort();
        Ok(logs.into_iter().next())
    }

    /// 작업 하나를 스캔합니다. 프로파일 복제본을 사용합니다.
    pub fn scan_task(&self, task: &ScanTask) -> Result<ScannedLog, LogScanError> {
        let kind = match task.kind {
            Some(kind) => kind,
            None => LogKind::detect(&task.path, &self.layout.eval_report_marker)?,
        };
        tracing::debug!(path = %task.path.display(), kind = %kind, "processing file");

        let mut profile = self.profile(kind).clone();
        let mut values = profile.scan_file(&task.path)?;

        if let Some(ref case) = task.case {
            values
                .try_insert(CASE_KEY, case.as_str())
                .map_err(|dup| LogScanError::DuplicateKey {
                    key: dup.0,
                    rule: format!("[{CASE_KEY}]"),
                })?;
        }

        Ok(ScannedLog {
            source: task.path.display().to_string(),
            kind,
            values,
        })
    }

    /// 단일 파일을 스캔합니다.
    pub fn scan_file(&self, path: impl AsRef<Path>) -> Result<ScannedLog, LogScanError> {
        self.scan_task(&ScanTask::file(path.as_ref()))
    }

    /// 파일 목록을 순서대로 스캔합니다.
    pub fn scan_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<StatReport, LogScanError> {
        let logs = self
            .plan_files(paths)
            .iter()
            .map(|task| self.scan_task(task))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.report(ScanMode::Files, logs))
    }

    /// 실행 디렉토리를 순서대로 스캔합니다.
    pub fn scan_run_dir(&self, dir: impl AsRef<Path>) -> Result<StatReport, LogScanError> {
        let logs = self
            .plan_run_dir(dir)?
            .iter()
            .map(|task| self.scan_task(task))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.report(ScanMode::RunDir, logs))
    }

    /// 스캔 결과를 종류별로 나눠 리포트를 만듭니다. 입력 순서를 유지합니다.
    pub fn report(&self, mode: ScanMode, logs: Vec<ScannedLog>) -> StatReport {
        let (route, eval): (Vec<_>, Vec<_>) =
            logs.into_iter().partition(|log| log.kind == LogKind::Route);

        StatReport {
            route_columns: self.columns(mode, &self.route),
            eval_columns: self.columns(mode, &self.eval),
            placeholder: self.placeholder.clone(),
            route,
            eval,
        }
    }

    fn columns(&self, mode: ScanMode, profile: &Profile) -> Vec<String> {
        let mut columns = Vec::with_capacity(profile.columns().len() + 1);
        if mode == ScanMode::RunDir {
            columns.push(CASE_KEY.to_owned());
        }
        columns.extend(profile.columns().iter().cloned());
        columns
    }
}

fn read_dir(dir: &Path) -> Result<Vec<std::fs::DirEntry>, LogScanError> {
    let read_err = |source| LogScanError::Read {
        path: dir.display().to_string(),
        source,
    };
    std::fs::read_dir(dir)
        .map_err(read_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)
}
