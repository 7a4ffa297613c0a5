//! 프로파일 로더 -- YAML 프로파일 파일을 디스크에서 로드합니다.
//!
//! 디렉토리 내의 `.yml`/`.yaml` 파일을 이름순으로 파싱합니다.
//! 개별 파일 로딩 실패는 경고 로그를 남기고 건너뜁니다.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::LogScanError;

use super::{Profile, ProfileSpec};

/// 프로파일 파일 최대 크기
const MAX_PROFILE_FILE_SIZE: u64 = 1024 * 1024; // 1MB

/// 프로파일 로더
pub struct ProfileLoader;

impl ProfileLoader {
    /// 디렉토리에서 모든 YAML 프로파일을 로드합니다.
    ///
    /// 이름이 중복된 프로파일은 먼저 로드된 것만 유지합니다.
    ///
    /// # Errors
    /// 디렉토리를 읽을 수 없는 경우
    pub async fn load_directory(dir: impl AsRef<Path>) -> Result<Vec<Profile>, LogScanError> {
        let dir = dir.as_ref();
        let mut profiles = Vec::new();
        let mut seen_names = HashSet::new();

        for path in Self::yaml_files(dir).await? {
            match Self::load_file(&path).await {
                Ok(profile) => {
                    if !seen_names.insert(profile.name().to_owned()) {
                        tracing::warn!(
                            profile = %profile.name(),
                            path = %path.display(),
                            "duplicate profile name, skipping"
                        );
                        continue;
                    }
                    profiles.push(profile);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load profile file, skipping"
                    );
                }
            }
        }

        tracing::info!(
            dir = %dir.display(),
            count = profiles.len(),
            "loaded extraction profiles"
        );

        Ok(profiles)
    }

    /// 디렉토리 안의 `.yml`/`.yaml` 파일 경로를 이름순으로 반환합니다.
    pub async fn yaml_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, LogScanError> {
        let dir = dir.as_ref();
        let load_err = |reason: String| LogScanError::ProfileLoad {
            path: dir.display().to_string(),
            reason,
        };

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| load_err(format!("failed to read directory: {e}")))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| load_err(format!("failed to read directory entry: {e}")))?
        {
            let path = entry.path();
            let is_yaml = path
                .extension()
                .is_some_and(|ext| ext == "yml" || ext == "yaml");
            if is_yaml {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// 단일 YAML 파일에서 프로파일을 로드합니다.
    pub async fn load_file(path: impl AsRef<Path>) -> Result<Profile, LogScanError> {
        let path = path.as_ref();
        let load_err = |reason: String| LogScanError::ProfileLoad {
            path: path.display().to_string(),
            reason,
        };

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| load_err(format!("failed to read file metadata: {e}")))?;

        if metadata.len() > MAX_PROFILE_FILE_SIZE {
            return Err(load_err(format!(
                "file too large: {} bytes (max: {MAX_PROFILE_FILE_SIZE})",
                metadata.len()
            )));
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| load_err(format!("failed to read file: {e}")))?;

        Self::parse_yaml(&content, &path.display().to_string())
    }

    /// YAML 문자열을 파싱하고 프로파일을 컴파일합니다.
    pub fn parse_yaml(yaml_str: &str, source: &str) -> Result<Profile, LogScanError> {
        let spec: ProfileSpec =
            serde_yaml::from_str(yaml_str).map_err(|e| LogScanError::ProfileLoad {
                path: source.to_owned(),
                reason: format!("YAML parse error: {e}"),
            })?;

        Profile::compile(spec)
    }
}
