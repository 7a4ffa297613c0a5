//! 스캔 결과 매핑
//!
//! [`ResultMap`]은 로그 파일 하나를 스캔하는 동안 추출된 `키 -> 값`을 누적합니다.
//! 스캔 중 기록은 [`ResultMap::try_insert`]로만 이루어지며, 이미 있는 키를 다시
//! 기록하려 하면 덮어쓰지 않고 [`DuplicateKey`]를 반환합니다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 이미 존재하는 키에 값을 기록하려 했을 때의 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("key '{0}' already present")]
pub struct DuplicateKey(pub String);

/// 스캔 결과 매핑 (키 -> 문자열 값)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultMap {
    values: BTreeMap<String, String>,
}

impl ResultMap {
    /// 빈 결과 매핑을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 키가 없을 때만 값을 기록합니다.
    pub fn try_insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DuplicateKey> {
        let key = key.into();
        if self.values.contains_key(&key) {
            return Err(DuplicateKey(key));
        }
        self.values.insert(key, value.into());
        Ok(())
    }

    /// 이미 있는 키의 값을 교체하고 이전 값을 반환합니다.
    ///
    /// 키가 없으면 아무것도 하지 않고 `None`을 반환합니다.
    /// 스캔 이후의 값 변환에만 사용합니다.
    pub fn replace(&mut self, key: &str, value: impl Into<String>) -> Option<String> {
        self.values
            .get_mut(key)
            .map(|slot| std::mem::replace(slot, value.into()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 값이 없으면 `placeholder`를 반환합니다.
    pub fn get_or<'a>(&'a self, key: &str, placeholder: &'a str) -> &'a str {
        self.get(key).unwrap_or(placeholder)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 키 순서대로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
