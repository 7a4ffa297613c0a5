//! 결과 테이블 -- 여러 [`ResultMap`]을 정렬된 텍스트 표로 출력합니다.
//!
//! ```text
//! wire space | mem
//! -----------|----
//! 1234.5     | 0.5
//! N/A        | 1.0
//! ```

use std::fmt;
use std::io::{self, Write};

use crate::result::ResultMap;

/// 기본 누락 값 표시
pub const DEFAULT_PLACEHOLDER: &str = "N/A";

/// 정렬된 텍스트 결과 테이블
#[derive(Debug, Clone)]
pub struct ResultTable<'a> {
    columns: Vec<String>,
    placeholder: String,
    rows: Vec<&'a ResultMap>,
}

impl<'a> ResultTable<'a> {
    pub fn new<C: Into<String>>(
        columns: impl IntoIterator<Item = C>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            placeholder: placeholder.into(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: &'a ResultMap) {
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 컬럼별 폭 (헤더와 모든 값 중 가장 긴 문자 수)
    pub fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .map(|column| {
                self.rows
                    .iter()
                    .map(|row| self.cell(row, column).chars().count())
                    .fold(column.chars().count(), usize::max)
            })
            .collect()
    }

    /// 테이블을 출력합니다. 컬럼이 없으면 아무것도 쓰지 않습니다.
    pub fn render_text(&self, w: &mut dyn Write) -> io::Result<()> {
        write!(w, "{self}")
    }

    /// 테이블을 문자열로 렌더링합니다.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    fn cell<'r>(&'r self, row: &'r ResultMap, column: &str) -> &'r str {
        row.get_or(column, &self.placeholder)
    }
}

impl fmt::Display for ResultTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return Ok(());
        }
        let widths = self.widths();

        let header: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        write_row(f, &header, &widths)?;

        let last = widths.len() - 1;
        for width in &widths[..last] {
            write!(f, "{}-|-", "-".repeat(*width))?;
        }
        writeln!(f, "{}", "-".repeat(widths[last]))?;

        for row in &self.rows {
            let cells: Vec<&str> = self
                .columns
                .iter()
                .map(|column| self.cell(row, column))
                .collect();
            write_row(f, &cells, &widths)?;
        }
        Ok(())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[&str], widths: &[usize]) -> fmt::Result {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    writeln!(f, "{line}")
}
