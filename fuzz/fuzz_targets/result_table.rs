#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use drstat_log_scan::{ResultMap, ResultTable};

#[derive(Arbitrary, Debug)]
struct FuzzTable {
    columns: Vec<String>,
    rows: Vec<Vec<(String, String)>>,
    placeholder: String,
}

fuzz_target!(|input: FuzzTable| {
    let rows: Vec<ResultMap> = input
        .rows
        .iter()
        .take(16)
        .map(|pairs| {
            let mut row = ResultMap::new();
            for (key, value) in pairs {
                let _ = row.try_insert(key, value.as_str());
            }
            row
        })
        .collect();

    let mut table = ResultTable::new(input.columns.iter().cloned(), input.placeholder);
    for row in &rows {
        table.push(row);
    }

    let text = table.to_text();
    if input.columns.is_empty() {
        assert!(text.is_empty());
    } else {
        // 헤더 + 구분선 + 행. 셀에 개행이 있으면 줄 수가 늘어날 수 있음
        assert!(text.lines().count() >= rows.len() + 2);
    }
});
