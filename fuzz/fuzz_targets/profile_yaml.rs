#![no_main]

use drstat_log_scan::ProfileLoader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // YAML 파서는 &str을 받으므로 UTF-8 변환 필요
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        if let Ok(mut profile) = ProfileLoader::parse_yaml(yaml_str, "fuzz-input.yml") {
            // 컴파일된 프로파일은 임의 입력에도 패닉 없이 스캔해야 함
            let _ = profile.scan_reader(data);
        }
    }
});
