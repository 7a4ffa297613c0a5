//! 규칙 집합 스캔 벤치마크
//!
//! 내장 프로파일의 줄 처리량과 규칙 수에 따른 스케일링을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use drstat_log_scan::profile::builtin;
use drstat_log_scan::{FieldRule, ResultMap, RuleSet};

/// 라우터 로그와 비슷한 형태의 합성 로그
fn synthetic_route_log(iterations: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(iterations * 4 + 8);
    for i in 0..iterations {
        lines.push(format!("[info] RRR iteration {i}: 1234 nets rerouted"));
        lines.push(format!("[info] SumW   | {i}.5   | 10   | 20   | 3   | 4   |"));
        lines.push(format!("[info] BigSumV   | {i}   | 6   | 7   |"));
        lines.push("[debug] shape 12 overlaps 13".to_owned());
    }
    lines.push("[info] Finish all RRR iterations and PostRoute".to_owned());
    lines.push("[info] SumW   | 1234.5   | 10   | 20   | 3   | 4   |".to_owned());
    lines.push("[info] BigSumV   | 55   | 6   | 7   |".to_owned());
    lines.push("[info] # min-area vio: 2".to_owned());
    lines.push("[info] total score = 1.5e+07".to_owned());
    lines.push("\tElapsed (wall clock) time (h:mm:ss or m:ss): 1:02:03".to_owned());
    lines.push("\tMaximum resident set size (kbytes): 524288".to_owned());
    lines
}

fn bench_route_profile_scan(c: &mut Criterion) {
    let mut profile = builtin::route().unwrap();
    let lines = synthetic_route_log(1_000);

    let mut group = c.benchmark_group("route_profile");
    group.throughput(Throughput::Elements(lines.len() as u64));

    group.bench_function("scan_lines", |b| {
        b.iter(|| profile.scan_lines(black_box(&lines)).unwrap())
    });

    group.finish();
}

fn bench_single_rule_visit(c: &mut Criterion) {
    let mut rule = FieldRule::new(
        ["mem"],
        r"\tMaximum resident set size \(kbytes\): (\d+)",
        true,
        None,
    )
    .unwrap();
    let line = "[info] RRR iteration 7: 1234 nets rerouted";

    let mut group = c.benchmark_group("single_rule");
    group.throughput(Throughput::Elements(1));

    group.bench_function("anchored_miss", |b| {
        let mut result = ResultMap::new();
        b.iter(|| rule.visit(&mut result, black_box(line)).unwrap())
    });

    group.finish();
}

fn bench_rule_count_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("rules_scaling");
    let line = "[info] nothing interesting here";

    for rule_count in [1_usize, 10, 50, 100] {
        let mut rules = RuleSet::new();
        for i in 0..rule_count {
            rules
                .add([format!("k{i}")], &format!(r".*key{i} = (\d+)"), true, None)
                .unwrap();
        }

        group.throughput(Throughput::Elements(rule_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(rule_count),
            &rule_count,
            |b, _| {
                let mut result = ResultMap::new();
                b.iter(|| rules.visit_line(&mut result, black_box(line)).unwrap())
            },
        );
    }

    group.finish();
}

fn bench_profile_compilation(c: &mut Criterion) {
    let mut group = c.benchmark_group("profile_compilation");

    group.bench_function("compile_route", |b| b.iter(|| builtin::route().unwrap()));
    group.bench_function("compile_eval", |b| b.iter(|| builtin::eval().unwrap()));

    group.finish();
}

criterion_group!(
    benches,
    bench_route_profile_scan,
    bench_single_rule_visit,
    bench_rule_count_scaling,
    bench_profile_compilation
);
criterion_main!(benches);
