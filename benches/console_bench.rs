//! 控制台性能基准测试
//!
//! 使用 Criterion 框架进行性能测试，包括：
//! - 描述符解析基准
//! - 排序基准（不同字段和方向）
//! - 过滤基准
//! - 完整加载流程基准

use std::sync::Arc;

use bundle_console::bundle::{filter_records, sort_records};
use bundle_console::{
    BundleConsole, CollectingNotifier, ConsoleConfig, DescriptorParser, InMemoryRegistry,
    ModuleRecord, RegistrySnapshot, SortDirection, SortField, SortSpec,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ============================================================================
// 测试辅助
// ============================================================================

const STATES: [&str; 4] = ["ACTIVE", "RESOLVED", "INSTALLED", ""];

/// 生成描述符，其中每 7 条缺失版本
fn descriptors(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let version = if i % 7 == 0 { String::new() } else { format!("{}.{}.{}", i % 5, i % 11, i % 3) };
            format!("module-{:05}/{}:{}", (i * 7919) % count, version, STATES[i % STATES.len()])
        })
        .collect()
}

fn records(count: usize) -> Vec<ModuleRecord> {
    DescriptorParser::parse_installed_all(&descriptors(count))
}

// ============================================================================
// 解析
// ============================================================================

fn parse_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("descriptor_parse");

    for count in [100, 1_000, 10_000] {
        let input = descriptors(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &input, |b, input| {
            b.iter(|| DescriptorParser::parse_installed_all(black_box(input)))
        });
    }

    group.finish();
}

// ============================================================================
// 排序
// ============================================================================

fn sort_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_records");
    let input = records(10_000);
    group.throughput(Throughput::Elements(input.len() as u64));

    for field in [SortField::Name, SortField::Version, SortField::State] {
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let spec = SortSpec::new(field, direction);
            group.bench_function(BenchmarkId::new(field.as_str(), direction.as_str()), |b| {
                b.iter_batched(
                    || input.clone(),
                    |mut records| sort_records(&mut records, spec),
                    criterion::BatchSize::LargeInput,
                )
            });
        }
    }

    group.finish();
}

// ============================================================================
// 过滤
// ============================================================================

fn filter_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_records");
    let input = records(10_000);
    group.throughput(Throughput::Elements(input.len() as u64));

    for needle in ["", "module-000", "MODULE-09999", "no-match"] {
        group.bench_with_input(BenchmarkId::new("needle", format!("{:?}", needle)), &needle, |b, needle| {
            b.iter(|| filter_records(black_box(&input), needle))
        });
    }

    group.finish();
}

// ============================================================================
// 完整加载流程
// ============================================================================

fn console_load_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let registry = Arc::new(InMemoryRegistry::new(RegistrySnapshot {
        bundles: Vec::new(),
        available_updates: descriptors(1_000)
            .into_iter()
            .map(|d| format!("{}:9.9.9", d.split(':').next().unwrap_or_default()))
            .collect(),
        last_update_time: None,
    }));

    c.bench_function("console_load_1000_updates", |b| {
        b.to_async(&rt).iter(|| {
            let registry = registry.clone();
            async move {
                let mut console = BundleConsole::new(
                    ConsoleConfig::default(),
                    registry,
                    Arc::new(CollectingNotifier::new()),
                )
                .unwrap();
                console.load().await.unwrap();
                black_box(console.available_updates().len())
            }
        })
    });
}

criterion_group!(
    benches,
    parse_benchmark,
    sort_benchmark,
    filter_benchmark,
    console_load_benchmark
);
criterion_main!(benches);
