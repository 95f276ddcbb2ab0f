use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use payment_filter::compiler;
use payment_filter::sql_compiler::{sql, FindQuery};
use payment_filter::{CmpOp, Filter, PaymentLeaf, SqlCompiler, PAYMENT_TYPE};
use uuid::Uuid;

fn field_name(leaf: &PaymentLeaf) -> String {
    leaf.field().name().to_string()
}

// 由 `depth` 个金额比较用 AND 连接成的向左倾斜链
fn chain(depth: usize) -> Filter {
    let mut f = Filter::by_amount(CmpOp::GreaterThan, 0.0).unwrap();
    for i in 1..depth {
        let leaf = Filter::by_amount(CmpOp::LessThan, i as f64).unwrap();
        f = Filter::and(f, leaf).unwrap();
    }
    f
}

fn example_filter() -> Filter {
    Filter::and(
        Filter::or(
            Filter::and(
                Filter::by_amount(CmpOp::GreaterOrEqual, 10.0).unwrap(),
                Filter::by_id(CmpOp::NotEqual, Uuid::nil()).unwrap(),
            )
            .unwrap(),
            Filter::by_amount(CmpOp::LessThan, 8.5).unwrap(),
        )
        .unwrap(),
        Filter::by_type(CmpOp::Equal, PAYMENT_TYPE).unwrap(),
    )
    .unwrap()
}

fn benchmark_build(c: &mut Criterion) {
    c.bench_function("build_example_filter", |b| {
        b.iter(|| black_box(example_filter()))
    });
}

fn benchmark_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_performance");

    for depth in [1usize, 8, 64] {
        let filter = chain(depth);
        group.bench_with_input(BenchmarkId::new("placeholders", depth), &filter, |b, f| {
            b.iter(|| black_box(sql(black_box(f), field_name)))
        });
        group.bench_with_input(BenchmarkId::new("literal", depth), &filter, |b, f| {
            let dialect = compiler::Callbacks::new(
                field_name,
                compiler::no_value(|op: CmpOp| op.symbol().to_string()),
                |op: payment_filter::LogicalOp| op.to_string(),
            );
            b.iter(|| black_box(compiler::render(black_box(f), &dialect)))
        });
    }

    group.finish();
}

fn benchmark_payments_query(c: &mut Criterion) {
    let compiler = SqlCompiler::new();
    let query = FindQuery {
        filter: example_filter(),
        ..Default::default()
    };

    c.bench_function("compile_payments_query", |b| {
        b.iter(|| black_box(compiler.compile(black_box(&query))))
    });
}

criterion_group!(
    benches,
    benchmark_build,
    benchmark_compile,
    benchmark_payments_query
);
criterion_main!(benches);
