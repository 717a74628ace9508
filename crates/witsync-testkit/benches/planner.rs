use criterion::{black_box, criterion_group, criterion_main, Criterion};

use witsync_core::{offset_or_utc, BatchWindowPlanner, DayEdges, Granularity};
use witsync_testkit::fixtures::time;

fn bench_plan_month(c: &mut Criterion) {
    let start = time("2024-01-01T06:30:00.000-06:00");
    let end = time("2024-01-31T18:00:00.000-06:00");
    let timezone = offset_or_utc(Some("-06:00"));
    let contiguous = BatchWindowPlanner::new(Granularity::PerCalendarDay, timezone);
    let inset = contiguous.clone().with_day_edges(DayEdges::InsetSecond);

    c.bench_function("plan_30_days_contiguous", |b| {
        b.iter(|| contiguous.plan(black_box(&start), black_box(&end)))
    });
    c.bench_function("plan_30_days_inset", |b| {
        b.iter(|| inset.plan(black_box(&start), black_box(&end)))
    });
}

criterion_group!(benches, bench_plan_month);
criterion_main!(benches);
