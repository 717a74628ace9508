use criterion::{black_box, criterion_group, criterion_main, Criterion};

use witsync_core::{LogDataPage, Row};
use witsync_render::{Deduplicator, OutputFormat, RowFormatter};
use witsync_testkit::fixtures::{depth, log_ref};

fn page(rows: usize) -> LogDataPage {
    LogDataPage {
        mnemonics: vec!["DEPT".into(), "GR".into(), "ROP".into(), "WOB".into()],
        units: vec!["m".into(), "gAPI".into(), "m/h".into(), "kkgf".into()],
        rows: (0..rows)
            .map(|i| {
                Row::new(vec![
                    Some(format!("{}.0", 1000 + i)),
                    Some(format!("{:.2}", 40.0 + (i % 17) as f64)),
                    (i % 5 != 0).then(|| format!("{:.1}", 12.0 + (i % 7) as f64)),
                    Some("8.5".into()),
                ])
            })
            .collect(),
        reported_end: depth(1000.0 + rows as f64),
        object_growing: Some(true),
    }
}

fn bench_render(c: &mut Criterion) {
    let object = log_ref();
    let page = page(1_000);

    for format in [OutputFormat::Delimited, OutputFormat::Columnar] {
        let formatter = RowFormatter::new(format);
        c.bench_function(&format!("render_1000_rows_{format:?}"), |b| {
            b.iter(|| formatter.render(black_box(&object), black_box(&page)))
        });
    }

    let payload = RowFormatter::default()
        .render(&object, &page)
        .expect("bench page renders");
    c.bench_function("dedup_offer", |b| {
        let mut dedup = Deduplicator::default();
        b.iter(|| dedup.offer(black_box(&payload)))
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
