//! Benchmarks for row-order index rebuilds and drawing passes.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use canvas_table::host::{ManualScheduler, NullHost};
use canvas_table::layout::RowIndex;
use canvas_table::{
    CellValue, ColumnConfig, GridOptions, GridRenderer, RecordingContext, Record, SortColumn,
};

/// Rows with a numeric `id`, a text `name` with many ties, and a sparse
/// `note` that is empty or missing on most rows.
fn make_rows(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let mut row = Record::new();
            row.insert("id".to_string(), CellValue::from((count - i) as f64));
            row.insert("name".to_string(), CellValue::from(format!("name {}", i % 997)));
            match i % 3 {
                0 => {
                    row.insert("note".to_string(), CellValue::from(format!("note {i}")));
                }
                1 => {
                    row.insert("note".to_string(), CellValue::from(""));
                }
                _ => {}
            }
            row
        })
        .collect()
}

/// Stable sort of the index on one key, across collection sizes
fn bench_sort_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("reindex_by_name");

    for count in [1_000, 10_000, 100_000] {
        let rows = make_rows(count);
        let keys = [SortColumn::ascending("name")];
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("rows", count), &rows, |b, rows| {
            b.iter(|| {
                RowIndex::sorted(rows.len(), black_box(&keys), |row, field| {
                    rows.get(row).and_then(|r| r.get(field))
                })
            })
        });
    }

    group.finish();
}

/// Multi-key sort where the first key ties often and the second is sparse
fn bench_multi_key(c: &mut Criterion) {
    let rows = make_rows(100_000);
    let keys = [
        SortColumn::ascending("name"),
        SortColumn::descending("note"),
        SortColumn::ascending("id"),
    ];

    c.bench_function("reindex_three_keys_100k", |b| {
        b.iter(|| {
            RowIndex::sorted(rows.len(), black_box(&keys), |row, field| {
                rows.get(row).and_then(|r| r.get(field))
            })
        })
    });
}

/// One full drawing pass over a large collection; only visible rows paint
fn bench_draw_frame(c: &mut Criterion) {
    let mut grid = GridRenderer::new(
        GridOptions::default(),
        Box::new(ManualScheduler::new()),
        Box::new(NullHost),
    );
    grid.resize(1200.0, 800.0, 2.0);
    grid.configure_columns(&[
        ColumnConfig::new("Id", "id").width(80.0),
        ColumnConfig::new("Name", "name").width(240.0),
        ColumnConfig::new("Note", "note").width(400.0),
    ]);
    grid.set_data(Some(make_rows(100_000)));
    grid.scroll_to(0.0, 500_000.0);
    let mut ctx = RecordingContext::new();

    c.bench_function("draw_frame_100k", |b| {
        b.iter(|| {
            ctx.clear();
            grid.request_redraw();
            black_box(grid.draw_frame(&mut ctx))
        })
    });
}

criterion_group!(
    benches,
    bench_sort_sizes,
    bench_multi_key,
    bench_draw_frame,
);

criterion_main!(benches);
