//! Year filter throughput over a synthetic national-scale dataset.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rail_timeline::data::activity::{active_line_names, filter_by_year, restrict_to_lines};
use rail_timeline::data::{Dataset, FilterYear};
use serde_json::json;

fn synthetic_collection(lines: usize, segments_per_line: usize) -> Dataset {
    let mut features = Vec::with_capacity(lines * segments_per_line);
    for line in 0..lines {
        let start = 1872 + (line % 120) as i64;
        let end = if line % 3 == 0 { "9999".to_string() } else { (start + 40).to_string() };
        for segment in 0..segments_per_line {
            features.push(json!({
                "type": "Feature",
                "properties": {
                    "N05_002": format!("Line {line}"),
                    "N05_005b": start.to_string(),
                    "N05_005e": end.as_str(),
                },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[segment as f64, line as f64], [segment as f64 + 1.0, line as f64]]
                }
            }));
        }
    }
    let body = json!({ "type": "FeatureCollection", "features": features }).to_string();
    match Dataset::parse(body) {
        Ok(dataset) => dataset,
        Err(err) => panic!("synthetic dataset should parse: {err}"),
    }
}

fn bench_year_filter(c: &mut Criterion) {
    let rail = synthetic_collection(600, 40);
    let stations = synthetic_collection(600, 8);

    let mut group = c.benchmark_group("year_filter");
    group.throughput(Throughput::Elements(rail.features().len() as u64));

    group.bench_function("rail_1960", |b| {
        b.iter(|| filter_by_year(black_box(rail.features()), FilterYear::Year(1960)).len())
    });

    group.bench_function("stations_joined_1960", |b| {
        b.iter(|| {
            let year = FilterYear::Year(1960);
            let lines = active_line_names(filter_by_year(rail.features(), year));
            restrict_to_lines(filter_by_year(black_box(stations.features()), year), &lines).len()
        })
    });

    group.bench_function("render_1960", |b| {
        let survivors = filter_by_year(rail.features(), FilterYear::Year(1960));
        b.iter(|| rail.render(black_box(&survivors)).map(|body| body.len()))
    });

    group.finish();
}

criterion_group!(benches, bench_year_filter);
criterion_main!(benches);
