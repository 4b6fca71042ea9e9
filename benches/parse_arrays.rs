use std::fmt::Write as _;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mf6_input::{load_str, parse_str, to_string, Dim, ParamSpec, ParseOptions, SpecTable};

fn make_griddata(nlay: usize, ncpl: usize) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "BEGIN DIMENSIONS\n  NLAY {nlay}\n  NCPL {ncpl}\nEND DIMENSIONS\n\nBEGIN GRIDDATA"
    );
    text.push_str("  TOP\n    INTERNAL FACTOR 1.0\n");
    write_values(&mut text, ncpl, 0);
    text.push_str("  BOTM LAYERED\n");
    for layer in 0..nlay {
        text.push_str("    INTERNAL\n");
        write_values(&mut text, ncpl, layer + 1);
    }
    text.push_str("END GRIDDATA\n");
    text
}

fn write_values(text: &mut String, count: usize, seed: usize) {
    for chunk in (0..count).collect::<Vec<_>>().chunks(10) {
        text.push_str("      ");
        for ix in chunk {
            let value = ((ix * 31 + seed * 17) % 997) as f64 * 0.25 - 100.0;
            let _ = write!(text, "{value:.4} ");
        }
        text.push('\n');
    }
}

fn table() -> SpecTable {
    SpecTable::new()
        .with("dimensions", ParamSpec::integer("nlay"))
        .with("dimensions", ParamSpec::integer("ncpl"))
        .with("griddata", ParamSpec::array("top", [Dim::named("ncpl")]))
        .with(
            "griddata",
            ParamSpec::array("botm", [Dim::named("nlay"), Dim::named("ncpl")]).with_layered(true),
        )
}

fn criterion_config() -> Criterion {
    if std::env::var("MF6_BENCH_MINIMAL").is_ok() {
        Criterion::default()
            .warm_up_time(Duration::from_secs(0))
            .measurement_time(Duration::from_millis(10))
            .sample_size(10)
            .nresamples(1)
    } else {
        Criterion::default()
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let table = table();
    let options = ParseOptions::new();
    let mut group = c.benchmark_group("griddata");
    for (nlay, ncpl) in [(3, 1_000), (10, 10_000)] {
        let text = make_griddata(nlay, ncpl);
        let name = format!("{nlay}x{ncpl}");
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(BenchmarkId::new("parse", &name), |b| {
            b.iter(|| {
                let doc = parse_str(black_box(&text), &options).unwrap();
                black_box(doc);
            });
        });
        group.bench_function(BenchmarkId::new("load", &name), |b| {
            b.iter(|| {
                let doc = load_str(black_box(&text), &table, ".").unwrap();
                black_box(doc);
            });
        });
        let doc = load_str(&text, &table, ".").unwrap();
        group.bench_function(BenchmarkId::new("write", &name), |b| {
            b.iter(|| black_box(to_string(black_box(&doc))));
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = criterion_benchmark
}
criterion_main!(benches);
