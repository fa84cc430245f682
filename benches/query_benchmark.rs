use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hteng_catalog::{Catalog, CatalogLoader, ProductFilter};

fn synthetic_csv(rows: usize) -> String {
    let mut csv = String::from("제품,제품군,AC or DC,통신여부,누설(지락),상세설명\n");
    for i in 0..rows {
        csv.push_str(&format!(
            "EOCR-{i:04},{},{},{},{},모델 {i} 설명\n",
            if i % 3 == 0 { "디지털" } else { "전자식" },
            if i % 5 == 0 { "DC" } else { "AC" },
            if i % 2 == 0 { "O" } else { "X" },
            if i % 4 == 0 { "O" } else { "X" },
        ));
    }
    csv
}

fn bench_queries(c: &mut Criterion) {
    let csv = synthetic_csv(2_000);

    c.bench_function("load_2000_rows", |b| {
        b.iter(|| CatalogLoader::new().load_reader(black_box(csv.as_bytes())))
    });

    let loaded = CatalogLoader::new()
        .load_reader(csv.as_bytes())
        .expect("synthetic table loads");
    let catalog = Catalog::from_loaded(loaded, None);

    let filter = ProductFilter::from_params([
        ("제품군", "전자식"),
        ("AC_DC", "AC"),
        ("통신여부", "O"),
        ("누설지락", "O"),
    ]);
    c.bench_function("filter_four_predicates", |b| {
        b.iter(|| catalog.filter(black_box(&filter)).total_matches)
    });

    c.bench_function("suggest", |b| b.iter(|| catalog.suggest(black_box(Some("eocr-01"))).len()));
}

criterion_group!(benches, bench_queries);
criterion_main!(benches);
