use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tile_postprocess::adminizer::Adminizer;
use tile_postprocess::collab::MemoryDatasource;
use tile_postprocess::config::AdminizerConfig;
use tile_postprocess::geometry::{AttrValue, Feature, Geometry, Layer};

/// A grid of `side * side` non-overlapping square regions tiling
/// `[0, side) x [0, side)`, each carrying a distinct `iso` value.
fn synthetic_regions(side: usize) -> MemoryDatasource {
    let mut features = Vec::with_capacity(side * side);
    let mut id = 0u64;
    for gx in 0..side {
        for gy in 0..side {
            let (x0, y0) = (gx as f64, gy as f64);
            let (x1, y1) = (x0 + 1.0, y0 + 1.0);
            let mut f = Feature::new(id, vec![Geometry::Polygon {
                exterior: vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)],
                interiors: vec![],
            }]);
            f.put_new("iso", AttrValue::String(format!("Z{id}")));
            features.push(f);
            id += 1;
        }
    }
    MemoryDatasource::new(features)
}

fn synthetic_points(count: usize, side: usize, seed: u64) -> Layer {
    let mut rng = StdRng::seed_from_u64(seed);
    let bound = side as f64;
    let features = (0..count)
        .map(|id| {
            let x = rng.gen_range(0.0..bound);
            let y = rng.gen_range(0.0..bound);
            Feature::new(id as u64, vec![Geometry::Point((x, y))])
        })
        .collect();
    Layer::new(features)
}

fn adminizer_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("adminizer");
    for side in [4usize, 16, 64] {
        let datasource = synthetic_regions(side);
        let config = AdminizerConfig { param_name: "iso".into(), datasource: serde_json::Value::Null };
        group.bench_function(format!("grid_{side}x{side}"), |b| {
            b.iter(|| {
                let mut layer = synthetic_points(1_000, side, 7);
                let adminizer =
                    Adminizer::new(config.clone(), Box::new(datasource.clone()));
                adminizer.process(&mut layer).unwrap();
                black_box(layer.features.len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, adminizer_benchmark);
criterion_main!(benches);
