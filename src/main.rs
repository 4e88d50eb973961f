// Example separate program/test
use tile_postprocess::collab::{FixedMapContext, MemoryDatasource};
use tile_postprocess::config::{AdminizerConfig, UnionizerConfig};
use tile_postprocess::geometry::{AttrValue, Feature, Geometry, Layer};
use tile_postprocess::pipeline::Pipeline;
use tile_postprocess::unionizer::Unionizer;
use tile_postprocess::adminizer::Adminizer;

fn road(id: u64, coords: Vec<(f64, f64)>, name: &str) -> Feature {
    let mut f = Feature::new(id, vec![Geometry::LineString(coords)]);
    f.put_new("road", AttrValue::String(name.to_string()));
    f
}

fn region(id: u64, exterior: Vec<(f64, f64)>, iso: &str) -> Feature {
    let mut f = Feature::new(id, vec![Geometry::Polygon { exterior, interiors: vec![] }]);
    f.put_new("iso", AttrValue::String(iso.to_string()));
    f
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut layer = Layer::new(vec![
        road(1, vec![(0.0, 0.0), (10.0, 0.0)], "main"),
        road(2, vec![(10.0, 0.0), (20.0, 0.0)], "main"),
        road(3, vec![(20.0, 0.0), (30.0, 5.0)], "main"),
    ]);

    let auxiliary = MemoryDatasource::new(vec![
        region(100, vec![(-5.0, -5.0), (15.0, -5.0), (15.0, 5.0), (-5.0, 5.0), (-5.0, -5.0)], "Z1"),
        region(
            101,
            vec![(15.0, -5.0), (35.0, -5.0), (35.0, 10.0), (15.0, 10.0), (15.0, -5.0)],
            "Z2",
        ),
    ]);

    let pipeline = Pipeline::new()
        .unionize(Unionizer::new(UnionizerConfig {
            match_tags: vec!["road".into()],
            ..Default::default()
        }))
        .adminize(Adminizer::new(
            AdminizerConfig { param_name: "iso".into(), datasource: serde_json::Value::Null },
            Box::new(auxiliary),
        ));

    pipeline.run(&mut layer, &FixedMapContext::new(256.0, 256.0))?;

    for feature in &layer.features {
        println!(
            "feature {}: {} geometries, iso = {:?}",
            feature.id,
            feature.geometries.len(),
            feature.get("iso"),
        );
    }

    Ok(())
}
