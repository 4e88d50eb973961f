//! Spatial enrichment: stamps each feature with an attribute taken from the
//! lowest-indexed auxiliary polygon it intersects (§4.6).

use geo::{Intersects, LineString as GeoLineString, MultiLineString, Point as GeoPoint, Polygon as GeoPolygon};
use log::{debug, warn};

use crate::collab::Datasource;
use crate::config::AdminizerConfig;
use crate::error::Result;
use crate::geometry::{AttrValue, Envelope, Feature, Geometry, Layer, Vertex, VertexCmd};
use crate::spatial::{Entry, SpatialIndex};

const DEDUP_EPSILON: f64 = 1e-12;

pub struct Adminizer {
    config: AdminizerConfig,
    datasource: Box<dyn Datasource>,
}

impl Adminizer {
    pub fn new(config: AdminizerConfig, datasource: Box<dyn Datasource>) -> Self {
        Adminizer { config, datasource }
    }

    /// Enriches every feature in `layer` with `config.param_name`, mutating
    /// it in place.
    pub fn process(&self, layer: &mut Layer) -> Result<()> {
        let Some(envelope) = layer.envelope() else {
            return Ok(());
        };

        let auxiliary = self.datasource.query(envelope)?;

        let mut entries = Vec::new();
        for feature in &auxiliary {
            for geom in &feature.geometries {
                if matches!(geom, Geometry::Polygon { .. }) {
                    let param_value =
                        feature.get(&self.config.param_name).cloned().unwrap_or(AttrValue::Null);
                    let index = entries.len();
                    entries.push(Entry::new(geom.clone(), param_value, index));
                }
            }
        }

        debug!("adminizer: {} polygon entries from auxiliary dataset", entries.len());
        let index = SpatialIndex::build(entries);

        for feature in &mut layer.features {
            enrich_feature(feature, &index, &self.config.param_name);
        }

        Ok(())
    }
}

fn enrich_feature(feature: &mut Feature, index: &SpatialIndex, param_name: &str) {
    let geometries = feature.geometries.clone();
    let mut updater = Updater::new();

    for geom in &geometries {
        match geom {
            Geometry::Point(_) => {
                for p in lift_points(geom) {
                    let hits: Vec<usize> = index
                        .query(Envelope::point(p.0, p.1))
                        .filter(|e| geo_polygon(&e.polygon).intersects(&GeoPoint::new(p.0, p.1)))
                        .map(|e| e.index)
                        .collect();
                    if updater.offer_many(&hits, feature, param_name, index) {
                        return;
                    }
                }
            }
            Geometry::LineString(_) => {
                let lines = lift_linestrings(geom);
                let Some(env) = linestring_envelope(&lines) else { continue };
                let geo_lines = MultiLineString::new(
                    lines.iter().cloned().map(GeoLineString::from).collect(),
                );
                let hits: Vec<usize> = index
                    .query(env)
                    .filter(|e| geo_lines.intersects(&geo_polygon(&e.polygon)))
                    .map(|e| e.index)
                    .collect();
                if updater.offer_many(&hits, feature, param_name, index) {
                    return;
                }
            }
            Geometry::Polygon { .. } => {
                let lifted = lift_polygon(geom);
                let env = polygon_ring_envelope(&lifted);
                let geo_lifted = geo_polygon(&lifted);
                let hits: Vec<usize> = index
                    .query(env)
                    .filter(|e| geo_polygon(&e.polygon).intersects(&geo_lifted))
                    .map(|e| e.index)
                    .collect();
                if updater.offer_many(&hits, feature, param_name, index) {
                    return;
                }
            }
        }
    }
}

/// Per-feature state: the smallest entry index seen so far and whether
/// index 0 has already been matched (§3, §4.6 step 4).
struct Updater {
    best_index: usize,
    finished: bool,
}

impl Updater {
    fn new() -> Self {
        Updater { best_index: usize::MAX, finished: false }
    }

    /// Offers every hit index for one geometry to the updater, writing the
    /// attribute whenever a strictly smaller index is seen. Returns `true`
    /// once `finished` flips (index 0 was matched), signalling the caller
    /// to stop walking this feature's remaining geometries.
    fn offer_many(
        &mut self,
        hit_indices: &[usize],
        feature: &mut Feature,
        param_name: &str,
        spatial: &SpatialIndex,
    ) -> bool {
        for &hit in hit_indices {
            if hit < self.best_index {
                self.best_index = hit;
                let value = spatial.entry_value(hit);
                feature.put(param_name, value);
                if hit == 0 {
                    self.finished = true;
                }
            }
        }
        self.finished
    }
}

fn geo_polygon(geom: &Geometry) -> GeoPolygon<f64> {
    match geom {
        Geometry::Polygon { exterior, interiors } => GeoPolygon::new(
            GeoLineString::from(exterior.clone()),
            interiors.iter().cloned().map(GeoLineString::from).collect(),
        ),
        _ => panic!("spatial entries must wrap polygon geometries"),
    }
}

fn lift_points(geom: &Geometry) -> Vec<Vertex> {
    geom.commands()
        .into_iter()
        .filter_map(|cmd| match cmd {
            VertexCmd::MoveTo(x, y) | VertexCmd::LineTo(x, y) => Some((x, y)),
            VertexCmd::End => None,
        })
        .collect()
}

fn lift_linestrings(geom: &Geometry) -> Vec<Vec<Vertex>> {
    let mut lines: Vec<Vec<Vertex>> = Vec::new();
    let mut current: Vec<Vertex> = Vec::new();
    for cmd in geom.commands() {
        match cmd {
            VertexCmd::MoveTo(x, y) => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current.push((x, y));
            }
            VertexCmd::LineTo(x, y) => {
                if !dup_of_last(&current, x, y) {
                    current.push((x, y));
                } else {
                    warn!("adminizer: dropped near-duplicate vertex at ({x}, {y})");
                }
            }
            VertexCmd::End => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
            }
        }
    }
    lines
}

/// Lifts a single polygon geometry into an exterior ring plus inner rings,
/// per the §4.6 lift rules (first `MoveTo` starts the outer ring, each
/// subsequent one opens an inner ring).
fn lift_polygon(geom: &Geometry) -> Geometry {
    let mut rings = lift_linestrings(geom).into_iter();
    let exterior = rings.next().unwrap_or_default();
    let interiors: Vec<Vec<Vertex>> = rings.collect();
    Geometry::Polygon { exterior, interiors }
}

fn dup_of_last(current: &[Vertex], x: f64, y: f64) -> bool {
    match current.last() {
        Some(&(lx, ly)) => (lx - x).abs() < DEDUP_EPSILON && (ly - y).abs() < DEDUP_EPSILON,
        None => false,
    }
}

fn linestring_envelope(lines: &[Vec<Vertex>]) -> Option<Envelope> {
    let mut env: Option<Envelope> = None;
    for line in lines {
        for &(x, y) in line {
            env = Some(match env {
                Some(e) => e.union(&Envelope::point(x, y)),
                None => Envelope::point(x, y),
            });
        }
    }
    env
}

fn polygon_ring_envelope(geom: &Geometry) -> Envelope {
    match geom {
        Geometry::Polygon { exterior, interiors } => {
            let mut iter = exterior.iter().chain(interiors.iter().flatten());
            let first = iter.next().expect("lifted polygon has an exterior ring");
            let mut env = Envelope::point(first.0, first.1);
            for &(x, y) in iter {
                env = env.union(&Envelope::point(x, y));
            }
            env
        }
        _ => unreachable!(),
    }
}
