//! Iterative fixed-point linestring joining (§4.4): the unionizer processor.

use std::collections::HashSet;

use log::{debug, trace};

use crate::candidate::{CandidateIndex, Position};
use crate::collab::MapContext;
use crate::config::UnionizerConfig;
use crate::geometry::{AttrValue, Feature, Geometry, Layer, Vertex};
use crate::scorer::PairScorer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStrategy {
    Intersect,
    Accumulate,
}

pub struct Unionizer {
    config: UnionizerConfig,
}

impl Unionizer {
    pub fn new(config: UnionizerConfig) -> Self {
        Unionizer { config }
    }

    /// Merges compatible linestrings in `layer`, mutating it in place.
    pub fn process(&self, layer: &mut Layer, map_context: &dyn MapContext) {
        let sample_budget = (
            map_context.extent_width() * self.config.angle_union_sample_ratio,
            map_context.extent_height() * self.config.angle_union_sample_ratio,
        );

        for iteration in 0..self.config.max_iterations {
            let index = CandidateIndex::build(
                layer,
                &self.config.match_tags,
                &self.config.preserve_direction_tags,
                sample_budget,
            );
            let scorer = PairScorer::score(&index, self.config.heuristic);

            let mut touched: HashSet<usize> = HashSet::new();
            let mut spliced_any = false;

            for &(a_idx, b_idx) in scorer.scored.values() {
                let a = &index.candidates[a_idx];
                let b = &index.candidates[b_idx];
                if touched.contains(&a.feature_idx) || touched.contains(&b.feature_idx) {
                    continue;
                }

                splice(layer, a.feature_idx, a.geom_idx, a.position, b.feature_idx, b.geom_idx, b.position);
                reconcile_tags(layer, a.feature_idx, b.feature_idx, self.config.tag_strategy);

                touched.insert(a.feature_idx);
                touched.insert(b.feature_idx);
                spliced_any = true;
            }

            trace!("unionizer iteration {iteration}: {} splices", touched.len() / 2);

            if !spliced_any {
                break;
            }
        }

        layer.remove_empty_features();
        debug!("unionizer finished with {} features", layer.features.len());
    }
}

/// Joins geometry `a_geom` of feature `a_idx` with geometry `b_geom` of
/// feature `b_idx` according to the (position_a, position_b) case (§4.4).
/// The result always lands in `a_idx`'s geometry list; `b_geom` is always
/// removed from `b_idx`.
fn splice(
    layer: &mut Layer,
    a_idx: usize,
    a_geom: usize,
    a_pos: Position,
    b_idx: usize,
    b_geom: usize,
    b_pos: Position,
) {
    // Canonicalize so that, for back/front pairs, `a` is the back side —
    // the merged geometry still ends up in the original a's feature per the
    // spec ("always ends up in the first candidate's feature"), so we track
    // the destination feature separately from which side plays "back".
    let dest_idx = a_idx;

    let b_coords = take_linestring(layer, b_idx, b_geom);

    match (a_pos, b_pos) {
        (Position::Back, Position::Front) => {
            let a_coords = linestring_mut(layer, dest_idx, a_geom);
            a_coords.extend(b_coords.into_iter().skip(1));
        }
        (Position::Front, Position::Back) => {
            // Swap roles: b is logically the back side, so b's vertices
            // (minus its trailing endpoint duplicate) are prepended.
            let a_coords = linestring_mut(layer, dest_idx, a_geom);
            let mut merged = b_coords;
            merged.pop();
            merged.extend(a_coords.iter().copied());
            *a_coords = merged;
        }
        (Position::Back, Position::Back) => {
            let a_coords = linestring_mut(layer, dest_idx, a_geom);
            a_coords.extend(b_coords.iter().rev().skip(1).copied());
        }
        (Position::Front, Position::Front) => {
            let a_coords = linestring_mut(layer, dest_idx, a_geom).clone();
            let mut new_coords: Vec<Vertex> = a_coords.iter().rev().copied().collect();
            new_coords.extend(b_coords.into_iter().skip(1));
            remove_geometry(layer, dest_idx, a_geom);
            layer.features[dest_idx].geometries.push(Geometry::LineString(new_coords));
        }
    }
}

fn take_linestring(layer: &mut Layer, feature_idx: usize, geom_idx: usize) -> Vec<Vertex> {
    let coords = layer.features[feature_idx].geometries[geom_idx]
        .as_linestring()
        .expect("candidate geometry is a linestring")
        .to_vec();
    remove_geometry(layer, feature_idx, geom_idx);
    coords
}

fn linestring_mut(layer: &mut Layer, feature_idx: usize, geom_idx: usize) -> &mut Vec<Vertex> {
    layer.features[feature_idx].geometries[geom_idx]
        .as_linestring_mut()
        .expect("candidate geometry is a linestring")
}

fn remove_geometry(layer: &mut Layer, feature_idx: usize, geom_idx: usize) {
    layer.features[feature_idx].geometries.remove(geom_idx);
}

/// Reconciles attribute tags between the destination feature `a_idx` and the
/// consumed feature `b_idx` per the configured strategy (§4.4).
fn reconcile_tags(layer: &mut Layer, a_idx: usize, b_idx: usize, strategy: TagStrategy) {
    let b_entries: Vec<(String, AttrValue)> =
        layer.features[b_idx].entries().cloned().collect();

    let a_keys: Vec<String> = layer.features[a_idx].entries().map(|(k, _)| k.clone()).collect();

    {
        let a: &mut Feature = &mut layer.features[a_idx];
        for key in &a_keys {
            let b_value = b_entries.iter().find(|(k, _)| k == key).map(|(_, v)| v);
            let a_value = a.get(key).cloned();
            match b_value {
                Some(bv) if Some(bv) == a_value.as_ref() => {}
                _ => a.delete(key),
            }
        }
    }

    if strategy == TagStrategy::Accumulate {
        let a: &mut Feature = &mut layer.features[a_idx];
        for (key, value) in b_entries {
            if !a.has(&key) {
                a.put_new(&key, value);
            }
        }
    }
}
