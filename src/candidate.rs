//! Ordered multiset of linestring endpoint candidates (§4.2), the
//! unionizer's per-iteration index.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use crate::curve::CurveApproximator;
use crate::geometry::{AttrValue, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Front,
    Back,
}

/// One linestring endpoint: a non-owning reference (by index) into the
/// layer built this pass.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub feature_idx: usize,
    pub geom_idx: usize,
    pub position: Position,
    pub x: f64,
    pub y: f64,
    pub directional: bool,
    pub direction: (f64, f64),
}

/// Sort key grouping candidates into adjacency groups: same endpoint,
/// same match-tag values.
type CandidateKey = (OrderedFloat<f64>, OrderedFloat<f64>, Vec<AttrValue>);

pub struct CandidateIndex {
    pub candidates: Vec<Candidate>,
    /// Adjacency groups keyed by (x, y, match-tag values), in ascending
    /// comparator order; values are indices into `candidates`.
    pub groups: BTreeMap<CandidateKey, Vec<usize>>,
}

impl CandidateIndex {
    /// Builds the index from `layer`, sampling direction vectors with a
    /// budget of `sample_budget` = (width * ratio, height * ratio).
    pub fn build(
        layer: &Layer,
        match_tags: &[String],
        preserve_direction_tags: &[String],
        sample_budget: (f64, f64),
    ) -> Self {
        let mut candidates = Vec::new();
        let mut groups: BTreeMap<CandidateKey, Vec<usize>> = BTreeMap::new();

        for (feature_idx, feature) in layer.features.iter().enumerate() {
            if !match_tags.iter().all(|tag| feature.has(tag)) {
                continue;
            }

            let directional =
                preserve_direction_tags.iter().any(|tag| feature.has(tag));

            let match_values: Vec<AttrValue> = match_tags
                .iter()
                .map(|tag| feature.get(tag).cloned().unwrap_or(AttrValue::Null))
                .collect();

            for (geom_idx, geom) in feature.geometries.iter().enumerate() {
                let Some(coords) = geom.as_linestring() else { continue };
                if coords.len() < 2 {
                    continue;
                }

                let front = make_candidate(
                    coords,
                    Position::Front,
                    feature_idx,
                    geom_idx,
                    directional,
                    sample_budget,
                );
                let back = make_candidate(
                    coords,
                    Position::Back,
                    feature_idx,
                    geom_idx,
                    directional,
                    sample_budget,
                );

                for candidate in [front, back] {
                    let key = (
                        OrderedFloat(candidate.x),
                        OrderedFloat(candidate.y),
                        match_values.clone(),
                    );
                    let idx = candidates.len();
                    candidates.push(candidate);
                    groups.entry(key).or_default().push(idx);
                }
            }
        }

        CandidateIndex { candidates, groups }
    }
}

fn make_candidate(
    coords: &[(f64, f64)],
    position: Position,
    feature_idx: usize,
    geom_idx: usize,
    directional: bool,
    sample_budget: (f64, f64),
) -> Candidate {
    let (endpoint, inward): (&(f64, f64), Box<dyn Iterator<Item = &(f64, f64)>>) = match position {
        Position::Front => (&coords[0], Box::new(coords[1..].iter())),
        Position::Back => (&coords[coords.len() - 1], Box::new(coords[..coords.len() - 1].iter().rev())),
    };

    let mut approximator = CurveApproximator::new(endpoint.0, endpoint.1, sample_budget);
    for v in inward {
        if !approximator.consume(v.0, v.1) {
            break;
        }
    }

    Candidate {
        feature_idx,
        geom_idx,
        position,
        x: endpoint.0,
        y: endpoint.1,
        directional,
        direction: approximator.direction(),
    }
}
