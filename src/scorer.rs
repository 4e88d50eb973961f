//! Pair scoring over candidates sharing an adjacency group (§4.3).

use std::collections::BTreeMap;

use crate::candidate::{Candidate, CandidateIndex, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    Greedy,
    Obtuse,
    Acute,
}

/// Deterministic tie-break key for pairs sharing a score: ordered by
/// (feature, geometry, position) on each side so iteration order never
/// depends on construction order.
type TieBreak = (usize, usize, bool, usize, usize, bool);

/// Scores every compatible pair within each adjacency group and collects
/// them into a map ordered best-score-first, with ties broken
/// deterministically (§4.3, §9).
pub struct PairScorer {
    pub scored: BTreeMap<(u8, TieBreak), (usize, usize)>,
}

impl PairScorer {
    pub fn score(index: &CandidateIndex, heuristic: Heuristic) -> Self {
        let mut scored = BTreeMap::new();

        for group in index.groups.values() {
            for i in 0..group.len() {
                for j in (i + 1)..group.len() {
                    let a_idx = group[i];
                    let b_idx = group[j];
                    let a = &index.candidates[a_idx];
                    let b = &index.candidates[b_idx];

                    if !compatible(a, b) {
                        continue;
                    }

                    let score = match heuristic {
                        Heuristic::Greedy => greedy_score(a, b),
                        Heuristic::Obtuse => obtuse_score(a, b),
                        Heuristic::Acute => 255 - obtuse_score(a, b),
                    };

                    let tie_break = tie_break_key(a, b);
                    scored.insert((score, tie_break), (a_idx, b_idx));
                }
            }
        }

        PairScorer { scored }
    }
}

fn tie_break_key(a: &Candidate, b: &Candidate) -> TieBreak {
    (
        a.feature_idx,
        a.geom_idx,
        a.position == Position::Front,
        b.feature_idx,
        b.geom_idx,
        b.position == Position::Front,
    )
}

fn compatible(a: &Candidate, b: &Candidate) -> bool {
    if a.feature_idx == b.feature_idx && a.geom_idx == b.geom_idx {
        return false;
    }
    if a.directional != b.directional {
        return false;
    }
    if a.directional && a.position == b.position {
        return false;
    }
    true
}

fn greedy_score(a: &Candidate, b: &Candidate) -> u8 {
    match (a.position, b.position) {
        (Position::Front, Position::Back) | (Position::Back, Position::Front) => 0,
        (Position::Back, Position::Back) => 127,
        (Position::Front, Position::Front) => 255,
    }
}

fn obtuse_score(a: &Candidate, b: &Candidate) -> u8 {
    if a.direction == (0.0, 0.0) || b.direction == (0.0, 0.0) {
        return 255;
    }
    let dot = a.direction.0 * b.direction.0 + a.direction.1 * b.direction.1;
    let raw = 255.0 * (dot + 1.0) / 2.0;
    raw.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{AttrValue, Feature, Geometry, Layer};

    fn line(id: u64, coords: Vec<(f64, f64)>) -> Feature {
        let mut f = Feature::new(id, vec![Geometry::LineString(coords)]);
        f.put_new("road", AttrValue::String("main".into()));
        f
    }

    #[test]
    fn greedy_prefers_front_back_pairs() {
        let layer = Layer::new(vec![
            line(1, vec![(0.0, 0.0), (1.0, 0.0)]),
            line(2, vec![(1.0, 0.0), (2.0, 0.0)]),
        ]);
        let index = CandidateIndex::build(&layer, &["road".into()], &[], (10.0, 10.0));
        let scorer = PairScorer::score(&index, Heuristic::Greedy);
        let (&(score, _), _) = scorer.scored.iter().next().unwrap();
        assert_eq!(score, 0);
    }

    #[test]
    fn rejects_same_geometry_pair() {
        // A closed-ish linestring sharing an endpoint with itself would be
        // the same (feature, geom) pair, which must never be scored.
        let layer = Layer::new(vec![line(1, vec![(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)])]);
        let index = CandidateIndex::build(&layer, &["road".into()], &[], (10.0, 10.0));
        let scorer = PairScorer::score(&index, Heuristic::Greedy);
        assert!(scorer.scored.is_empty());
    }

    #[test]
    fn directional_mismatch_is_incompatible() {
        let mut a = line(1, vec![(0.0, 0.0), (1.0, 0.0)]);
        a.put_new("oneway", AttrValue::String("yes".into()));
        let b = line(2, vec![(1.0, 0.0), (2.0, 0.0)]);
        let layer = Layer::new(vec![a, b]);
        let index = CandidateIndex::build(
            &layer,
            &["road".into()],
            &["oneway".into()],
            (10.0, 10.0),
        );
        let scorer = PairScorer::score(&index, Heuristic::Greedy);
        assert!(scorer.scored.is_empty());
    }

    #[test]
    fn obtuse_prefers_opposite_directions() {
        // A ends heading to (-1,0), B ends heading to (1,0): straight
        // continuation through the shared endpoint at the origin.
        let a = line(1, vec![(-1.0, 0.0), (0.0, 0.0)]);
        let b = line(2, vec![(0.0, 0.0), (1.0, 0.0)]);
        let c = line(3, vec![(0.0, 0.0), (0.0, 1.0)]);
        let layer = Layer::new(vec![a, b, c]);
        let index = CandidateIndex::build(&layer, &["road".into()], &[], (10.0, 10.0));
        let scorer = PairScorer::score(&index, Heuristic::Obtuse);
        let (&(best_score, _), &(a_idx, b_idx)) = scorer.scored.iter().next().unwrap();
        let fa = index.candidates[a_idx].feature_idx;
        let fb = index.candidates[b_idx].feature_idx;
        assert_eq!(best_score, 0);
        assert!((fa == 0 && fb == 1) || (fa == 1 && fb == 0));
    }

    #[test]
    fn acute_ties_resolved_by_feature_id_tiebreak() {
        // Same three linestrings as the obtuse case: A heading to (-1,0), B
        // heading to (1,0), C heading to (0,1), all ending at the origin.
        // Under acute scoring A-C and B-C tie (both perpendicular); the
        // deterministic tie-break must prefer the pair with the lower
        // feature id, i.e. A-C over B-C.
        let a = line(1, vec![(-1.0, 0.0), (0.0, 0.0)]);
        let b = line(2, vec![(0.0, 0.0), (1.0, 0.0)]);
        let c = line(3, vec![(0.0, 0.0), (0.0, 1.0)]);
        let layer = Layer::new(vec![a, b, c]);
        let index = CandidateIndex::build(&layer, &["road".into()], &[], (10.0, 10.0));
        let scorer = PairScorer::score(&index, Heuristic::Acute);
        let (&(best_score, _), &(a_idx, b_idx)) = scorer.scored.iter().next().unwrap();
        let fa = index.candidates[a_idx].feature_idx;
        let fb = index.candidates[b_idx].feature_idx;
        assert_eq!(best_score, 127);
        assert!((fa == 0 && fb == 2) || (fa == 2 && fb == 0));
    }
}
