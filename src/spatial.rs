//! Bulk-loaded bounding-box R-tree over auxiliary polygon entries (§4.5),
//! built fresh per `Adminizer::process` call and discarded on return.

use rstar::{RTree, RTreeObject, AABB};

use crate::geometry::{AttrValue, Envelope, Geometry};

/// A polygon lifted from the auxiliary datasource, paired with the
/// attribute value it contributes and a monotonic tie-break index (lowest
/// index wins, §3).
#[derive(Debug, Clone)]
pub struct Entry {
    pub polygon: Geometry,
    pub param_value: AttrValue,
    pub index: usize,
    envelope: Envelope,
}

impl Entry {
    pub fn new(polygon: Geometry, param_value: AttrValue, index: usize) -> Self {
        let envelope = polygon_envelope(&polygon);
        Entry { polygon, param_value, index, envelope }
    }
}

fn polygon_envelope(geom: &Geometry) -> Envelope {
    match geom {
        Geometry::Polygon { exterior, .. } => {
            let mut iter = exterior.iter();
            let first = iter.next().expect("polygon has a non-empty exterior ring");
            let mut env = Envelope::point(first.0, first.1);
            for v in iter {
                env = env.union(&Envelope::point(v.0, v.1));
            }
            env
        }
        _ => panic!("spatial entries must wrap polygon geometries"),
    }
}

impl RTreeObject for Entry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.envelope.min_x, self.envelope.min_y],
            [self.envelope.max_x, self.envelope.max_y],
        )
    }
}

/// Thin wrapper over `rstar::RTree`, bulk-loaded once per `process` call —
/// `rstar` bulk-load uses quadratic-split packing internally, matching the
/// fixed node capacity the spec calls for.
pub struct SpatialIndex {
    tree: RTree<Entry>,
    /// `param_value` for each monotonic entry index, so callers can resolve
    /// a hit's value without walking the tree again.
    values: Vec<AttrValue>,
}

impl SpatialIndex {
    pub fn build(entries: Vec<Entry>) -> Self {
        let mut values: Vec<AttrValue> = Vec::with_capacity(entries.len());
        for entry in &entries {
            if entry.index >= values.len() {
                values.resize(entry.index + 1, AttrValue::Null);
            }
            values[entry.index] = entry.param_value.clone();
        }
        SpatialIndex { tree: RTree::bulk_load(entries), values }
    }

    pub fn query(&self, envelope: Envelope) -> impl Iterator<Item = &Entry> {
        let aabb = AABB::from_corners(
            [envelope.min_x, envelope.min_y],
            [envelope.max_x, envelope.max_y],
        );
        self.tree.locate_in_envelope_intersecting(&aabb)
    }

    /// The `param_value` of the entry with the given monotonic index.
    pub fn entry_value(&self, index: usize) -> AttrValue {
        self.values[index].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: (f64, f64), max: (f64, f64)) -> Geometry {
        Geometry::Polygon {
            exterior: vec![
                (min.0, min.1),
                (max.0, min.1),
                (max.0, max.1),
                (min.0, max.1),
                (min.0, min.1),
            ],
            interiors: vec![],
        }
    }

    #[test]
    fn query_returns_intersecting_entries_only() {
        let entries = vec![
            Entry::new(square((0.0, 0.0), (1.0, 1.0)), AttrValue::Int(0), 0),
            Entry::new(square((10.0, 10.0), (11.0, 11.0)), AttrValue::Int(1), 1),
        ];
        let index = SpatialIndex::build(entries);
        let hits: Vec<_> =
            index.query(Envelope { min_x: -1.0, min_y: -1.0, max_x: 0.5, max_y: 0.5 }).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 0);
    }
}
