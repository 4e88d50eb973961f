//! Boundary traits for the collaborators the core assumes but does not
//! implement: the map/tile context that supplies projection extents, and the
//! auxiliary polygon datasource the adminizer queries. Concrete adapters
//! (HTTP fetch, TileJSON, the mvt wire codec, the embedded server) live
//! outside this crate; these traits are the seam they plug into.

use crate::error::Result;
use crate::geometry::{Envelope, Feature};

/// Supplies the current map extent in projection units. The unionizer scales
/// its angular sampling budget against this.
pub trait MapContext {
    fn extent_width(&self) -> f64;
    fn extent_height(&self) -> f64;
}

/// A fixed-extent context, the common case for a single tile render.
#[derive(Debug, Clone, Copy)]
pub struct FixedMapContext {
    pub width: f64,
    pub height: f64,
}

impl FixedMapContext {
    pub fn new(width: f64, height: f64) -> Self {
        FixedMapContext { width, height }
    }
}

impl MapContext for FixedMapContext {
    fn extent_width(&self) -> f64 {
        self.width
    }

    fn extent_height(&self) -> f64 {
        self.height
    }
}

/// A datasource returning the features intersecting a query envelope. The
/// adminizer's auxiliary polygon dataset is one of these; it may be backed
/// by a shapefile, a database, or an in-memory fixture.
pub trait Datasource {
    fn query(&self, envelope: Envelope) -> Result<Vec<Feature>>;
}

/// An in-memory datasource over a fixed feature set, useful for tests and
/// for small auxiliary layers (e.g. admin boundaries) loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatasource {
    features: Vec<Feature>,
}

impl MemoryDatasource {
    pub fn new(features: Vec<Feature>) -> Self {
        MemoryDatasource { features }
    }
}

impl Datasource for MemoryDatasource {
    fn query(&self, envelope: Envelope) -> Result<Vec<Feature>> {
        Ok(self
            .features
            .iter()
            .filter(|f| f.envelope().is_some_and(|e| e.intersects(&envelope)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;

    #[test]
    fn memory_datasource_filters_by_envelope() {
        let ds = MemoryDatasource::new(vec![
            Feature::new(1, vec![Geometry::Point((0.0, 0.0))]),
            Feature::new(2, vec![Geometry::Point((100.0, 100.0))]),
        ]);
        let result = ds.query(Envelope { min_x: -1.0, min_y: -1.0, max_x: 1.0, max_y: 1.0 }).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 1);
    }
}
