//! Feature / geometry / attribute containers that the unionizer and adminizer
//! operate on. Mirrors a mapnik-vector-tile style in-memory feature model:
//! a layer is an ordered list of features, each carrying a small ordered
//! attribute list and a list of geometries with move-to/line-to iteration.

use ordered_float::OrderedFloat;

/// A single (x, y) vertex.
pub type Vertex = (f64, f64);

/// One step of a geometry's vertex command stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexCmd {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    End,
}

/// A point / linestring / polygon geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Vertex),
    LineString(Vec<Vertex>),
    Polygon {
        exterior: Vec<Vertex>,
        interiors: Vec<Vec<Vertex>>,
    },
}

impl Geometry {
    /// Total vertex count across all rings/points.
    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Point(_) => 1,
            Geometry::LineString(coords) => coords.len(),
            Geometry::Polygon { exterior, interiors } => {
                exterior.len() + interiors.iter().map(Vec::len).sum::<usize>()
            }
        }
    }

    /// Emits the MoveTo/LineTo/End command stream for this geometry.
    pub fn commands(&self) -> Vec<VertexCmd> {
        match self {
            Geometry::Point(v) => vec![VertexCmd::MoveTo(v.0, v.1), VertexCmd::End],
            Geometry::LineString(coords) => line_commands(coords),
            Geometry::Polygon { exterior, interiors } => {
                let mut cmds = line_commands(exterior);
                for ring in interiors {
                    cmds.extend(line_commands(ring));
                }
                cmds
            }
        }
    }

    /// A degenerate linestring (fewer than 2 vertices) is ignored by the unionizer.
    pub fn is_linestring(&self) -> bool {
        matches!(self, Geometry::LineString(_))
    }

    pub fn as_linestring(&self) -> Option<&[Vertex]> {
        match self {
            Geometry::LineString(coords) => Some(coords),
            _ => None,
        }
    }

    pub fn as_linestring_mut(&mut self) -> Option<&mut Vec<Vertex>> {
        match self {
            Geometry::LineString(coords) => Some(coords),
            _ => None,
        }
    }
}

fn line_commands(coords: &[Vertex]) -> Vec<VertexCmd> {
    let mut cmds = Vec::with_capacity(coords.len() + 1);
    for (i, v) in coords.iter().enumerate() {
        if i == 0 {
            cmds.push(VertexCmd::MoveTo(v.0, v.1));
        } else {
            cmds.push(VertexCmd::LineTo(v.0, v.1));
        }
    }
    cmds.push(VertexCmd::End);
    cmds
}

/// Attribute value: the sum type carried by a feature's attribute list.
/// Variant order below doubles as the total order used when comparing
/// candidate match-tag tuples (§4.2) — it has no meaning beyond giving the
/// comparator a deterministic, type-stable ordering.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Eq for AttrValue {}

impl PartialOrd for AttrValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttrValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use AttrValue::*;
        fn rank(v: &AttrValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Int(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => OrderedFloat(*a).cmp(&OrderedFloat(*b)),
            (String(a), String(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

/// An entity: numeric id, ordered geometry list, ordered attribute list.
/// The attribute list is a small linear `Vec` (not a `HashMap`) to preserve
/// insertion order the way a decoded vector-tile feature does.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: u64,
    pub geometries: Vec<Geometry>,
    attrs: Vec<(String, AttrValue)>,
}

impl Feature {
    pub fn new(id: u64, geometries: Vec<Geometry>) -> Self {
        Feature { id, geometries, attrs: Vec::new() }
    }

    pub fn has(&self, key: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Replaces the value at `key` if present, inserting it otherwise.
    pub fn put(&mut self, key: &str, value: AttrValue) {
        if let Some(entry) = self.attrs.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.attrs.push((key.to_string(), value));
        }
    }

    /// Inserts a new key; behaves like `put` when the key already exists.
    pub fn put_new(&mut self, key: &str, value: AttrValue) {
        self.put(key, value);
    }

    /// Sets `key` to the null variant — the documented deletion protocol;
    /// the downstream encoder is expected to skip null attributes.
    pub fn delete(&mut self, key: &str) {
        self.put(key, AttrValue::Null);
    }

    pub fn entries(&self) -> impl Iterator<Item = &(String, AttrValue)> {
        self.attrs.iter()
    }

    pub fn envelope(&self) -> Option<Envelope> {
        let mut env: Option<Envelope> = None;
        for geom in &self.geometries {
            let geom_env = geometry_envelope(geom);
            env = Some(match env {
                Some(e) => e.union(&geom_env),
                None => geom_env,
            });
        }
        env
    }
}

/// An axis-aligned bounding box, used for layer/feature envelopes and as the
/// R-tree envelope type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    pub fn point(x: f64, y: f64) -> Self {
        Envelope { min_x: x, min_y: y, max_x: x, max_y: y }
    }

    pub fn union(&self, other: &Envelope) -> Envelope {
        Envelope {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn intersects(&self, other: &Envelope) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

fn geometry_envelope(geom: &Geometry) -> Envelope {
    let mut iter: Box<dyn Iterator<Item = &Vertex>> = match geom {
        Geometry::Point(v) => Box::new(std::iter::once(v)),
        Geometry::LineString(coords) => Box::new(coords.iter()),
        Geometry::Polygon { exterior, interiors } => {
            Box::new(exterior.iter().chain(interiors.iter().flatten()))
        }
    };
    let first = iter.next().expect("geometry has at least one vertex");
    let mut env = Envelope::point(first.0, first.1);
    for v in iter {
        env = env.union(&Envelope::point(v.0, v.1));
    }
    env
}

/// An ordered sequence of features sharing a schema.
#[derive(Debug, Clone, Default)]
pub struct Layer {
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(features: Vec<Feature>) -> Self {
        Layer { features }
    }

    pub fn envelope(&self) -> Option<Envelope> {
        self.features.iter().filter_map(Feature::envelope).fold(None, |acc, e| {
            Some(match acc {
                Some(a) => a.union(&e),
                None => e,
            })
        })
    }

    /// Removes every feature whose geometry list is empty.
    pub fn remove_empty_features(&mut self) {
        self.features.retain(|f| !f.geometries.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_put_then_get() {
        let mut f = Feature::new(1, vec![]);
        assert!(!f.has("road"));
        f.put_new("road", AttrValue::String("main".into()));
        assert_eq!(f.get("road"), Some(&AttrValue::String("main".into())));
        f.put("road", AttrValue::String("secondary".into()));
        assert_eq!(f.get("road"), Some(&AttrValue::String("secondary".into())));
    }

    #[test]
    fn delete_sets_null() {
        let mut f = Feature::new(1, vec![]);
        f.put_new("ref", AttrValue::String("A1".into()));
        f.delete("ref");
        assert_eq!(f.get("ref"), Some(&AttrValue::Null));
    }

    #[test]
    fn attr_value_ordering_is_type_stable() {
        assert!(AttrValue::Null < AttrValue::Bool(false));
        assert!(AttrValue::Bool(true) < AttrValue::Int(0));
        assert!(AttrValue::Int(100) < AttrValue::Float(0.0));
        assert!(AttrValue::Float(100.0) < AttrValue::String(String::new()));
        assert!(AttrValue::Int(1) < AttrValue::Int(2));
    }

    #[test]
    fn linestring_commands_are_moveto_then_lineto() {
        let geom = Geometry::LineString(vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let cmds = geom.commands();
        assert_eq!(cmds[0], VertexCmd::MoveTo(0.0, 0.0));
        assert_eq!(cmds[1], VertexCmd::LineTo(1.0, 0.0));
        assert_eq!(cmds[2], VertexCmd::LineTo(2.0, 0.0));
        assert_eq!(cmds[3], VertexCmd::End);
    }

    #[test]
    fn layer_culls_empty_features() {
        let mut layer = Layer::new(vec![
            Feature::new(1, vec![Geometry::Point((0.0, 0.0))]),
            Feature::new(2, vec![]),
        ]);
        layer.remove_empty_features();
        assert_eq!(layer.features.len(), 1);
        assert_eq!(layer.features[0].id, 1);
    }

    #[test]
    fn envelope_union_across_features() {
        let layer = Layer::new(vec![
            Feature::new(1, vec![Geometry::Point((0.0, 0.0))]),
            Feature::new(2, vec![Geometry::Point((5.0, 5.0))]),
        ]);
        let env = layer.envelope().unwrap();
        assert_eq!(env.min_x, 0.0);
        assert_eq!(env.max_x, 5.0);
    }
}
