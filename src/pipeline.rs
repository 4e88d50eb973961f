//! Composes the unionizer and adminizer into one ordered pass over a layer,
//! the way a tile source chains its post-processors (§2, Component table).

use crate::adminizer::Adminizer;
use crate::collab::MapContext;
use crate::error::Result;
use crate::geometry::Layer;
use crate::unionizer::Unionizer;

/// A single stage in a processing pipeline.
enum Stage {
    Unionize(Unionizer),
    Adminize(Adminizer),
}

/// An ordered list of processors run over one layer in sequence. Each
/// processor sees the output of the previous one.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline { stages: Vec::new() }
    }

    pub fn unionize(mut self, unionizer: Unionizer) -> Self {
        self.stages.push(Stage::Unionize(unionizer));
        self
    }

    pub fn adminize(mut self, adminizer: Adminizer) -> Self {
        self.stages.push(Stage::Adminize(adminizer));
        self
    }

    /// Runs every stage over `layer` in the order they were added.
    pub fn run(&self, layer: &mut Layer, map_context: &dyn MapContext) -> Result<()> {
        for stage in &self.stages {
            match stage {
                Stage::Unionize(u) => u.process(layer, map_context),
                Stage::Adminize(a) => a.process(layer)?,
            }
        }
        Ok(())
    }
}
