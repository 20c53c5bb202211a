//! The entity table and edge list extracted from one diagram source.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{edge::Edge, entity::Entity, threat::ThreatLabel};

/// Entities keyed by id plus the edges between them, in source order.
///
/// A diagram lives for one pipeline run. Predictions are the only thing
/// attached after construction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagram {
    entities: IndexMap<String, Entity>,
    edges: Vec<Edge>,
}

impl Diagram {
    /// Create a new Diagram from an entity table and edge list.
    pub fn new(entities: IndexMap<String, Entity>, edges: Vec<Edge>) -> Self {
        Self { entities, edges }
    }

    /// Borrow the entity table.
    pub fn entities(&self) -> &IndexMap<String, Entity> {
        &self.entities
    }

    /// Look up an entity by id.
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Borrow the edges in source order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Attach predictions to the edges, positionally.
    ///
    /// # Panics
    ///
    /// Panics if `labels` does not have exactly one label per edge. Callers
    /// validate the count at the classifier boundary.
    pub fn attach_predictions(&mut self, labels: Vec<ThreatLabel>) {
        assert_eq!(
            labels.len(),
            self.edges.len(),
            "one prediction per edge is required"
        );
        for (edge, label) in self.edges.iter_mut().zip(labels) {
            edge.set_predicted_threat(label);
        }
    }
}
