//! Saved project records.
//!
//! A project stores a processed sketch as its structured dump next to some
//! bookkeeping. Persistence lives outside this crate; the record is only the
//! serialized shape handed to a store.

use serde::{Deserialize, Serialize};

use sketchmap_core::graph::Graph;

use crate::{error::SketchError, export::dump::Dump};

/// A saved project: a processed sketch plus its bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    id: String,
    name: String,
    data: Dump,
    owner: String,
}

impl ProjectRecord {
    /// Captures a positioned graph under a project.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Export`] if the graph has not been laid out.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        owner: impl Into<String>,
        graph: &Graph,
    ) -> Result<Self, SketchError> {
        Ok(Self {
            id: id.into(),
            name: name.into(),
            data: Dump::from_graph(graph)?,
            owner: owner.into(),
        })
    }

    /// Returns the project identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the owning user.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the stored dump.
    pub fn data(&self) -> &Dump {
        &self.data
    }

    /// Rebuilds the stored graph.
    pub fn graph(&self) -> Graph {
        self.data.clone().into_graph()
    }
}
