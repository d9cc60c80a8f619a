//! Subgraph instancing.
//!
//! A subgraph context references a graph asset and owns a private copy of that
//! asset's nodes. The copy stays live: edits to original parameters and inputs are
//! pushed into it through proxy links, and the context's flow input pins are derived
//! from the trigger events, spawners and nested subgraphs found in it.
//!
//! The pipeline on enable or reference change is
//! [`copy::recreate_copy`] → [`flow_names::resolve_flow_input_names`] →
//! [`reconcile::reconcile_flow_slots`] → [`expressions::sync_input_slots`], with
//! [`expressions::patch_input_expressions`] run on expression invalidation.

pub mod copy;
pub mod dependencies;
pub mod expressions;
pub mod flow_names;
pub mod reconcile;
pub(crate) mod router;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::LibraryError;
use crate::model::asset::AssetId;
use crate::model::document::Document;
use crate::model::graph::{Object, ObjectId};

pub use copy::{Duplicator, MemoryDuplicator};
pub use flow_names::{PLAY_EVENT_NAME, STOP_EVENT_NAME};

/// Settings and runtime state of a subgraph context.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SubgraphContext {
    /// Referenced asset. `None` means no subgraph is set.
    pub subgraph: Option<AssetId>,
    /// Resolved flow input names; the first `max_input_flow` are materialized as pins.
    #[serde(default)]
    pub flow_input_names: Vec<String>,
    #[serde(skip)]
    instance: Option<SubgraphInstance>,
}

/// What a context owns while attached to a resolved subgraph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubgraphInstance {
    /// Copied contexts, operators and parameters.
    pub owned_children: Vec<ObjectId>,
    /// Every copied object (children plus their slots and data).
    pub owned_objects: Vec<ObjectId>,
    /// Original slot → its copy. Every key is subscribed in the observer table.
    pub original_to_copy: IndexMap<ObjectId, ObjectId>,
}

impl SubgraphContext {
    pub fn new(subgraph: Option<AssetId>) -> Self {
        Self {
            subgraph,
            flow_input_names: Vec::new(),
            instance: None,
        }
    }

    pub fn instance(&self) -> Option<&SubgraphInstance> {
        self.instance.as_ref()
    }

    /// `None` while detached.
    pub fn owned_children(&self) -> Option<&[ObjectId]> {
        self.instance.as_ref().map(|i| i.owned_children.as_slice())
    }

    pub fn original_to_copy(&self) -> Option<&IndexMap<ObjectId, ObjectId>> {
        self.instance.as_ref().map(|i| &i.original_to_copy)
    }

    /// Number of flow input pins materialized for the current names.
    pub fn input_flow_count(&self, max_input_flow: usize) -> usize {
        self.flow_input_names.len().min(max_input_flow)
    }

    pub fn flow_input_name(&self, index: usize) -> Option<&str> {
        self.flow_input_names.get(index).map(String::as_str)
    }

    pub fn flow_input_index(&self, name: &str) -> Option<usize> {
        self.flow_input_names.iter().position(|n| n == name)
    }

    pub(crate) fn set_instance(&mut self, instance: SubgraphInstance) {
        self.instance = Some(instance);
    }

    pub(crate) fn take_instance(&mut self) -> Option<SubgraphInstance> {
        self.instance.take()
    }
}

/// Build the owned copy. Called when the context is added or loaded.
pub fn enable(doc: &mut Document, id: ObjectId) -> Result<(), LibraryError> {
    copy::recreate_copy(doc, id)
}

/// Tear down the owned copy and every subscription it holds.
pub fn disable(doc: &mut Document, id: ObjectId) -> Result<(), LibraryError> {
    copy::detach_from_original(doc, id)
}

pub fn subgraph_context(doc: &Document, id: ObjectId) -> Result<&SubgraphContext, LibraryError> {
    doc.context(id)?
        .as_subgraph()
        .ok_or_else(|| LibraryError::invalid_argument(format!("{} is not a subgraph context", id)))
}

pub(crate) fn subgraph_context_mut(
    doc: &mut Document,
    id: ObjectId,
) -> Result<&mut SubgraphContext, LibraryError> {
    doc.context_mut(id)?
        .as_subgraph_mut()
        .ok_or_else(|| LibraryError::invalid_argument(format!("{} is not a subgraph context", id)))
}

pub fn owned_children(doc: &Document, id: ObjectId) -> Result<Option<&[ObjectId]>, LibraryError> {
    Ok(subgraph_context(doc, id)?.owned_children())
}

pub fn flow_input_names(doc: &Document, id: ObjectId) -> Result<&[String], LibraryError> {
    Ok(&subgraph_context(doc, id)?.flow_input_names)
}

/// False exactly while detached: no reference, or the referenced resource is unavailable.
pub fn can_be_compiled(doc: &Document, id: ObjectId) -> Result<bool, LibraryError> {
    let subgraph = subgraph_context(doc, id)?;
    Ok(subgraph.subgraph.is_some() && subgraph.instance.is_some())
}

/// Name shown on the node: the asset name, or "Subgraph" when none is set.
pub fn display_name(doc: &Document, id: ObjectId) -> Result<String, LibraryError> {
    let subgraph = subgraph_context(doc, id)?;
    Ok(subgraph
        .subgraph
        .and_then(|asset| doc.assets.get(asset))
        .map(|asset| asset.name.clone())
        .unwrap_or_else(|| "Subgraph".to_string()))
}

pub(crate) fn is_subgraph_context(doc: &Document, id: ObjectId) -> bool {
    doc.get(id).is_some_and(|o: &Object| o.as_subgraph().is_some())
}
