//! Contexts: the flow-driven stages of a graph (events, spawners, particle stages).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ObjectId;
use crate::subgraph::SubgraphContext;

/// Kind of a context. Closed set; capability queries on `Object` match on it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind")]
pub enum ContextKind {
    /// Emits a named trigger event.
    Event { event_name: String },
    /// Spawner with a start gate (flow input 0) and a stop gate (flow input 1).
    Spawner,
    Initialize,
    Update,
    Output,
    /// Instances another graph asset.
    Subgraph(SubgraphContext),
}

impl ContextKind {
    pub fn event(name: &str) -> Self {
        ContextKind::Event {
            event_name: name.to_string(),
        }
    }

    /// Number of flow inputs, or `None` when the count is derived at runtime.
    pub fn fixed_input_flow_count(&self) -> Option<usize> {
        match self {
            ContextKind::Event { .. } => Some(0),
            ContextKind::Spawner => Some(2),
            ContextKind::Initialize | ContextKind::Update | ContextKind::Output => Some(1),
            ContextKind::Subgraph(_) => None,
        }
    }

    pub fn output_flow_count(&self) -> usize {
        match self {
            ContextKind::Event { .. }
            | ContextKind::Spawner
            | ContextKind::Initialize
            | ContextKind::Update => 1,
            ContextKind::Output | ContextKind::Subgraph(_) => 0,
        }
    }

    /// Kind of secondary data resource the context owns, if any.
    pub fn data_kind(&self) -> Option<DataKind> {
        match self {
            ContextKind::Spawner => Some(DataKind::Spawn),
            ContextKind::Initialize | ContextKind::Update | ContextKind::Output => {
                Some(DataKind::Particle { capacity: 128 })
            }
            ContextKind::Event { .. } | ContextKind::Subgraph(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContextKind::Event { .. } => "Event",
            ContextKind::Spawner => "Spawner",
            ContextKind::Initialize => "Initialize",
            ContextKind::Update => "Update",
            ContextKind::Output => "Output",
            ContextKind::Subgraph(_) => "Subgraph",
        }
    }
}

/// Incoming flow link on a flow input pin.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FlowLink {
    pub id: Uuid,
    /// Upstream context.
    pub from: ObjectId,
    /// Flow output index on the upstream context.
    pub from_index: usize,
}

impl FlowLink {
    pub fn new(from: ObjectId, from_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            from_index,
        }
    }
}

/// A flow input pin. Owns its incoming links, so moving the slot moves the links.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowSlot {
    #[serde(default)]
    pub links: Vec<FlowLink>,
}

impl FlowSlot {
    pub fn is_linked(&self) -> bool {
        !self.links.is_empty()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Context {
    pub id: ObjectId,
    pub parent: Option<ObjectId>,
    pub kind: ContextKind,
    #[serde(default)]
    pub input_flow: Vec<FlowSlot>,
    #[serde(default)]
    pub input_slots: Vec<ObjectId>,
    #[serde(default)]
    pub data: Option<ObjectId>,
}

impl Context {
    pub fn new(kind: ContextKind) -> Self {
        let input_flow = vec![FlowSlot::default(); kind.fixed_input_flow_count().unwrap_or(0)];
        Self {
            id: Uuid::new_v4(),
            parent: None,
            kind,
            input_flow,
            input_slots: Vec::new(),
            data: None,
        }
    }

    pub fn as_subgraph(&self) -> Option<&SubgraphContext> {
        match &self.kind {
            ContextKind::Subgraph(subgraph) => Some(subgraph),
            _ => None,
        }
    }

    pub fn as_subgraph_mut(&mut self) -> Option<&mut SubgraphContext> {
        match &mut self.kind {
            ContextKind::Subgraph(subgraph) => Some(subgraph),
            _ => None,
        }
    }

    pub fn output_flow_count(&self) -> usize {
        self.kind.output_flow_count()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DataKind {
    Spawn,
    Particle { capacity: u32 },
}

/// Secondary resource owned by a context; destroyed with it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ContextData {
    pub id: ObjectId,
    pub owner: ObjectId,
    pub kind: DataKind,
}

impl ContextData {
    pub fn new(owner: ObjectId, kind: DataKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            kind,
        }
    }
}
