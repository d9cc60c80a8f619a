//! Heterogeneous graph objects stored in a [`Document`](crate::model::document::Document).
//!
//! Every object is addressed by an [`ObjectId`]. References between objects
//! (children, slot owners, links) are ids, never pointers, so a set of objects can be
//! duplicated by remapping ids.

pub mod container;
pub mod context;
pub mod operator;
pub mod parameter;
pub mod slot;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use container::Graph;
pub use context::{Context, ContextData, ContextKind, DataKind, FlowLink, FlowSlot};
pub use operator::Operator;
pub use parameter::Parameter;
pub use slot::{Slot, SlotDirection};

use crate::subgraph::SubgraphContext;

pub type ObjectId = Uuid;

/// Link state of a spawner's two gates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnerGates {
    pub start_linked: bool,
    pub stop_linked: bool,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(tag = "object_type")]
pub enum Object {
    Graph(Graph),
    Context(Context),
    Operator(Operator),
    Parameter(Parameter),
    Slot(Slot),
    Data(ContextData),
}

impl Object {
    pub fn id(&self) -> ObjectId {
        match self {
            Object::Graph(g) => g.id,
            Object::Context(c) => c.id,
            Object::Operator(o) => o.id,
            Object::Parameter(p) => p.id,
            Object::Slot(s) => s.id,
            Object::Data(d) => d.id,
        }
    }

    /// Object that receives this object's change notifications.
    pub fn parent(&self) -> Option<ObjectId> {
        match self {
            Object::Graph(_) => None,
            Object::Context(c) => c.parent,
            Object::Operator(o) => o.parent,
            Object::Parameter(p) => p.parent,
            Object::Slot(s) => Some(s.owner),
            Object::Data(d) => Some(d.owner),
        }
    }

    pub fn set_parent(&mut self, parent: Option<ObjectId>) {
        match self {
            Object::Context(c) => c.parent = parent,
            Object::Operator(o) => o.parent = parent,
            Object::Parameter(p) => p.parent = parent,
            Object::Graph(_) | Object::Slot(_) | Object::Data(_) => {}
        }
    }

    /// Contexts, operators and parameters: the node kinds a subgraph instance keeps.
    pub fn is_node(&self) -> bool {
        matches!(
            self,
            Object::Context(_) | Object::Operator(_) | Object::Parameter(_)
        )
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, Object::Parameter(_))
    }

    /// Name of the trigger event this object emits, if it is a trigger emitter.
    pub fn trigger_event_name(&self) -> Option<&str> {
        match self {
            Object::Context(Context {
                kind: ContextKind::Event { event_name },
                ..
            }) => Some(event_name.as_str()),
            _ => None,
        }
    }

    /// Gate link state, if this object is a spawner.
    pub fn spawner_gates(&self) -> Option<SpawnerGates> {
        match self {
            Object::Context(c) if matches!(c.kind, ContextKind::Spawner) => Some(SpawnerGates {
                start_linked: c.input_flow.first().is_some_and(FlowSlot::is_linked),
                stop_linked: c.input_flow.get(1).is_some_and(FlowSlot::is_linked),
            }),
            _ => None,
        }
    }

    /// Flow input names a nested subgraph context exposes, capped at `max_input_flow`.
    pub fn nested_flow_names(&self, max_input_flow: usize) -> Option<&[String]> {
        self.as_subgraph()
            .map(|subgraph| &subgraph.flow_input_names[..subgraph.input_flow_count(max_input_flow)])
    }

    pub fn as_graph(&self) -> Option<&Graph> {
        match self {
            Object::Graph(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<&Context> {
        match self {
            Object::Context(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_parameter(&self) -> Option<&Parameter> {
        match self {
            Object::Parameter(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_slot(&self) -> Option<&Slot> {
        match self {
            Object::Slot(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_subgraph(&self) -> Option<&SubgraphContext> {
        self.as_context().and_then(Context::as_subgraph)
    }

    /// Slots owned directly by this object.
    pub fn slot_ids(&self) -> Vec<ObjectId> {
        match self {
            Object::Context(c) => c.input_slots.clone(),
            Object::Operator(o) => o.input_slots.iter().chain(&o.output_slots).copied().collect(),
            Object::Parameter(p) => vec![p.slot],
            Object::Graph(_) | Object::Slot(_) | Object::Data(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::property::ValueType;

    #[test]
    fn test_spawner_gates_follow_links() {
        let mut spawner = Context::new(ContextKind::Spawner);
        spawner.input_flow[1].links.push(FlowLink::new(Uuid::new_v4(), 0));
        let gates = Object::Context(spawner).spawner_gates().unwrap();
        assert!(!gates.start_linked);
        assert!(gates.stop_linked);
    }

    #[test]
    fn test_capabilities_are_exclusive() {
        let event = Object::Context(Context::new(ContextKind::event("Boom")));
        assert_eq!(event.trigger_event_name(), Some("Boom"));
        assert!(event.spawner_gates().is_none());
        assert!(event.nested_flow_names(5).is_none());

        let param = Object::Parameter(Parameter::new("size", ValueType::Float, Uuid::new_v4()));
        assert!(param.is_parameter());
        assert!(param.trigger_event_name().is_none());
    }

    #[test]
    fn test_nested_flow_names_are_capped() {
        let mut subgraph = SubgraphContext::default();
        subgraph.flow_input_names = (0..7).map(|i| format!("E{}", i)).collect();
        let nested = Object::Context(Context::new(ContextKind::Subgraph(subgraph)));
        assert_eq!(nested.nested_flow_names(5).unwrap().len(), 5);
    }

    #[test]
    fn test_object_json_tagging() {
        let object = Object::Context(Context::new(ContextKind::Spawner));
        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(json["object_type"], "Context");
        assert_eq!(json["kind"]["kind"], "Spawner");
        let back: Object = serde_json::from_value(json).unwrap();
        assert_eq!(back, object);
    }
}
