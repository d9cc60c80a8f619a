//! Graph analysis utilities: dependency closures and link validation.
//!
//! Dependency sets are insertion ordered, which is what lets a duplicated set be
//! zipped back onto its originals position by position.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexSet;

use crate::error::LibraryError;
use crate::model::document::Document;
use crate::model::graph::{Object, ObjectId, SlotDirection};
use crate::subgraph;

/// Collect the objects `id` depends on into `objs`, depth first.
///
/// The object itself is not added. Subgraph contexts contribute their owned copies
/// only when `compile_only` is set: the editor surface must never see them twice.
pub fn collect_dependencies(
    doc: &Document,
    id: ObjectId,
    compile_only: bool,
    objs: &mut IndexSet<ObjectId>,
) -> Result<(), LibraryError> {
    let object = doc.get(id).ok_or(LibraryError::ObjectNotFound(id))?;
    match object {
        Object::Graph(graph) => {
            for child in &graph.child_ids {
                if objs.insert(*child) {
                    collect_dependencies(doc, *child, compile_only, objs)?;
                }
            }
        }
        Object::Context(context) => {
            objs.extend(context.input_slots.iter().copied());
            if let Some(data) = context.data {
                objs.insert(data);
            }
            if compile_only && context.as_subgraph().is_some() {
                subgraph::dependencies::collect_owned_dependencies(doc, id, objs)?;
            }
        }
        Object::Operator(_) | Object::Parameter(_) => {
            objs.extend(object.slot_ids());
        }
        Object::Slot(_) | Object::Data(_) => {}
    }
    Ok(())
}

/// Dependency set the compiler walks for a graph.
pub fn compile_dependencies(doc: &Document, graph: ObjectId) -> Result<IndexSet<ObjectId>, LibraryError> {
    let mut objs = IndexSet::new();
    collect_dependencies(doc, graph, true, &mut objs)?;
    Ok(objs)
}

/// Validate a flow link before adding it.
///
/// Checks:
/// - Both contexts exist
/// - No self-links
/// - Pin indices are in range
/// - No duplicate link on the same pin
/// - No cycles through flow links
pub fn validate_flow_link(
    doc: &Document,
    from: ObjectId,
    from_index: usize,
    to: ObjectId,
    to_index: usize,
) -> Result<(), String> {
    let source = doc
        .context(from)
        .map_err(|_| format!("Source context {} not found", from))?;
    let target = doc
        .context(to)
        .map_err(|_| format!("Destination context {} not found", to))?;

    if from == to {
        return Err("Cannot link a context to itself".to_string());
    }
    if from_index >= source.output_flow_count() {
        return Err(format!(
            "{} has no flow output {}",
            source.kind.label(),
            from_index
        ));
    }
    let Some(pin) = target.input_flow.get(to_index) else {
        return Err(format!(
            "{} has no flow input {}",
            target.kind.label(),
            to_index
        ));
    };
    if pin
        .links
        .iter()
        .any(|l| l.from == from && l.from_index == from_index)
    {
        return Err(format!("Flow input {}.{} is already linked to {}", to, to_index, from));
    }
    if would_create_flow_cycle(doc, from, to) {
        return Err("Flow link would create a cycle".to_string());
    }
    Ok(())
}

/// Contexts with a flow input linked from `id`.
pub fn downstream_contexts(doc: &Document, id: ObjectId) -> Vec<ObjectId> {
    doc.objects()
        .filter_map(Object::as_context)
        .filter(|c| c.input_flow.iter().flat_map(|p| &p.links).any(|l| l.from == id))
        .map(|c| c.id)
        .collect()
}

/// Returns true if `to` can already reach `from` through flow links.
fn would_create_flow_cycle(doc: &Document, from: ObjectId, to: ObjectId) -> bool {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(to);

    while let Some(current) = queue.pop_front() {
        if current == from {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        queue.extend(downstream_contexts(doc, current));
    }
    false
}

/// Validate a data link from an output slot to an input slot.
pub fn validate_slot_link(doc: &Document, output: ObjectId, input: ObjectId) -> Result<(), String> {
    let out_slot = doc
        .slot(output)
        .map_err(|_| format!("Source slot {} not found", output))?;
    let in_slot = doc
        .slot(input)
        .map_err(|_| format!("Destination slot {} not found", input))?;

    if out_slot.direction != SlotDirection::Output || in_slot.direction != SlotDirection::Input {
        return Err("Links go from an output slot to an input slot".to_string());
    }
    if out_slot.owner == in_slot.owner {
        return Err("Cannot link a node to itself".to_string());
    }
    if out_slot.value_type != in_slot.value_type {
        return Err(format!(
            "Type mismatch: {} cannot feed {}",
            out_slot.value_type, in_slot.value_type
        ));
    }
    // Each input accepts at most one link
    if in_slot.is_linked() {
        return Err(format!("Input slot '{}' already has a link", in_slot.name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::graph::ContextKind;
    use crate::model::property::{PropertyValue, ValueType};

    fn setup() -> (Document, ObjectId) {
        let mut doc = Document::new("Test");
        let graph = doc.add_graph("Main");
        (doc, graph)
    }

    #[test]
    fn test_dependencies_are_depth_first_and_ordered() {
        let (mut doc, graph) = setup();
        let spawner = doc.add_context(graph, ContextKind::Spawner).unwrap();
        let add = doc
            .add_operator(
                graph,
                "math.add",
                &[("a", ValueType::Float), ("b", ValueType::Float)],
                &[("sum", ValueType::Float)],
            )
            .unwrap();

        let mut objs = IndexSet::new();
        collect_dependencies(&doc, graph, false, &mut objs).unwrap();

        let spawner_data = doc.context(spawner).unwrap().data.unwrap();
        let add_slots = doc.get(add).unwrap().slot_ids();
        let mut expected = vec![spawner, spawner_data, add];
        expected.extend(add_slots);
        assert_eq!(objs.into_iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_parameter_slot_is_a_dependency() {
        let (mut doc, graph) = setup();
        let param = doc
            .add_parameter(graph, "rate", PropertyValue::from(10.0))
            .unwrap();
        let objs = compile_dependencies(&doc, graph).unwrap();
        assert!(objs.contains(&param));
        assert!(objs.contains(&doc.parameter(param).unwrap().slot));
    }

    #[test]
    fn test_validate_flow_link_self_loop() {
        let (mut doc, graph) = setup();
        let update = doc.add_context(graph, ContextKind::Update).unwrap();
        let result = validate_flow_link(&doc, update, 0, update, 0);
        assert!(result.unwrap_err().contains("itself"));
    }

    #[test]
    fn test_validate_flow_link_out_of_range() {
        let (mut doc, graph) = setup();
        let event = doc.add_context(graph, ContextKind::event("Boom")).unwrap();
        let spawner = doc.add_context(graph, ContextKind::Spawner).unwrap();
        assert!(validate_flow_link(&doc, event, 0, spawner, 2).is_err());
        assert!(validate_flow_link(&doc, spawner, 0, event, 0).is_err());
        assert!(validate_flow_link(&doc, event, 0, spawner, 1).is_ok());
    }

    #[test]
    fn test_flow_cycle_detection() {
        let (mut doc, graph) = setup();
        let init = doc.add_context(graph, ContextKind::Initialize).unwrap();
        let update = doc.add_context(graph, ContextKind::Update).unwrap();
        doc.link_flow(init, 0, update, 0).unwrap();

        let result = validate_flow_link(&doc, update, 0, init, 0);
        assert!(result.unwrap_err().contains("cycle"));
    }

    #[test]
    fn test_validate_slot_link_type_mismatch() {
        let (mut doc, graph) = setup();
        let a = doc
            .add_operator(graph, "math.add", &[], &[("out", ValueType::Float)])
            .unwrap();
        let b = doc
            .add_operator(graph, "logic.not", &[("in", ValueType::Boolean)], &[])
            .unwrap();
        let out = doc.get(a).unwrap().slot_ids()[0];
        let input = doc.get(b).unwrap().slot_ids()[0];
        assert!(validate_slot_link(&doc, out, input).unwrap_err().contains("mismatch"));
    }
}
