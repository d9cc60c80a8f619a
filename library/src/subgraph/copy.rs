//! Deep copy of a referenced graph into a subgraph context.

use std::collections::HashMap;

use indexmap::IndexSet;
use log::{debug, warn};
use serde_json::Value;
use uuid::Uuid;

use super::{SubgraphInstance, expressions, reconcile, subgraph_context, subgraph_context_mut};
use crate::error::LibraryError;
use crate::model::asset::AssetId;
use crate::model::document::Document;
use crate::model::graph::{Object, ObjectId};
use crate::model::graph_analysis;

/// Duplicates a set of graph objects as an isomorphic set.
pub trait Duplicator: Send + Sync {
    /// Return one duplicate per original, in the same order, each with a fresh id.
    ///
    /// Ids that point inside `originals` must be remapped to the matching duplicate;
    /// ids that point outside are kept.
    fn duplicate(&self, originals: &[&Object]) -> Result<Vec<Object>, LibraryError>;
}

/// Duplicates through an in-memory JSON pass: serialize, remap ids, deserialize.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryDuplicator;

impl Duplicator for MemoryDuplicator {
    fn duplicate(&self, originals: &[&Object]) -> Result<Vec<Object>, LibraryError> {
        let remap: HashMap<String, String> = originals
            .iter()
            .map(|o| (o.id().to_string(), Uuid::new_v4().to_string()))
            .collect();

        originals
            .iter()
            .map(|original| {
                let mut value = serde_json::to_value(original)?;
                remap_ids(&mut value, &remap);
                Ok(serde_json::from_value(value)?)
            })
            .collect()
    }
}

fn remap_ids(value: &mut Value, remap: &HashMap<String, String>) {
    match value {
        Value::String(s) => {
            if let Some(new_id) = remap.get(s.as_str()) {
                *s = new_id.clone();
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|v| remap_ids(v, remap)),
        Value::Object(map) => map.values_mut().for_each(|v| remap_ids(v, remap)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Drop the current copy and build a fresh one from the referenced asset.
///
/// Without a resolvable reference the context ends up detached with no flow names.
/// On failure the context is left detached and its pins are not touched.
pub fn recreate_copy(doc: &mut Document, id: ObjectId) -> Result<(), LibraryError> {
    detach_from_original(doc, id)?;

    if let Some((asset, graph)) = resolve_reference(doc, id)? {
        instantiate(doc, id, asset, graph)?;
    }

    reconcile::refresh_flow_inputs(doc, id)?;
    expressions::sync_input_slots(doc, id)?;
    expressions::patch_input_expressions(doc, id)
}

fn resolve_reference(
    doc: &Document,
    id: ObjectId,
) -> Result<Option<(AssetId, ObjectId)>, LibraryError> {
    let Some(asset) = subgraph_context(doc, id)?.subgraph else {
        debug!("Subgraph context {} has no subgraph set", id);
        return Ok(None);
    };
    match doc
        .assets
        .resolve(asset)
        .filter(|graph| doc.graph(*graph).is_ok())
    {
        Some(graph) => Ok(Some((asset, graph))),
        None => {
            warn!(
                "Subgraph asset {} is unavailable, context {} stays detached",
                asset, id
            );
            Ok(None)
        }
    }
}

fn instantiate(
    doc: &mut Document,
    id: ObjectId,
    asset: AssetId,
    graph: ObjectId,
) -> Result<(), LibraryError> {
    if doc.is_instancing(asset) {
        let name = doc
            .assets
            .get(asset)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| asset.to_string());
        return Err(LibraryError::SubgraphCycle(name));
    }
    let max_depth = doc.settings().max_nesting_depth;
    if doc.instancing_depth() >= max_depth {
        return Err(LibraryError::NestingTooDeep(max_depth));
    }

    doc.push_instancing(asset);
    let result = build_instance(doc, id, graph);
    doc.pop_instancing();
    result
}

fn build_instance(doc: &mut Document, id: ObjectId, graph: ObjectId) -> Result<(), LibraryError> {
    let mut dependencies = IndexSet::new();
    graph_analysis::collect_dependencies(doc, graph, false, &mut dependencies)?;

    let duplicated = {
        let originals = dependencies
            .iter()
            .map(|d| doc.get(*d).ok_or(LibraryError::ObjectNotFound(*d)))
            .collect::<Result<Vec<&Object>, _>>()?;
        doc.duplicator().duplicate(&originals)?
    };
    if duplicated.len() != dependencies.len() {
        return Err(LibraryError::duplication(format!(
            "expected {} duplicates, got {}",
            dependencies.len(),
            duplicated.len()
        )));
    }

    // Zip originals and duplicates position by position into the correspondence.
    let mut instance = SubgraphInstance::default();
    let mut copies = Vec::with_capacity(duplicated.len());
    for (original_id, mut copy) in dependencies.iter().copied().zip(duplicated) {
        let original = doc
            .get(original_id)
            .ok_or(LibraryError::ObjectNotFound(original_id))?;
        let copy_id = copy.id();
        if std::mem::discriminant(original) != std::mem::discriminant(&copy) {
            return Err(LibraryError::duplication(format!(
                "duplicate of {} has a different kind",
                original_id
            )));
        }
        if copy_id == original_id || doc.contains(copy_id) {
            return Err(LibraryError::duplication(format!(
                "duplicate id {} is already in use",
                copy_id
            )));
        }

        if let Object::Slot(slot) = original {
            let owned_by_parameter = doc.get(slot.owner).is_some_and(Object::is_parameter);
            if slot.is_input() || owned_by_parameter {
                instance.original_to_copy.insert(original_id, copy_id);
            }
        }
        if copy.is_node() {
            copy.set_parent(Some(id));
            instance.owned_children.push(copy_id);
        }
        instance.owned_objects.push(copy_id);
        copies.push(copy);
    }

    for copy in copies {
        doc.insert_object(copy);
    }
    for original in instance.original_to_copy.keys() {
        doc.observers_mut().subscribe(*original, id);
    }

    let nested: Vec<ObjectId> = instance
        .owned_children
        .iter()
        .copied()
        .filter(|child| super::is_subgraph_context(doc, *child))
        .collect();
    debug!(
        "Subgraph context {}: copied {} objects ({} nodes, {} proxy slots)",
        id,
        instance.owned_objects.len(),
        instance.owned_children.len(),
        instance.original_to_copy.len()
    );
    subgraph_context_mut(doc, id)?.set_instance(instance);

    // Nested contexts build their own copies before this one resolves its flow names.
    for child in nested {
        if let Err(e) = recreate_copy(doc, child) {
            detach_from_original(doc, id)?;
            return Err(e);
        }
    }
    Ok(())
}

/// Unsubscribe from every original, then destroy every owned object.
///
/// Idempotent: a detached context is left untouched.
pub fn detach_from_original(doc: &mut Document, id: ObjectId) -> Result<(), LibraryError> {
    let Some(instance) = subgraph_context_mut(doc, id)?.take_instance() else {
        return Ok(());
    };

    doc.observers_mut().unsubscribe_all(id);
    for child in &instance.owned_children {
        if super::is_subgraph_context(doc, *child) {
            detach_from_original(doc, *child)?;
        }
    }
    for object in &instance.owned_objects {
        doc.remove_object(*object);
    }

    debug!(
        "Subgraph context {} detached, destroyed {} objects",
        id,
        instance.owned_objects.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::graph::{Context, ContextKind, FlowLink, Slot};
    use crate::model::property::ValueType;

    #[test]
    fn test_memory_duplicator_remaps_internal_ids() {
        let mut spawner = Context::new(ContextKind::Spawner);
        let mut init = Context::new(ContextKind::Initialize);
        let outside = Uuid::new_v4();
        init.input_flow[0].links.push(FlowLink::new(spawner.id, 0));
        spawner.parent = Some(outside);
        let slot = Slot::input(init.id, "lifetime", ValueType::Float);

        let spawner = Object::Context(spawner);
        let init = Object::Context(init);
        let slot = Object::Slot(slot);
        let originals = vec![&spawner, &init, &slot];

        let copies = MemoryDuplicator.duplicate(&originals).unwrap();
        assert_eq!(copies.len(), 3);

        let spawner_copy = copies[0].id();
        let init_copy = copies[1].id();
        assert_ne!(spawner_copy, spawner.id());
        assert_ne!(init_copy, init.id());

        // Internal references follow the copies, external ones stay.
        let Object::Context(init_ctx) = &copies[1] else {
            panic!("expected a context");
        };
        assert_eq!(init_ctx.input_flow[0].links[0].from, spawner_copy);
        assert_eq!(copies[0].parent(), Some(outside));
        assert_eq!(copies[2].as_slot().unwrap().owner, init_copy);
    }

    #[test]
    fn test_memory_duplicator_keeps_kinds_in_order() {
        let event = Object::Context(Context::new(ContextKind::event("Boom")));
        let slot = Object::Slot(Slot::output(Uuid::new_v4(), "out", ValueType::Integer));
        let copies = MemoryDuplicator.duplicate(&[&event, &slot]).unwrap();
        assert_eq!(copies[0].trigger_event_name(), Some("Boom"));
        assert!(copies[1].as_slot().is_some());
    }
}
