//! Exposed parameters of an instanced subgraph and the data inputs that feed them.

use indexmap::IndexMap;
use log::{debug, warn};

use super::{can_be_compiled, is_subgraph_context, subgraph_context};
use crate::error::LibraryError;
use crate::model::document::Document;
use crate::model::graph::{Object, ObjectId, Parameter, Slot};
use crate::model::property::{PropertyValue, ValueType};

fn owned_parameters<'a>(
    doc: &'a Document,
    id: ObjectId,
    predicate: impl Fn(&Parameter) -> bool,
) -> Result<Option<Vec<&'a Parameter>>, LibraryError> {
    let Some(children) = subgraph_context(doc, id)?.owned_children() else {
        return Ok(None);
    };
    let mut parameters: Vec<&Parameter> = children
        .iter()
        .filter_map(|c| doc.get(*c))
        .filter_map(Object::as_parameter)
        .filter(|p| predicate(*p))
        .collect();
    parameters.sort_by_key(|p| p.order);
    Ok(Some(parameters))
}

/// Copied exposed input parameters, sorted by order. `None` while detached.
pub fn input_parameters(doc: &Document, id: ObjectId) -> Result<Option<Vec<ObjectId>>, LibraryError> {
    Ok(owned_parameters(doc, id, Parameter::is_exposed_input)?
        .map(|params| params.into_iter().map(|p| p.id).collect()))
}

/// Copied output parameters, sorted by order. Empty while detached.
pub fn output_parameters(doc: &Document, id: ObjectId) -> Result<Vec<ObjectId>, LibraryError> {
    Ok(owned_parameters(doc, id, |p| p.is_output)?
        .map(|params| params.into_iter().map(|p| p.id).collect())
        .unwrap_or_default())
}

/// Make the context's data input slots mirror its exposed input parameters.
///
/// Slots are matched by name and type, so an existing slot keeps its links and value
/// across a recopy. New slots start at the parameter's value. A context that still
/// references an unavailable asset keeps its slots untouched.
pub fn sync_input_slots(doc: &mut Document, id: ObjectId) -> Result<(), LibraryError> {
    let desired: Vec<(String, ValueType, PropertyValue)> = match input_parameters(doc, id)? {
        Some(params) => params
            .iter()
            .map(|p| -> Result<_, LibraryError> {
                let param = doc.parameter(*p)?;
                let value = doc.slot(param.slot)?.value.clone();
                Ok((param.exposed_name.clone(), param.value_type, value))
            })
            .collect::<Result<_, _>>()?,
        None if subgraph_context(doc, id)?.subgraph.is_some() => return Ok(()),
        None => Vec::new(),
    };

    let mut remaining = doc.context(id)?.input_slots.clone();
    let mut synced = Vec::with_capacity(desired.len());
    for (name, value_type, value) in desired {
        let existing = remaining.iter().position(|s| {
            doc.slot(*s)
                .is_ok_and(|slot| slot.name == name && slot.value_type == value_type)
        });
        match existing {
            Some(index) => synced.push(remaining.remove(index)),
            None => {
                let slot = Slot::input(id, &name, value_type).with_value(value);
                synced.push(doc.insert_object(Object::Slot(slot)));
            }
        }
    }

    if !remaining.is_empty() {
        debug!(
            "Subgraph context {} removed {} stale input slot(s)",
            id,
            remaining.len()
        );
    }
    for stale in remaining {
        doc.remove_slot(stale);
    }
    doc.context_mut(id)?.input_slots = synced;
    Ok(())
}

/// Current expression of an input slot: its upstream source when linked.
fn slot_expression(doc: &Document, slot: ObjectId) -> Result<PropertyValue, LibraryError> {
    let slot = doc.slot(slot)?;
    match slot.links.first() {
        Some(source) => Ok(doc.slot(*source)?.evaluate().clone()),
        None => Ok(slot.evaluate().clone()),
    }
}

/// Push each expression into the matching parameter copy, position by position.
///
/// Integers feed float parameters. Any other mismatch leaves that parameter on its own value.
pub fn transfer_expressions_to_parameters(
    doc: &mut Document,
    expressions: &[PropertyValue],
    parameters: &[ObjectId],
) -> Result<(), LibraryError> {
    for (expression, parameter) in expressions.iter().zip(parameters) {
        let param = doc.parameter(*parameter)?;
        let Some(value) = expression.coerce_to(param.value_type) else {
            warn!(
                "Cannot feed {} into parameter '{}' of type {}",
                expression.value_type(),
                param.exposed_name,
                param.value_type
            );
            continue;
        };
        let slot = param.slot;
        doc.slot_mut(slot)?.transferred = Some(value);
    }
    Ok(())
}

/// Re-evaluate the context's data inputs and push them into the owned parameter copies.
pub fn patch_input_expressions(doc: &mut Document, id: ObjectId) -> Result<(), LibraryError> {
    let Some(parameters) = input_parameters(doc, id)? else {
        return Ok(());
    };
    let expressions = doc
        .context(id)?
        .input_slots
        .iter()
        .map(|slot| slot_expression(doc, *slot))
        .collect::<Result<Vec<_>, _>>()?;
    transfer_expressions_to_parameters(doc, &expressions, &parameters)
}

/// Patch this context, then every nested subgraph copy below it.
///
/// Outer contexts go first: a nested input may be linked to a parameter copy the
/// outer patch just fed.
pub fn patch_nested_expressions(doc: &mut Document, id: ObjectId) -> Result<(), LibraryError> {
    patch_input_expressions(doc, id)?;
    let nested: Vec<ObjectId> = subgraph_context(doc, id)?
        .owned_children()
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(|child| is_subgraph_context(doc, *child))
        .collect();
    for child in nested {
        patch_nested_expressions(doc, child)?;
    }
    Ok(())
}

/// Patch the inputs of this context and its nested copies, then read back the value
/// every exposed input parameter compiles to.
pub fn compile_expressions(
    doc: &mut Document,
    id: ObjectId,
) -> Result<IndexMap<String, PropertyValue>, LibraryError> {
    if !can_be_compiled(doc, id)? {
        return Err(LibraryError::validation(format!(
            "Subgraph context {} has no resolved subgraph",
            id
        )));
    }
    patch_nested_expressions(doc, id)?;

    input_parameters(doc, id)?
        .unwrap_or_default()
        .into_iter()
        .map(|p| -> Result<_, LibraryError> {
            let param = doc.parameter(p)?;
            let value = doc.slot(param.slot)?.evaluate().clone();
            Ok((param.exposed_name.clone(), value))
        })
        .collect()
}
