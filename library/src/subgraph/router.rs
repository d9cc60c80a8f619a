//! Routing of change notifications that reach a subgraph context.

use log::debug;

use super::{copy, expressions, reconcile, subgraph_context};
use crate::error::LibraryError;
use crate::invalidation::{self, InvalidationCause};
use crate::model::document::Document;
use crate::model::graph::ObjectId;

/// Handle a notification on its way up through the subgraph context `id`.
///
/// A setting change on the context itself recopies the subgraph. A setting change
/// from a nested context only re-resolves the flow inputs, since the nested context
/// has already rebuilt itself. Expression invalidation and value edits on the
/// context's own input slots re-patch exposed inputs.
pub(crate) fn on_invalidate(
    doc: &mut Document,
    id: ObjectId,
    origin: ObjectId,
    cause: InvalidationCause,
) -> Result<(), LibraryError> {
    match cause {
        InvalidationCause::SettingChanged => {
            if origin == id {
                if reference_is_recreatable(doc, id)? {
                    copy::recreate_copy(doc, id)?;
                } else {
                    debug!(
                        "Subgraph context {} references a missing asset, keeping its copy",
                        id
                    );
                }
            } else if super::is_subgraph_context(doc, origin) {
                reconcile::refresh_flow_inputs(doc, id)?;
            }
            invalidation::notify_observers(doc, id, cause)?;
            expressions::patch_input_expressions(doc, id)
        }
        InvalidationCause::ExpressionInvalidated => {
            invalidation::notify_observers(doc, id, cause)?;
            expressions::patch_input_expressions(doc, id)
        }
        InvalidationCause::ParamChanged if doc.context(id)?.input_slots.contains(&origin) => {
            invalidation::notify_observers(doc, id, cause)?;
            expressions::patch_input_expressions(doc, id)
        }
        _ => invalidation::notify_observers(doc, id, cause),
    }
}

/// An asset id that no longer exists in the library is a stale reference, not a
/// cleared one: it leaves the current copy alone.
fn reference_is_recreatable(doc: &Document, id: ObjectId) -> Result<bool, LibraryError> {
    Ok(match subgraph_context(doc, id)?.subgraph {
        None => true,
        Some(asset) => doc.assets.contains(asset),
    })
}

/// Push a changed original slot value into its proxy copy.
///
/// Only value changes are forwarded; the copy is never rebuilt from here. A proxy
/// that is an input of a nested subgraph copy re-patches that copy.
pub(crate) fn on_original_slot_modified(
    doc: &mut Document,
    subscriber: ObjectId,
    source: ObjectId,
    cause: InvalidationCause,
) -> Result<(), LibraryError> {
    if cause != InvalidationCause::ParamChanged {
        return Ok(());
    }
    let Some(copy) = subgraph_context(doc, subscriber)?
        .original_to_copy()
        .and_then(|proxies| proxies.get(&source))
        .copied()
    else {
        return Ok(());
    };

    let value = doc.slot(source)?.value.clone();
    let copy_slot = doc.slot_mut(copy)?;
    copy_slot.value = value;
    let owner = copy_slot.owner;
    if super::is_subgraph_context(doc, owner) {
        expressions::patch_input_expressions(doc, owner)?;
    }
    invalidation::invalidate(doc, subscriber, InvalidationCause::ParamChanged)
}
