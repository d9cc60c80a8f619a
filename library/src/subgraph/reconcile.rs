//! Flow input pin reconciliation.
//!
//! Pins are rebuilt from the resolved names and existing links follow their pin
//! by name. A renamed pin is a new pin: its links are dropped.

use std::collections::HashMap;

use log::{debug, info};

use super::flow_names;
use crate::error::LibraryError;
use crate::model::document::Document;
use crate::model::graph::{Context, ContextKind, FlowSlot, Object, ObjectId};

/// Outcome of one reconciliation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub rebuilt: bool,
    /// Links whose pin name disappeared.
    pub dropped_links: usize,
}

/// A rebuild is due when the names changed or the pin count is off the capped target.
pub fn needs_reconciliation(
    current_names: &[String],
    pin_count: usize,
    resolved: &[String],
    max_input_flow: usize,
) -> bool {
    resolved != current_names || pin_count != resolved.len().min(max_input_flow)
}

/// Rebuild `pins` for `resolved`, moving each existing pin onto the new pin with the
/// same name. The last old pin holding a name wins and its links move once, to the
/// first new pin with that name.
pub fn reconcile_flow_slots(
    pins: &mut Vec<FlowSlot>,
    current_names: &mut Vec<String>,
    resolved: Vec<String>,
    max_input_flow: usize,
) -> Reconciliation {
    if !needs_reconciliation(current_names, pins.len(), &resolved, max_input_flow) {
        return Reconciliation::default();
    }

    let mut dropped_links = 0;
    let mut by_name: HashMap<String, FlowSlot> = HashMap::new();
    for (index, pin) in std::mem::take(pins).into_iter().enumerate() {
        let replaced = match current_names.get(index) {
            Some(name) => by_name.insert(name.clone(), pin),
            None => Some(pin),
        };
        if let Some(lost) = replaced {
            dropped_links += lost.links.len();
        }
    }

    let count = resolved.len().min(max_input_flow);
    *pins = resolved[..count]
        .iter()
        .map(|name| by_name.remove(name).unwrap_or_default())
        .collect();
    dropped_links += by_name.values().map(|pin| pin.links.len()).sum::<usize>();
    *current_names = resolved;

    Reconciliation {
        rebuilt: true,
        dropped_links,
    }
}

/// Resolve the flow input names of a subgraph context and reconcile its pins.
pub fn refresh_flow_inputs(doc: &mut Document, id: ObjectId) -> Result<Reconciliation, LibraryError> {
    let max_input_flow = doc.settings().max_input_flow;
    let resolved = match super::owned_children(doc, id)? {
        Some(children) => {
            let children: Vec<&Object> = children.iter().filter_map(|c| doc.get(*c)).collect();
            flow_names::resolve_flow_input_names(&children, max_input_flow)
        }
        None => Vec::new(),
    };

    let Context {
        input_flow, kind, ..
    } = doc.context_mut(id)?;
    let ContextKind::Subgraph(subgraph) = kind else {
        return Err(LibraryError::invalid_argument(format!(
            "{} is not a subgraph context",
            id
        )));
    };
    let outcome = reconcile_flow_slots(
        input_flow,
        &mut subgraph.flow_input_names,
        resolved,
        max_input_flow,
    );

    if outcome.rebuilt {
        debug!(
            "Subgraph context {} flow inputs: {:?}",
            id, subgraph.flow_input_names
        );
    }
    if outcome.dropped_links > 0 {
        info!(
            "Subgraph context {} dropped {} flow link(s) whose pin disappeared",
            id, outcome.dropped_links
        );
    }
    Ok(outcome)
}
