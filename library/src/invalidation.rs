//! Change notification between graph objects.
//!
//! A notification starts at an origin object, runs the handler of every object on
//! its way up (slot → owner → parent → ... → root graph) and is logged once it
//! reaches a root. Objects that are not ancestors but still need to hear about a
//! change (proxy copies of an original slot) register in the [`ObserverTable`].

use std::collections::HashMap;

use log::debug;

use crate::error::LibraryError;
use crate::model::document::Document;
use crate::model::graph::ObjectId;
use crate::subgraph;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvalidationCause {
    /// A node setting changed (e.g. the referenced subgraph asset).
    SettingChanged,
    /// A slot value changed.
    ParamChanged,
    ExpressionInvalidated,
    StructureChanged,
    ConnectionChanged,
    ExpressionGraphChanged,
    UiChanged,
}

/// A notification that reached a root graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Invalidation {
    pub root: ObjectId,
    pub origin: ObjectId,
    pub cause: InvalidationCause,
}

/// Directed registrations: source object → subscribers, in subscription order.
///
/// Subscribers are subgraph contexts holding a proxy copy of the source slot.
/// Registrations are plain ids, so dropping either side never leaks the other.
#[derive(Default, Debug, Clone)]
pub struct ObserverTable {
    subscriptions: HashMap<ObjectId, Vec<ObjectId>>,
}

impl ObserverTable {
    pub fn subscribe(&mut self, source: ObjectId, subscriber: ObjectId) {
        let subscribers = self.subscriptions.entry(source).or_default();
        if !subscribers.contains(&subscriber) {
            subscribers.push(subscriber);
        }
    }

    pub fn unsubscribe(&mut self, source: ObjectId, subscriber: ObjectId) {
        if let Some(subscribers) = self.subscriptions.get_mut(&source) {
            subscribers.retain(|s| *s != subscriber);
            if subscribers.is_empty() {
                self.subscriptions.remove(&source);
            }
        }
    }

    /// Remove every registration held by `subscriber`.
    pub fn unsubscribe_all(&mut self, subscriber: ObjectId) {
        self.subscriptions.retain(|_, subscribers| {
            subscribers.retain(|s| *s != subscriber);
            !subscribers.is_empty()
        });
    }

    pub fn subscribers(&self, source: ObjectId) -> &[ObjectId] {
        self.subscriptions
            .get(&source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_subscribed(&self, source: ObjectId, subscriber: ObjectId) -> bool {
        self.subscribers(source).contains(&subscriber)
    }

    /// Every source the subscriber is registered on.
    pub fn sources_of(&self, subscriber: ObjectId) -> Vec<ObjectId> {
        self.subscriptions
            .iter()
            .filter(|(_, subscribers)| subscribers.contains(&subscriber))
            .map(|(source, _)| *source)
            .collect()
    }

    /// Number of sources with at least one subscriber.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

/// Raise `cause` from `origin` and propagate it to the root.
pub fn invalidate(
    doc: &mut Document,
    origin: ObjectId,
    cause: InvalidationCause,
) -> Result<(), LibraryError> {
    notify(doc, origin, origin, cause)
}

fn notify(
    doc: &mut Document,
    target: ObjectId,
    origin: ObjectId,
    cause: InvalidationCause,
) -> Result<(), LibraryError> {
    let Some(object) = doc.get(target) else {
        debug!("Dropping {:?} from {}: {} no longer exists", cause, origin, target);
        return Ok(());
    };

    if object.as_subgraph().is_some() {
        subgraph::router::on_invalidate(doc, target, origin, cause)?;
    } else {
        notify_observers(doc, target, cause)?;
    }

    match doc.get(target).and_then(|o| o.parent()) {
        Some(parent) => notify(doc, parent, origin, cause),
        None => {
            doc.record_invalidation(Invalidation {
                root: target,
                origin,
                cause,
            });
            Ok(())
        }
    }
}

/// Call every subscriber registered on `source`.
pub(crate) fn notify_observers(
    doc: &mut Document,
    source: ObjectId,
    cause: InvalidationCause,
) -> Result<(), LibraryError> {
    let subscribers = doc.observers().subscribers(source).to_vec();
    for subscriber in subscribers {
        if doc.contains(subscriber) {
            subgraph::router::on_original_slot_modified(doc, subscriber, source, cause)?;
        }
    }
    Ok(())
}
