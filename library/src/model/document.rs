//! The graph document: an arena of graph objects plus the editing session state.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::LibraryError;
use crate::invalidation::{Invalidation, ObserverTable};
use crate::model::asset::{Asset, AssetId, AssetLibrary};
use crate::model::graph::{Context, Graph, Object, ObjectId, Parameter, Slot};
use crate::settings::Settings;
use crate::subgraph::{self, Duplicator, MemoryDuplicator};

/// Every graph and asset graph open in the editing session.
///
/// Subgraph contexts keep their owned copies in the same arena; those copies are
/// runtime state and never reach [`Document::save`].
pub struct Document {
    pub name: String,
    pub assets: AssetLibrary,
    objects: IndexMap<ObjectId, Object>,
    settings: Settings,
    observers: ObserverTable,
    invalidations: Vec<Invalidation>,
    duplicator: Box<dyn Duplicator>,
    /// Assets currently being instanced, outermost first.
    instancing: Vec<AssetId>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("assets", &self.assets)
            .field("objects", &self.objects)
            .field("settings", &self.settings)
            .field("observers", &self.observers)
            .field("invalidations", &self.invalidations)
            .field("instancing", &self.instancing)
            .finish_non_exhaustive()
    }
}

/// Persisted form of a document.
#[derive(Serialize, Deserialize)]
struct DocumentFile {
    name: String,
    #[serde(default)]
    assets: AssetLibrary,
    #[serde(default)]
    objects: Vec<Object>,
}

impl Document {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            assets: AssetLibrary::default(),
            objects: IndexMap::new(),
            settings: Settings::default(),
            observers: ObserverTable::default(),
            invalidations: Vec::new(),
            duplicator: Box::new(MemoryDuplicator),
            instancing: Vec::new(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_duplicator(mut self, duplicator: Box<dyn Duplicator>) -> Self {
        self.duplicator = duplicator;
        self
    }

    /// Load a saved document and instance every subgraph context in it.
    pub fn open(json_str: &str) -> Result<Self, LibraryError> {
        Self::open_with_settings(json_str, Settings::default())
    }

    pub fn open_with_settings(json_str: &str, settings: Settings) -> Result<Self, LibraryError> {
        let file: DocumentFile = serde_json::from_str(json_str)?;
        let mut doc = Document::new(&file.name).with_settings(settings);
        doc.assets = file.assets;
        for object in file.objects {
            doc.insert_object(object);
        }

        for id in doc.subgraph_context_ids() {
            if let Err(e) = subgraph::enable(&mut doc, id) {
                warn!("Failed to instance subgraph context {}: {}", id, e);
            }
        }
        info!(
            "Opened document '{}' ({} objects)",
            doc.name,
            doc.objects.len()
        );
        Ok(doc)
    }

    /// Serialize everything except owned subgraph copies.
    pub fn save(&self) -> Result<String, LibraryError> {
        let copies = self.owned_copy_ids();
        let file = DocumentFile {
            name: self.name.clone(),
            assets: self.assets.clone(),
            objects: self
                .objects
                .values()
                .filter(|o| !copies.contains(&o.id()))
                .cloned()
                .collect(),
        };
        Ok(serde_json::to_string(&file)?)
    }

    /// Tear down every subgraph instance. Leaves no copies and no subscriptions.
    pub fn close(&mut self) -> Result<(), LibraryError> {
        for id in self.subgraph_context_ids() {
            if self.contains(id) {
                subgraph::disable(self, id)?;
            }
        }
        debug!("Closed document '{}'", self.name);
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn observers(&self) -> &ObserverTable {
        &self.observers
    }

    pub(crate) fn observers_mut(&mut self) -> &mut ObserverTable {
        &mut self.observers
    }

    pub(crate) fn duplicator(&self) -> &dyn Duplicator {
        self.duplicator.as_ref()
    }

    // ----- arena -----

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    pub(crate) fn objects_mut(&mut self) -> impl Iterator<Item = &mut Object> {
        self.objects.values_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub(crate) fn insert_object(&mut self, object: Object) -> ObjectId {
        let id = object.id();
        self.objects.insert(id, object);
        id
    }

    pub(crate) fn remove_object(&mut self, id: ObjectId) -> Option<Object> {
        self.objects.shift_remove(&id)
    }

    /// Remove a slot and drop it from the link lists of the slots it was linked to.
    pub(crate) fn remove_slot(&mut self, id: ObjectId) {
        let Some(Object::Slot(slot)) = self.remove_object(id) else {
            return;
        };
        for other in slot.links {
            if let Some(Object::Slot(other)) = self.get_mut(other) {
                other.links.retain(|l| *l != id);
            }
        }
    }

    pub fn parent_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.get(id).and_then(Object::parent)
    }

    /// Walk parents up to the root graph.
    pub fn root_of(&self, id: ObjectId) -> ObjectId {
        let mut current = id;
        let mut visited = HashSet::new();
        while let Some(parent) = self.parent_of(current) {
            if !visited.insert(current) {
                break;
            }
            current = parent;
        }
        current
    }

    pub fn graph(&self, id: ObjectId) -> Result<&Graph, LibraryError> {
        match self.get(id) {
            Some(Object::Graph(g)) => Ok(g),
            Some(_) => Err(LibraryError::invalid_argument(format!("{} is not a graph", id))),
            None => Err(LibraryError::ObjectNotFound(id)),
        }
    }

    pub fn graph_mut(&mut self, id: ObjectId) -> Result<&mut Graph, LibraryError> {
        match self.get_mut(id) {
            Some(Object::Graph(g)) => Ok(g),
            Some(_) => Err(LibraryError::invalid_argument(format!("{} is not a graph", id))),
            None => Err(LibraryError::ObjectNotFound(id)),
        }
    }

    pub fn context(&self, id: ObjectId) -> Result<&Context, LibraryError> {
        match self.get(id) {
            Some(Object::Context(c)) => Ok(c),
            Some(_) => Err(LibraryError::invalid_argument(format!("{} is not a context", id))),
            None => Err(LibraryError::ObjectNotFound(id)),
        }
    }

    pub fn context_mut(&mut self, id: ObjectId) -> Result<&mut Context, LibraryError> {
        match self.get_mut(id) {
            Some(Object::Context(c)) => Ok(c),
            Some(_) => Err(LibraryError::invalid_argument(format!("{} is not a context", id))),
            None => Err(LibraryError::ObjectNotFound(id)),
        }
    }

    pub fn parameter(&self, id: ObjectId) -> Result<&Parameter, LibraryError> {
        match self.get(id) {
            Some(Object::Parameter(p)) => Ok(p),
            Some(_) => Err(LibraryError::invalid_argument(format!("{} is not a parameter", id))),
            None => Err(LibraryError::ObjectNotFound(id)),
        }
    }

    pub fn slot(&self, id: ObjectId) -> Result<&Slot, LibraryError> {
        match self.get(id) {
            Some(Object::Slot(s)) => Ok(s),
            Some(_) => Err(LibraryError::invalid_argument(format!("{} is not a slot", id))),
            None => Err(LibraryError::ObjectNotFound(id)),
        }
    }

    pub fn slot_mut(&mut self, id: ObjectId) -> Result<&mut Slot, LibraryError> {
        match self.get_mut(id) {
            Some(Object::Slot(s)) => Ok(s),
            Some(_) => Err(LibraryError::invalid_argument(format!("{} is not a slot", id))),
            None => Err(LibraryError::ObjectNotFound(id)),
        }
    }

    /// Ids of all subgraph contexts currently in the arena, owned copies included.
    pub fn subgraph_context_ids(&self) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| o.as_subgraph().is_some())
            .map(Object::id)
            .collect()
    }

    /// Every object that belongs to some subgraph instance.
    pub fn owned_copy_ids(&self) -> HashSet<ObjectId> {
        self.objects
            .values()
            .filter_map(Object::as_subgraph)
            .filter_map(|s| s.instance())
            .flat_map(|instance| instance.owned_objects.iter().copied())
            .collect()
    }

    // ----- assets -----

    pub fn add_asset(&mut self, name: &str, graph: Option<ObjectId>) -> AssetId {
        self.assets.add(Asset::new(name, graph))
    }

    /// Point an asset at a root graph, or mark its resource unavailable with `None`.
    pub fn set_asset_resource(
        &mut self,
        asset: AssetId,
        graph: Option<ObjectId>,
    ) -> Result<(), LibraryError> {
        let entry = self
            .assets
            .get_mut(asset)
            .ok_or_else(|| LibraryError::invalid_argument(format!("Unknown asset {}", asset)))?;
        entry.graph = graph;
        Ok(())
    }

    // ----- notifications -----

    pub(crate) fn record_invalidation(&mut self, invalidation: Invalidation) {
        self.invalidations.push(invalidation);
    }

    pub fn invalidations(&self) -> &[Invalidation] {
        &self.invalidations
    }

    pub fn take_invalidations(&mut self) -> Vec<Invalidation> {
        std::mem::take(&mut self.invalidations)
    }

    // ----- instancing recursion -----

    pub(crate) fn is_instancing(&self, asset: AssetId) -> bool {
        self.instancing.contains(&asset)
    }

    pub(crate) fn instancing_depth(&self) -> usize {
        self.instancing.len()
    }

    pub(crate) fn push_instancing(&mut self, asset: AssetId) {
        self.instancing.push(asset);
    }

    pub(crate) fn pop_instancing(&mut self) {
        self.instancing.pop();
    }
}
