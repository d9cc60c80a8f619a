use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::graph::ObjectId;

pub type AssetId = Uuid;

/// A reusable graph asset that subgraph contexts can instance.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    /// Root graph of the asset. `None` while the resource is unavailable.
    pub graph: Option<ObjectId>,
}

impl Asset {
    pub fn new(name: &str, graph: Option<ObjectId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            graph,
        }
    }
}

/// Assets loaded into the editing session.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Debug)]
pub struct AssetLibrary {
    #[serde(default)]
    assets: Vec<Asset>,
}

impl AssetLibrary {
    pub fn add(&mut self, asset: Asset) -> AssetId {
        let id = asset.id;
        self.assets.push(asset);
        id
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: AssetId) -> Option<&mut Asset> {
        self.assets.iter_mut().find(|a| a.id == id)
    }

    pub fn remove(&mut self, id: AssetId) -> Option<Asset> {
        let index = self.assets.iter().position(|a| a.id == id)?;
        Some(self.assets.remove(index))
    }

    /// Whether the id names a known asset (its resource may still be unavailable).
    pub fn contains(&self, id: AssetId) -> bool {
        self.get(id).is_some()
    }

    /// Root graph of the asset, if the asset exists and its resource is available.
    pub fn resolve(&self, id: AssetId) -> Option<ObjectId> {
        self.get(id).and_then(|a| a.graph)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }
}
