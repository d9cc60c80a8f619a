use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ObjectId;

/// Root container of a node graph (a document graph or an asset graph).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Graph {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub child_ids: Vec<ObjectId>,
}

impl Graph {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            child_ids: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child_id: ObjectId) {
        if !self.child_ids.contains(&child_id) {
            self.child_ids.push(child_id);
        }
    }

    pub fn remove_child(&mut self, child_id: ObjectId) {
        self.child_ids.retain(|id| *id != child_id);
    }
}
