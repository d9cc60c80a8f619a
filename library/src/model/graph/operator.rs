use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ObjectId;

/// A pure data-processing node (add, multiply, sample curve, ...).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Operator {
    pub id: ObjectId,
    pub parent: Option<ObjectId>,
    /// Operator type, e.g. "math.add".
    pub type_id: String,
    #[serde(default)]
    pub input_slots: Vec<ObjectId>,
    #[serde(default)]
    pub output_slots: Vec<ObjectId>,
}

impl Operator {
    pub fn new(type_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent: None,
            type_id: type_id.to_string(),
            input_slots: Vec::new(),
            output_slots: Vec::new(),
        }
    }
}
