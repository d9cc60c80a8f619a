use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ObjectId;
use crate::model::property::ValueType;

/// A named graph parameter.
///
/// Exposed input parameters become the data inputs of every subgraph context that
/// instances the graph. The parameter's value lives in its single `slot`: an
/// output slot for inputs, an input slot for output parameters.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Parameter {
    pub id: ObjectId,
    pub parent: Option<ObjectId>,
    pub exposed_name: String,
    pub value_type: ValueType,
    #[serde(default)]
    pub exposed: bool,
    #[serde(default)]
    pub is_output: bool,
    /// Sort key among exposed parameters.
    #[serde(default)]
    pub order: i32,
    pub slot: ObjectId,
}

impl Parameter {
    pub fn new(exposed_name: &str, value_type: ValueType, slot: ObjectId) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent: None,
            exposed_name: exposed_name.to_string(),
            value_type,
            exposed: false,
            is_output: false,
            order: 0,
            slot,
        }
    }

    pub fn is_exposed_input(&self) -> bool {
        self.exposed && !self.is_output
    }
}
