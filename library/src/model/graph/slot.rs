//! Data slots owned by contexts, operators and parameters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ObjectId;
use crate::model::property::{PropertyValue, ValueType};

/// Direction of a slot.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SlotDirection {
    Input,
    Output,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Slot {
    pub id: ObjectId,
    /// Context, operator or parameter this slot belongs to.
    pub owner: ObjectId,
    pub name: String,
    pub direction: SlotDirection,
    pub value_type: ValueType,
    pub value: PropertyValue,
    /// Slots on the other end of data links. Kept symmetric on both ends.
    #[serde(default)]
    pub links: Vec<ObjectId>,
    /// Expression pushed in from an instancing node; wins over `value`.
    #[serde(skip)]
    pub transferred: Option<PropertyValue>,
}

impl Slot {
    pub fn new(owner: ObjectId, name: &str, direction: SlotDirection, value_type: ValueType) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            name: name.to_string(),
            direction,
            value_type,
            value: value_type.default_value(),
            links: Vec::new(),
            transferred: None,
        }
    }

    pub fn input(owner: ObjectId, name: &str, value_type: ValueType) -> Self {
        Self::new(owner, name, SlotDirection::Input, value_type)
    }

    pub fn output(owner: ObjectId, name: &str, value_type: ValueType) -> Self {
        Self::new(owner, name, SlotDirection::Output, value_type)
    }

    pub fn with_value(mut self, value: PropertyValue) -> Self {
        self.value = value;
        self
    }

    pub fn is_input(&self) -> bool {
        self.direction == SlotDirection::Input
    }

    pub fn is_linked(&self) -> bool {
        !self.links.is_empty()
    }

    /// Current computed value of the slot.
    pub fn evaluate(&self) -> &PropertyValue {
        self.transferred.as_ref().unwrap_or(&self.value)
    }
}
