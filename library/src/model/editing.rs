//! Editing operations on a [`Document`]. Each one raises the matching invalidation.

use log::debug;
use uuid::Uuid;

use crate::error::LibraryError;
use crate::invalidation::{self, InvalidationCause};
use crate::model::asset::AssetId;
use crate::model::document::Document;
use crate::model::graph::{
    Context, ContextData, ContextKind, FlowLink, Graph, Object, ObjectId, Operator, Parameter,
    Slot,
};
use crate::model::graph_analysis;
use crate::model::property::{PropertyValue, ValueType};
use crate::subgraph::{self, SubgraphContext};

impl Document {
    pub fn add_graph(&mut self, name: &str) -> ObjectId {
        self.insert_object(Object::Graph(Graph::new(name)))
    }

    /// Add a context to a graph, together with the data resource its kind needs.
    pub fn add_context(&mut self, graph: ObjectId, kind: ContextKind) -> Result<ObjectId, LibraryError> {
        if let ContextKind::Subgraph(subgraph) = kind {
            return self.add_subgraph_context(graph, subgraph.subgraph);
        }
        let mut context = Context::new(kind);
        if let Some(data_kind) = context.kind.data_kind() {
            let data = ContextData::new(context.id, data_kind);
            context.data = Some(data.id);
            self.insert_object(Object::Data(data));
        }
        self.attach_child(graph, Object::Context(context))
    }

    /// Add a subgraph context and instance the referenced asset right away.
    pub fn add_subgraph_context(
        &mut self,
        graph: ObjectId,
        reference: Option<AssetId>,
    ) -> Result<ObjectId, LibraryError> {
        let context = Context::new(ContextKind::Subgraph(SubgraphContext::new(reference)));
        let id = self.attach_child(graph, Object::Context(context))?;
        subgraph::enable(self, id)?;
        Ok(id)
    }

    pub fn add_operator(
        &mut self,
        graph: ObjectId,
        type_id: &str,
        inputs: &[(&str, ValueType)],
        outputs: &[(&str, ValueType)],
    ) -> Result<ObjectId, LibraryError> {
        let mut operator = Operator::new(type_id);
        for (name, value_type) in inputs {
            let slot = Slot::input(operator.id, name, *value_type);
            operator.input_slots.push(self.insert_object(Object::Slot(slot)));
        }
        for (name, value_type) in outputs {
            let slot = Slot::output(operator.id, name, *value_type);
            operator.output_slots.push(self.insert_object(Object::Slot(slot)));
        }
        self.attach_child(graph, Object::Operator(operator))
    }

    /// Add an exposed input parameter holding `value`.
    pub fn add_parameter(
        &mut self,
        graph: ObjectId,
        exposed_name: &str,
        value: PropertyValue,
    ) -> Result<ObjectId, LibraryError> {
        self.insert_parameter(graph, exposed_name, value, true, false)
    }

    /// Add a parameter that is not exposed to instancing nodes.
    pub fn add_hidden_parameter(
        &mut self,
        graph: ObjectId,
        exposed_name: &str,
        value: PropertyValue,
    ) -> Result<ObjectId, LibraryError> {
        self.insert_parameter(graph, exposed_name, value, false, false)
    }

    pub fn add_output_parameter(
        &mut self,
        graph: ObjectId,
        exposed_name: &str,
        value_type: ValueType,
    ) -> Result<ObjectId, LibraryError> {
        self.insert_parameter(graph, exposed_name, value_type.default_value(), true, true)
    }

    fn insert_parameter(
        &mut self,
        graph: ObjectId,
        exposed_name: &str,
        value: PropertyValue,
        exposed: bool,
        is_output: bool,
    ) -> Result<ObjectId, LibraryError> {
        let count = self
            .graph(graph)?
            .child_ids
            .iter()
            .filter(|id| self.get(**id).is_some_and(Object::is_parameter))
            .count();
        let order = i32::try_from(count).map_err(|_| {
            LibraryError::invalid_argument(format!("Graph {} holds too many parameters", graph))
        })?;

        let value_type = value.value_type();
        let mut parameter = Parameter::new(exposed_name, value_type, Uuid::nil());
        parameter.exposed = exposed;
        parameter.is_output = is_output;
        parameter.order = order;

        let slot = if is_output {
            Slot::input(parameter.id, exposed_name, value_type)
        } else {
            Slot::output(parameter.id, exposed_name, value_type)
        };
        parameter.slot = self.insert_object(Object::Slot(slot.with_value(value)));
        self.attach_child(graph, Object::Parameter(parameter))
    }

    /// Add a data input slot to a context or operator.
    pub fn add_input_slot(
        &mut self,
        owner: ObjectId,
        name: &str,
        value_type: ValueType,
    ) -> Result<ObjectId, LibraryError> {
        let slot_id = match self.get(owner) {
            Some(Object::Context(_)) | Some(Object::Operator(_)) => {
                self.insert_object(Object::Slot(Slot::input(owner, name, value_type)))
            }
            Some(_) => {
                return Err(LibraryError::invalid_argument(format!(
                    "{} cannot own input slots",
                    owner
                )));
            }
            None => return Err(LibraryError::ObjectNotFound(owner)),
        };
        match self.get_mut(owner) {
            Some(Object::Context(c)) => c.input_slots.push(slot_id),
            Some(Object::Operator(o)) => o.input_slots.push(slot_id),
            _ => {}
        }
        invalidation::invalidate(self, owner, InvalidationCause::StructureChanged)?;
        Ok(slot_id)
    }

    fn attach_child(&mut self, graph: ObjectId, mut object: Object) -> Result<ObjectId, LibraryError> {
        self.graph(graph)?;
        object.set_parent(Some(graph));
        let id = self.insert_object(object);
        self.graph_mut(graph)?.add_child(id);
        Ok(id)
    }

    /// Remove a context, operator or parameter with its slots, data and flow links.
    pub fn remove_node(&mut self, id: ObjectId) -> Result<(), LibraryError> {
        let object = self.get(id).ok_or(LibraryError::ObjectNotFound(id))?;
        if !object.is_node() {
            return Err(LibraryError::invalid_argument(format!(
                "{} is not a graph node",
                id
            )));
        }
        let parent = object.parent();
        let slots = object.slot_ids();
        let data = object.as_context().and_then(|c| c.data);

        if object.as_subgraph().is_some() {
            subgraph::disable(self, id)?;
        }

        // Incoming links live on this node's pins; outgoing ones on downstream pins.
        for other in self.objects_mut_contexts() {
            for pin in &mut other.input_flow {
                pin.links.retain(|l| l.from != id);
            }
        }
        for slot in slots {
            self.remove_slot(slot);
        }
        if let Some(data) = data {
            self.remove_object(data);
        }
        self.remove_object(id);

        if let Some(parent) = parent {
            if let Ok(graph) = self.graph_mut(parent) {
                graph.remove_child(id);
            }
            invalidation::invalidate(self, parent, InvalidationCause::StructureChanged)?;
        }
        debug!("Removed node {}", id);
        Ok(())
    }

    fn objects_mut_contexts(&mut self) -> Vec<&mut Context> {
        self.objects_mut()
            .filter_map(|o| match o {
                Object::Context(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Set the value of a slot and raise `ParamChanged` from it.
    ///
    /// Inputs linked downstream of an output slot see `ExpressionInvalidated`.
    pub fn set_slot_value(&mut self, slot: ObjectId, value: PropertyValue) -> Result<(), LibraryError> {
        let target = self.slot_mut(slot)?;
        if value.value_type() != target.value_type {
            return Err(LibraryError::invalid_argument(format!(
                "Slot '{}' expects {}, got {}",
                target.name,
                target.value_type,
                value.value_type()
            )));
        }
        target.value = value;
        let downstream = if target.is_input() {
            Vec::new()
        } else {
            target.links.clone()
        };
        invalidation::invalidate(self, slot, InvalidationCause::ParamChanged)?;
        for input in downstream {
            invalidation::invalidate(self, input, InvalidationCause::ExpressionInvalidated)?;
        }
        Ok(())
    }

    /// Set the value held by a parameter.
    pub fn set_parameter_value(
        &mut self,
        parameter: ObjectId,
        value: PropertyValue,
    ) -> Result<(), LibraryError> {
        let slot = self.parameter(parameter)?.slot;
        self.set_slot_value(slot, value)
    }

    /// Link an output slot to an input slot.
    pub fn link_slots(&mut self, output: ObjectId, input: ObjectId) -> Result<(), LibraryError> {
        graph_analysis::validate_slot_link(self, output, input).map_err(LibraryError::validation)?;
        self.slot_mut(output)?.links.push(input);
        self.slot_mut(input)?.links.push(output);
        invalidation::invalidate(self, input, InvalidationCause::ConnectionChanged)?;
        invalidation::invalidate(self, input, InvalidationCause::ExpressionInvalidated)
    }

    pub fn unlink_slots(&mut self, output: ObjectId, input: ObjectId) -> Result<(), LibraryError> {
        let linked = self.slot(input)?.links.contains(&output);
        if !linked {
            return Err(LibraryError::validation(format!(
                "Slots {} and {} are not linked",
                output, input
            )));
        }
        self.slot_mut(output)?.links.retain(|l| *l != input);
        self.slot_mut(input)?.links.retain(|l| *l != output);
        invalidation::invalidate(self, input, InvalidationCause::ConnectionChanged)?;
        invalidation::invalidate(self, input, InvalidationCause::ExpressionInvalidated)
    }

    /// Link flow output `from_index` of `from` to flow input `to_index` of `to`.
    pub fn link_flow(
        &mut self,
        from: ObjectId,
        from_index: usize,
        to: ObjectId,
        to_index: usize,
    ) -> Result<Uuid, LibraryError> {
        graph_analysis::validate_flow_link(self, from, from_index, to, to_index)
            .map_err(LibraryError::validation)?;
        let link = FlowLink::new(from, from_index);
        let link_id = link.id;
        self.context_mut(to)?.input_flow[to_index].links.push(link);
        invalidation::invalidate(self, to, InvalidationCause::ConnectionChanged)?;
        Ok(link_id)
    }

    pub fn unlink_flow(&mut self, to: ObjectId, link_id: Uuid) -> Result<(), LibraryError> {
        let context = self.context_mut(to)?;
        let before: usize = context.input_flow.iter().map(|p| p.links.len()).sum();
        for pin in &mut context.input_flow {
            pin.links.retain(|l| l.id != link_id);
        }
        let after: usize = context.input_flow.iter().map(|p| p.links.len()).sum();
        if before == after {
            return Err(LibraryError::validation(format!(
                "Flow link {} not found on {}",
                link_id, to
            )));
        }
        invalidation::invalidate(self, to, InvalidationCause::ConnectionChanged)
    }

    /// Swap the asset a subgraph context instances.
    pub fn set_subgraph_reference(
        &mut self,
        context: ObjectId,
        reference: Option<AssetId>,
    ) -> Result<(), LibraryError> {
        let subgraph = self
            .context_mut(context)?
            .as_subgraph_mut()
            .ok_or_else(|| {
                LibraryError::invalid_argument(format!("{} is not a subgraph context", context))
            })?;
        subgraph.subgraph = reference;
        invalidation::invalidate(self, context, InvalidationCause::SettingChanged)
    }

    /// Tell every context instancing `asset` that the asset's graph changed.
    pub fn notify_asset_changed(&mut self, asset: AssetId) -> Result<(), LibraryError> {
        let referencing: Vec<ObjectId> = self
            .objects()
            .filter(|o| o.as_subgraph().is_some_and(|s| s.subgraph == Some(asset)))
            .map(Object::id)
            .collect();
        debug!(
            "Asset {} changed, refreshing {} subgraph context(s)",
            asset,
            referencing.len()
        );
        for id in referencing {
            // Refreshing an outer instance can destroy nested copies listed here.
            if self.contains(id) {
                invalidation::invalidate(self, id, InvalidationCause::SettingChanged)?;
            }
        }
        Ok(())
    }
}
