use crate::error::LibraryError;
use crate::model::document::Document;
use crate::model::graph::{ContextKind, ObjectId};
use crate::model::graph_analysis;
use crate::model::property::{PropertyValue, ValueType};
use indexmap::IndexSet;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

pub struct GraphHandler;

impl GraphHandler {
    pub fn add_graph(document: &Arc<RwLock<Document>>, name: &str) -> Result<ObjectId, LibraryError> {
        let mut doc = super::write_document(document)?;
        Ok(doc.add_graph(name))
    }

    /// Add a context to a graph. Subgraph kinds are instanced right away.
    pub fn add_context(
        document: &Arc<RwLock<Document>>,
        graph_id: ObjectId,
        kind: ContextKind,
    ) -> Result<ObjectId, LibraryError> {
        let mut doc = super::write_document(document)?;
        doc.add_context(graph_id, kind)
    }

    pub fn add_operator(
        document: &Arc<RwLock<Document>>,
        graph_id: ObjectId,
        type_id: &str,
        inputs: &[(&str, ValueType)],
        outputs: &[(&str, ValueType)],
    ) -> Result<ObjectId, LibraryError> {
        let mut doc = super::write_document(document)?;
        doc.add_operator(graph_id, type_id, inputs, outputs)
    }

    /// Add an exposed input parameter.
    pub fn add_parameter(
        document: &Arc<RwLock<Document>>,
        graph_id: ObjectId,
        exposed_name: &str,
        value: PropertyValue,
    ) -> Result<ObjectId, LibraryError> {
        let mut doc = super::write_document(document)?;
        doc.add_parameter(graph_id, exposed_name, value)
    }

    /// Remove a node with its slots, data and flow links.
    pub fn remove_node(document: &Arc<RwLock<Document>>, node_id: ObjectId) -> Result<(), LibraryError> {
        let mut doc = super::write_document(document)?;
        doc.remove_node(node_id)
    }

    /// Add a flow link (with validation). Returns the link id.
    pub fn add_flow_link(
        document: &Arc<RwLock<Document>>,
        from: ObjectId,
        from_index: usize,
        to: ObjectId,
        to_index: usize,
    ) -> Result<Uuid, LibraryError> {
        let mut doc = super::write_document(document)?;
        doc.link_flow(from, from_index, to, to_index)
    }

    pub fn remove_flow_link(
        document: &Arc<RwLock<Document>>,
        to: ObjectId,
        link_id: Uuid,
    ) -> Result<(), LibraryError> {
        let mut doc = super::write_document(document)?;
        doc.unlink_flow(to, link_id)
    }

    /// Add a data link from an output slot to an input slot (with validation).
    pub fn add_data_link(
        document: &Arc<RwLock<Document>>,
        output: ObjectId,
        input: ObjectId,
    ) -> Result<(), LibraryError> {
        let mut doc = super::write_document(document)?;
        doc.link_slots(output, input)
    }

    pub fn remove_data_link(
        document: &Arc<RwLock<Document>>,
        output: ObjectId,
        input: ObjectId,
    ) -> Result<(), LibraryError> {
        let mut doc = super::write_document(document)?;
        doc.unlink_slots(output, input)
    }

    pub fn set_slot_value(
        document: &Arc<RwLock<Document>>,
        slot_id: ObjectId,
        value: PropertyValue,
    ) -> Result<(), LibraryError> {
        let mut doc = super::write_document(document)?;
        doc.set_slot_value(slot_id, value)
    }

    pub fn set_parameter_value(
        document: &Arc<RwLock<Document>>,
        parameter_id: ObjectId,
        value: PropertyValue,
    ) -> Result<(), LibraryError> {
        let mut doc = super::write_document(document)?;
        doc.set_parameter_value(parameter_id, value)
    }

    /// Dependency set the compiler walks for a graph, owned subgraph copies included.
    pub fn compile_dependencies(
        document: &Arc<RwLock<Document>>,
        graph_id: ObjectId,
    ) -> Result<IndexSet<ObjectId>, LibraryError> {
        let doc = super::read_document(document)?;
        graph_analysis::compile_dependencies(&doc, graph_id)
    }
}
