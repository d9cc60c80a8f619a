use super::lock_helpers::{with_document_read, with_document_write};
use crate::error::LibraryError;
use crate::invalidation::Invalidation;
use crate::model::asset::AssetId;
use crate::model::document::Document;
use crate::model::graph::ObjectId;
use crate::model::property::PropertyValue;
use crate::subgraph::{self, expressions};
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};

/// A materialized flow input pin of a subgraph context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowPin {
    pub name: String,
    pub link_count: usize,
}

pub struct SubgraphHandler;

impl SubgraphHandler {
    /// Register a graph asset. `graph_id == None` registers an unavailable resource.
    pub fn add_asset(
        document: &Arc<RwLock<Document>>,
        name: &str,
        graph_id: Option<ObjectId>,
    ) -> Result<AssetId, LibraryError> {
        with_document_write(document, |doc| Ok(doc.add_asset(name, graph_id)))
    }

    /// Repoint an asset and refresh every context that instances it.
    pub fn set_asset_resource(
        document: &Arc<RwLock<Document>>,
        asset_id: AssetId,
        graph_id: Option<ObjectId>,
    ) -> Result<(), LibraryError> {
        with_document_write(document, |doc| {
            doc.set_asset_resource(asset_id, graph_id)?;
            doc.notify_asset_changed(asset_id)
        })
    }

    pub fn notify_asset_changed(
        document: &Arc<RwLock<Document>>,
        asset_id: AssetId,
    ) -> Result<(), LibraryError> {
        with_document_write(document, |doc| doc.notify_asset_changed(asset_id))
    }

    pub fn add_subgraph_context(
        document: &Arc<RwLock<Document>>,
        graph_id: ObjectId,
        reference: Option<AssetId>,
    ) -> Result<ObjectId, LibraryError> {
        with_document_write(document, |doc| doc.add_subgraph_context(graph_id, reference))
    }

    pub fn set_subgraph_reference(
        document: &Arc<RwLock<Document>>,
        context_id: ObjectId,
        reference: Option<AssetId>,
    ) -> Result<(), LibraryError> {
        with_document_write(document, |doc| doc.set_subgraph_reference(context_id, reference))
    }

    /// Every resolved flow input name, including the ones beyond the pin cap.
    pub fn flow_input_names(
        document: &Arc<RwLock<Document>>,
        context_id: ObjectId,
    ) -> Result<Vec<String>, LibraryError> {
        with_document_read(document, |doc| {
            Ok(subgraph::flow_input_names(doc, context_id)?.to_vec())
        })
    }

    /// Materialized pins, in order.
    pub fn flow_pins(
        document: &Arc<RwLock<Document>>,
        context_id: ObjectId,
    ) -> Result<Vec<FlowPin>, LibraryError> {
        with_document_read(document, |doc| {
            let names = subgraph::flow_input_names(doc, context_id)?;
            let context = doc.context(context_id)?;
            Ok(context
                .input_flow
                .iter()
                .zip(names)
                .map(|(pin, name)| FlowPin {
                    name: name.clone(),
                    link_count: pin.links.len(),
                })
                .collect())
        })
    }

    /// Owned children, or `None` while detached.
    pub fn owned_children(
        document: &Arc<RwLock<Document>>,
        context_id: ObjectId,
    ) -> Result<Option<Vec<ObjectId>>, LibraryError> {
        with_document_read(document, |doc| {
            Ok(subgraph::owned_children(doc, context_id)?.map(<[ObjectId]>::to_vec))
        })
    }

    pub fn can_be_compiled(
        document: &Arc<RwLock<Document>>,
        context_id: ObjectId,
    ) -> Result<bool, LibraryError> {
        with_document_read(document, |doc| subgraph::can_be_compiled(doc, context_id))
    }

    pub fn display_name(
        document: &Arc<RwLock<Document>>,
        context_id: ObjectId,
    ) -> Result<String, LibraryError> {
        with_document_read(document, |doc| subgraph::display_name(doc, context_id))
    }

    pub fn output_parameters(
        document: &Arc<RwLock<Document>>,
        context_id: ObjectId,
    ) -> Result<Vec<ObjectId>, LibraryError> {
        with_document_read(document, |doc| expressions::output_parameters(doc, context_id))
    }

    /// Patch exposed inputs and return the value each exposed parameter compiles to.
    pub fn compile_expressions(
        document: &Arc<RwLock<Document>>,
        context_id: ObjectId,
    ) -> Result<IndexMap<String, PropertyValue>, LibraryError> {
        with_document_write(document, |doc| expressions::compile_expressions(doc, context_id))
    }

    /// Drain the notifications that reached a root graph.
    pub fn take_invalidations(
        document: &Arc<RwLock<Document>>,
    ) -> Result<Vec<Invalidation>, LibraryError> {
        with_document_write(document, |doc| Ok(doc.take_invalidations()))
    }
}
