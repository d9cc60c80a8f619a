#![allow(dead_code)]

use flowgraph::model::asset::AssetId;
use flowgraph::model::document::Document;
use flowgraph::model::graph::{ContextKind, Object, ObjectId};
use flowgraph::model::property::{PropertyValue, ValueType};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The "Burst" asset: events B and A, a spawner whose stop gate is driven by A,
/// exposed inputs `rate` (Float) and `count` (Integer), a hidden `seed`, an output
/// `total`, and an adder fed by `rate`.
pub struct BurstAsset {
    pub asset: AssetId,
    pub graph: ObjectId,
    pub spawner: ObjectId,
    pub rate: ObjectId,
    pub count: ObjectId,
    pub add: ObjectId,
}

pub const BURST_NODE_COUNT: usize = 9;

pub fn add_burst_asset(doc: &mut Document) -> BurstAsset {
    let graph = doc.add_graph("Burst");
    doc.add_context(graph, ContextKind::event("B")).unwrap();
    let event_a = doc.add_context(graph, ContextKind::event("A")).unwrap();
    let spawner = doc.add_context(graph, ContextKind::Spawner).unwrap();
    let init = doc.add_context(graph, ContextKind::Initialize).unwrap();
    doc.link_flow(event_a, 0, spawner, 1).unwrap();
    doc.link_flow(spawner, 0, init, 0).unwrap();

    let rate = doc.add_parameter(graph, "rate", PropertyValue::from(10.0)).unwrap();
    let count = doc.add_parameter(graph, "count", PropertyValue::from(3i64)).unwrap();
    doc.add_hidden_parameter(graph, "seed", PropertyValue::from(7i64)).unwrap();
    doc.add_output_parameter(graph, "total", ValueType::Float).unwrap();

    let add = doc
        .add_operator(
            graph,
            "math.add",
            &[("a", ValueType::Float), ("b", ValueType::Float)],
            &[("sum", ValueType::Float)],
        )
        .unwrap();
    let rate_slot = doc.parameter(rate).unwrap().slot;
    let add_a = doc.get(add).unwrap().slot_ids()[0];
    doc.link_slots(rate_slot, add_a).unwrap();

    let asset = doc.add_asset("Burst", Some(graph));
    doc.take_invalidations();
    BurstAsset {
        asset,
        graph,
        spawner,
        rate,
        count,
        add,
    }
}

/// The "Inner" asset: event Fire driving the stop gate of a spawner, and an
/// exposed `size` parameter. Resolves to `["Play", "Fire"]`.
pub fn add_inner_asset(doc: &mut Document) -> (AssetId, ObjectId) {
    let graph = doc.add_graph("Inner");
    let fire = doc.add_context(graph, ContextKind::event("Fire")).unwrap();
    let spawner = doc.add_context(graph, ContextKind::Spawner).unwrap();
    doc.link_flow(fire, 0, spawner, 1).unwrap();
    doc.add_parameter(graph, "size", PropertyValue::from(1.0)).unwrap();
    let asset = doc.add_asset("Inner", Some(graph));
    (asset, graph)
}

/// The "Outer" asset: event Go and a subgraph context instancing `inner`.
/// Returns the asset and the nested context.
pub fn add_outer_asset(doc: &mut Document, inner: AssetId) -> (AssetId, ObjectId) {
    let graph = doc.add_graph("Outer");
    doc.add_context(graph, ContextKind::event("Go")).unwrap();
    let nested = doc.add_subgraph_context(graph, Some(inner)).unwrap();
    let asset = doc.add_asset("Outer", Some(graph));
    doc.take_invalidations();
    (asset, nested)
}

/// Host graph "Main" with a subgraph context instancing `asset`.
pub fn add_host(doc: &mut Document, asset: Option<AssetId>) -> (ObjectId, ObjectId) {
    let main = doc.add_graph("Main");
    let host = doc.add_subgraph_context(main, asset).unwrap();
    doc.take_invalidations();
    (main, host)
}

/// Owned child of `host` that copies the exposed parameter named `name`.
pub fn owned_parameter(doc: &Document, host: ObjectId, name: &str) -> ObjectId {
    let children = flowgraph::subgraph::owned_children(doc, host)
        .unwrap()
        .expect("host should be attached");
    children
        .iter()
        .copied()
        .find(|c| {
            doc.get(*c)
                .and_then(Object::as_parameter)
                .is_some_and(|p| p.exposed_name == name)
        })
        .expect("parameter copy")
}

/// Kind labels of the owned children, in order.
pub fn owned_kinds(doc: &Document, host: ObjectId) -> Vec<String> {
    flowgraph::subgraph::owned_children(doc, host)
        .unwrap()
        .unwrap_or_default()
        .iter()
        .map(|c| match doc.get(*c) {
            Some(Object::Context(ctx)) => ctx.kind.label().to_string(),
            Some(Object::Operator(op)) => op.type_id.clone(),
            Some(Object::Parameter(p)) => format!("param:{}", p.exposed_name),
            _ => "other".to_string(),
        })
        .collect()
}
