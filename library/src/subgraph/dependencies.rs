use indexmap::IndexSet;

use super::subgraph_context;
use crate::error::LibraryError;
use crate::model::document::Document;
use crate::model::graph::ObjectId;
use crate::model::graph_analysis;

/// Add the owned copy of a subgraph context to a compile dependency set.
///
/// Copied parameters are left out: their values reach the copy through the
/// context's input slots. Nothing is added while the context is detached.
pub fn collect_owned_dependencies(
    doc: &Document,
    id: ObjectId,
    objs: &mut IndexSet<ObjectId>,
) -> Result<(), LibraryError> {
    let Some(children) = subgraph_context(doc, id)?.owned_children() else {
        return Ok(());
    };
    for child in children {
        let Some(object) = doc.get(*child) else {
            continue;
        };
        if object.is_parameter() {
            continue;
        }
        objs.insert(*child);
        graph_analysis::collect_dependencies(doc, *child, true, objs)?;
    }
    Ok(())
}
