pub mod graph_handler;
pub mod lock_helpers;
pub mod subgraph_handler;

use crate::error::LibraryError;
use crate::model::document::Document;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Acquire a write lock on the document, converting poison errors to LibraryError.
pub fn write_document(
    document: &Arc<RwLock<Document>>,
) -> Result<RwLockWriteGuard<'_, Document>, LibraryError> {
    document
        .write()
        .map_err(|_| LibraryError::Runtime("Lock Poisoned".to_string()))
}

/// Acquire a read lock on the document, converting poison errors to LibraryError.
pub fn read_document(
    document: &Arc<RwLock<Document>>,
) -> Result<RwLockReadGuard<'_, Document>, LibraryError> {
    document
        .read()
        .map_err(|_| LibraryError::Runtime("Lock Poisoned".to_string()))
}
