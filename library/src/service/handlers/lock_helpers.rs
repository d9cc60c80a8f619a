//! Helper functions for running document operations under a lock.

use crate::error::LibraryError;
use crate::model::document::Document;
use std::sync::{Arc, RwLock};

/// Execute a function with a write lock on the document.
pub fn with_document_write<F, R>(document: &Arc<RwLock<Document>>, f: F) -> Result<R, LibraryError>
where
    F: FnOnce(&mut Document) -> Result<R, LibraryError>,
{
    let mut doc = super::write_document(document)?;
    f(&mut doc)
}

/// Execute a function with a read lock on the document.
pub fn with_document_read<F, R>(document: &Arc<RwLock<Document>>, f: F) -> Result<R, LibraryError>
where
    F: FnOnce(&Document) -> Result<R, LibraryError>,
{
    let doc = super::read_document(document)?;
    f(&doc)
}
