pub mod handlers;

use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use log::info;

use crate::error::LibraryError;
use crate::model::document::Document;
use crate::settings::Settings;

/// Shared handle to an open document.
pub type SharedDocument = Arc<RwLock<Document>>;

/// Read a document from disk and open it with the given settings.
pub fn open_document_file<P: AsRef<Path>>(
    path: P,
    settings: Settings,
) -> Result<SharedDocument, LibraryError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let doc = Document::open_with_settings(&json, settings)?;
    info!("Loaded document {}", path.display());
    Ok(Arc::new(RwLock::new(doc)))
}

/// Save a shared document to disk. Owned subgraph copies are not written.
pub fn save_document_file<P: AsRef<Path>>(
    document: &SharedDocument,
    path: P,
) -> Result<(), LibraryError> {
    let path = path.as_ref();
    let json = handlers::lock_helpers::with_document_read(document, |doc| doc.save())?;
    fs::write(path, json)?;
    info!("Saved document {}", path.display());
    Ok(())
}
