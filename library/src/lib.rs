pub mod error;
pub mod invalidation;
pub mod model;
pub mod service;
pub mod settings;
pub mod subgraph;

pub use error::LibraryError;
pub use model::document::Document;
pub use settings::Settings;

/// Open a saved document with settings read from a TOML string.
pub fn open_document(json_str: &str, settings_toml: &str) -> Result<Document, LibraryError> {
    let settings = Settings::from_toml_str(settings_toml)?;
    Document::open_with_settings(json_str, settings)
}
