pub mod asset;
pub mod document;
mod editing;
pub mod graph;
pub mod graph_analysis;
pub mod property;
