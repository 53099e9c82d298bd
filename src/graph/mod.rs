//! Dependency graph access
//!
//! The engine reads the graph only through the provider traits. The
//! walker turns a root into a dependency set and its cycles; the catalog
//! is the manifest-backed provider used by the CLI.

pub mod catalog;
pub mod traits;
pub mod walker;

pub use catalog::{GraphStats, NodeEntry, ProjectGraph, ProjectManifest, ReferenceEntry};
pub use traits::{EdgeProvider, FactProvider, GroupingFacts, UnitCatalog, UnitFacts};
pub use walker::{collect, WalkResult};
