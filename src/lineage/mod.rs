//! The lineage data model: observed references, the resolver that names
//! them, and the OpenLineage run event they end up in.

pub mod event;
pub mod reference;
pub mod resolver;

pub use event::{Dataset, EventType, Job, RunEvent};
pub use reference::{DatasetReference, HandleToken};
pub use resolver::{DatasetResolver, StorageResolver};
