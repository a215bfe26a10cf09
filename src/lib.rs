pub mod config;
pub mod error;
pub mod instrument;
pub mod lineage;
pub mod observability;
pub mod tracker;
pub mod transport;

// Re-export the pieces most embedders need
pub use config::LineageConfig;
pub use instrument::{LineageSession, Table};
pub use tracker::{EmissionReport, RunTracker, ShutdownGuard};
