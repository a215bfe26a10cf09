//! Explicit interception of table reads and writes.

pub mod session;
pub mod table;

pub use session::LineageSession;
pub use table::Table;
