use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one in-memory data object within a run.
///
/// Only used as a deduplication key. Two tables with equal contents but
/// different tokens are different datasets. Tokens only come from `mint`,
/// so host-observed objects and tables share one collision-free space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleToken(u64);

impl HandleToken {
    /// Mints a token that is unique for the lifetime of the process.
    pub fn mint() -> Self {
        HandleToken(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle#{}", self.0)
    }
}

/// A data object observed at an I/O boundary: who it is, where it lives,
/// and which columns it had at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetReference {
    handle: HandleToken,
    path: String,
    columns: Vec<String>,
}

impl DatasetReference {
    pub fn new(handle: HandleToken, path: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            handle,
            path: path.into(),
            columns,
        }
    }

    pub fn handle(&self) -> HandleToken {
        self.handle
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}
