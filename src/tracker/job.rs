use std::panic::Location;

/// Job name used when nothing resolved one before emission.
pub const UNKNOWN_JOB: &str = "unknown";

/// How the job name of a run was decided.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobName {
    #[default]
    Unresolved,
    /// Configured or set explicitly. Never replaced by a caller location.
    Override(String),
    /// Source file of the first instrumented call.
    CallerLocation(String),
}

impl JobName {
    /// Resolves the name once. Returns true when this call set it.
    pub fn ensure(&mut self, configured: Option<&str>, caller: &str) -> bool {
        if !matches!(self, JobName::Unresolved) {
            return false;
        }
        *self = match configured {
            Some(name) => JobName::Override(name.to_string()),
            None => JobName::CallerLocation(caller.to_string()),
        };
        true
    }

    pub fn set_override(&mut self, name: impl Into<String>) {
        *self = JobName::Override(name.into());
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JobName::Override(name) | JobName::CallerLocation(name) => Some(name.as_str()),
            JobName::Unresolved => None,
        }
    }

    /// Name to put on an event, falling back to the configured override and
    /// then to `UNKNOWN_JOB`.
    pub fn for_event<'a>(&'a self, configured: Option<&'a str>) -> &'a str {
        self.as_str().or(configured).unwrap_or(UNKNOWN_JOB)
    }
}

/// Source file of the caller.
///
/// Heuristic: every function between the user's code and this call must be
/// `#[track_caller]`, otherwise the innermost untracked frame is reported.
#[track_caller]
pub fn caller_location() -> &'static str {
    Location::caller().file()
}
