use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Faults the passes need to tell apart from plain I/O or browser errors
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("no category snapshot at {}; run the categories pass first", path.display())]
    MissingCatalog { path: PathBuf },

    #[error("category snapshot at {} is unreadable: {reason}", path.display())]
    UnreadableCatalog { path: PathBuf, reason: String },

    #[error("no element matching `{selector}` appeared within {waited:?}")]
    ContentTimeout { selector: String, waited: Duration },

    #[error("element handle {0} is not on the current page")]
    UnknownElement(u64),
}
