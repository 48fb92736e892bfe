use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Job-level errors.  Every variant is fatal to the run; there is no
/// partial-success mode.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read source {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("source {path} is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("malformed row in {path}: {source}")]
    MalformedRow {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {path}: {source}")]
    Sink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Flow(#[from] multicount_flow::Error),
}
