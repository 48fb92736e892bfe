use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the flow layer.  Jobs treat every one of these as fatal.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to build runner thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("spill i/o error at {path}: {source}")]
    SpillIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("spill codec error: {0}")]
    SpillCodec(#[from] bincode::Error),
}
