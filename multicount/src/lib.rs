//! multicount
//! ---
//! A batch job that reads a tab-delimited file with `doc_id` and `text`
//! columns, tokenizes the text, and counts tokens along four grouping
//! dimensions at once: globally, per token, per document, and per token and
//! document.  Each dimension is written to its own tab-separated file, named
//! after the dimension's group id, under the output directory.
//!
//! The flow is a single pass: read, tokenize, fan each token out into its
//! four dimension-tagged group keys, count by key, write.  Execution is
//! delegated to a `multicount_flow` runner, so the whole job runs on the
//! calling thread or on a thread pool without any change to the job logic.

pub mod config;
pub mod error;
pub mod expand;
pub mod pipeline;
pub mod schema;
pub mod sink;
pub mod source;
pub mod tokenize;

pub use crate::error::Error;
pub use crate::pipeline::{Pipeline, Summary};
