//! multicount-flow
//! ---
//! Small partitioned-dataflow primitives for local batch jobs.
//!
//! What is it?
//! ---
//!
//! `multicount-flow` provides an in-memory [`collection::Collection`] split
//! into partitions, a handful of dataflow operators over it (`emit`, `map`,
//! `flat_map`, `fold_by`, `count_by`), and a [`runner::Runner`] seam that
//! decides how the per-partition work of each stage is executed.  Stateless
//! stages run partition-parallel; `fold_by` performs the one shuffle a
//! group-by-aggregate needs, either fully in memory or staged through
//! compressed spill files for inputs that should not be resident all at once.
//!
//! Swapping the runner swaps the execution model without touching job logic:
//! [`runner::SequentialRunner`] runs everything on the calling thread, which
//! is what tests want, while [`runner::ThreadedRunner`] fans partitions out
//! over a thread pool.
//!
//! Example - Word Count
//! ---
//! ```rust
//! use multicount_flow::collection::Collection;
//! use multicount_flow::runner::SequentialRunner;
//!
//! let lines = vec!["a b a".to_owned(), "b".to_owned()];
//! let mut counts = Collection::from_vec(lines)
//!     .emit(&SequentialRunner, |line: &String, out| {
//!         for word in line.split_whitespace() {
//!             out(word.to_owned());
//!         }
//!     })
//!     .count_by(&SequentialRunner, |word| word.clone(), 2)
//!     .into_vec();
//! counts.sort();
//! assert_eq!(counts, vec![("a".to_owned(), 2), ("b".to_owned(), 2)]);
//! ```

pub mod collection;
pub mod error;
pub mod runner;
pub mod spill;

pub use crate::collection::Collection;
pub use crate::error::Error;
pub use crate::runner::{Runner, SequentialRunner, ThreadedRunner};
