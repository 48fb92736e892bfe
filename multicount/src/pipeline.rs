//! The job itself: read, tokenize, expand, count, write.
//!
//! The pipeline is a single linear pass with no internal state machine.  Any
//! stage failure aborts the run; there is no partial output, retry, or
//! row-skipping policy at this level.

use std::path::{Path, PathBuf};

use log::info;
use multicount_flow::collection::Collection;
use multicount_flow::runner::Runner;

use crate::error::Error;
use crate::expand::expand;
use crate::schema::{GroupKey, InputRecord, TokenRecord};
use crate::sink;
use crate::source;
use crate::tokenize::Tokenizer;

/// Counters reported by a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub rows: usize,
    pub tokens: usize,
    pub groups: usize,
}

/// The tokenize → expand → count → sink job.
pub struct Pipeline {
    partitions: usize,
    spill_dir: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(partitions: usize) -> Self {
        Pipeline {
            partitions: partitions.max(1),
            spill_dir: None,
        }
    }

    /// Stages the aggregation shuffle through compressed spill files under
    /// `dir` instead of holding it in memory.
    pub fn with_spill_dir(mut self, dir: PathBuf) -> Self {
        self.spill_dir = Some(dir);
        self
    }

    /// Runs the whole job: reads `input`, writes the four dimension files
    /// under `output`.
    pub fn run<R: Runner + ?Sized>(
        &self,
        runner: &R,
        input: &Path,
        output: &Path,
    ) -> Result<Summary, Error> {
        let rows = source::read_rows(input)?;
        let n_rows = rows.len();
        info!("read {} rows from {}", n_rows, input.display());

        let tokenizer = Tokenizer::new();
        let tokens = Collection::from_vec(rows)
            .split(runner, self.partitions)
            .emit(runner, move |row: &InputRecord, out| {
                for token in tokenizer.tokenize(&row.text) {
                    out(TokenRecord {
                        token: token.to_owned(),
                        doc_id: row.doc_id.clone(),
                    });
                }
            });
        let n_tokens = tokens.len();

        let expanded = tokens.flat_map(runner, expand);

        let counts = match &self.spill_dir {
            Some(dir) => expanded.fold_by_spilled(
                runner,
                GroupKey::clone,
                || 0u64,
                |acc, _key| *acc += 1,
                |acc, partial| *acc += partial,
                self.partitions,
                dir,
            )?,
            None => expanded.count_by(runner, GroupKey::clone, self.partitions),
        };

        let aggregates = counts.into_vec();
        let n_groups = aggregates.len();
        info!(
            "counted {} distinct groups over {} tokens",
            n_groups, n_tokens
        );

        sink::write(runner, output, aggregates)?;
        Ok(Summary {
            rows: n_rows,
            tokens: n_tokens,
            groups: n_groups,
        })
    }
}
