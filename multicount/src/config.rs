use std::path::PathBuf;

use clap::Parser;

/// Tokenizes a tab-delimited text file and counts tokens along four grouping
/// dimensions, writing one tab-separated output file per dimension.
#[derive(Debug, Parser)]
#[command(name = "multicount", version)]
pub struct Config {
    /// Tab-separated source file with `doc_id` and `text` columns.
    #[arg(long)]
    pub input: PathBuf,

    /// Base directory for the per-dimension output files; replaced if present.
    #[arg(long)]
    pub output: PathBuf,

    /// Number of data partitions used for splitting and shuffling.
    #[arg(long, default_value_t = num_cpus::get())]
    pub partitions: usize,

    /// Worker threads; 1 runs the whole job on the calling thread.
    #[arg(long, default_value_t = num_cpus::get())]
    pub threads: usize,

    /// Stage the aggregation shuffle through compressed spill files in this
    /// directory instead of memory.
    #[arg(long)]
    pub spill_dir: Option<PathBuf>,
}
