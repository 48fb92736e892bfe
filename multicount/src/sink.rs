//! Multi-file sink: one tab-separated output file per dimension, named after
//! the dimension's group id.  The output base directory is replaced, never
//! appended to.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use multicount_flow::runner::Runner;

use crate::error::Error;
use crate::schema::{Dimension, GroupKey};

pub const HEADER: &str = "groupId\tgroup\tcount";

/// Partitions `aggregates` by dimension and writes all four files under
/// `base`, in parallel through the runner.  Dimensions with no groups still
/// get a header-only file.  An existing `base` is deleted first; failing to
/// clear or recreate it aborts the run rather than mixing stale and fresh
/// output.
pub fn write<R: Runner + ?Sized>(
    runner: &R,
    base: &Path,
    aggregates: Vec<(GroupKey, u64)>,
) -> Result<(), Error> {
    replace_dir(base)?;

    let mut buckets: Vec<(Dimension, Vec<(GroupKey, u64)>)> =
        Dimension::ALL.iter().map(|d| (*d, Vec::new())).collect();
    for (key, count) in aggregates {
        buckets[key.dimension().index()].1.push((key, count));
    }

    let results = runner.map_parts(buckets, |_idx, (dimension, mut rows)| {
        // Unordered out of the aggregation; sorted here so output is stable.
        rows.sort_by_key(|(key, _count)| key.group());
        write_partition(base, dimension, &rows)
    });
    for result in results {
        result?;
    }
    Ok(())
}

fn replace_dir(base: &Path) -> Result<(), Error> {
    let sink_err = |e| Error::Sink {
        path: base.to_path_buf(),
        source: e,
    };
    // Replace whatever is there, directory or plain file.
    if base.is_dir() {
        fs::remove_dir_all(base).map_err(sink_err)?;
    } else if base.exists() {
        fs::remove_file(base).map_err(sink_err)?;
    }
    fs::create_dir_all(base).map_err(sink_err)
}

fn write_partition(
    base: &Path,
    dimension: Dimension,
    rows: &[(GroupKey, u64)],
) -> Result<(), Error> {
    let path = base.join(dimension.group_id());
    let sink_err = |e| Error::Sink {
        path: path.clone(),
        source: e,
    };

    let fd = File::create(&path).map_err(&sink_err)?;
    let mut out = BufWriter::new(fd);
    writeln!(out, "{HEADER}").map_err(&sink_err)?;
    for (key, count) in rows {
        writeln!(out, "{}\t{}\t{}", dimension.group_id(), key.group(), count).map_err(&sink_err)?;
    }
    out.flush().map_err(&sink_err)?;
    debug!("wrote {} groups to {}", rows.len(), path.display());
    Ok(())
}
