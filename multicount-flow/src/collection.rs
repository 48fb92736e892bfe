//! Collection
//! ---
//! An eager, in-memory collection split into partitions.  Every operator
//! dispatches its per-partition work through a [`Runner`], so the same job
//! code runs single-threaded or on a pool depending on which runner is
//! injected.

use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;
use crate::runner::Runner;
use crate::spill::{SpillFile, SpillWriter};

/// A partitioned batch of records.
#[derive(Clone)]
pub struct Collection<A> {
    partitions: Vec<Vec<A>>,
}

impl<A> Collection<A> {
    /// Creates a single-partition collection from a Vec of items.
    /// ```rust
    ///   use multicount_flow::collection::Collection;
    ///
    ///   let col = Collection::from_vec(vec![1, 2, 3usize]);
    ///   assert_eq!(col.n_partitions(), 1);
    ///   assert_eq!(col.into_vec(), vec![1, 2, 3usize]);
    /// ```
    pub fn from_vec(items: Vec<A>) -> Collection<A> {
        Collection {
            partitions: vec![items],
        }
    }

    /// Creates a collection with one partition per inner Vec.
    pub fn from_partitions(partitions: Vec<Vec<A>>) -> Collection<A> {
        Collection { partitions }
    }

    /// Returns the current number of data partitions.
    pub fn n_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Total number of items across all partitions.
    pub fn len(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenates all partitions, in partition order.
    pub fn into_vec(self) -> Vec<A> {
        let mut out = Vec::with_capacity(self.len());
        for mut part in self.partitions {
            out.append(&mut part);
        }
        out
    }
}

impl<A: Send> Collection<A> {
    /// Maps over all items, optionally emitting new values.  Fuses map,
    /// filter and flat_map style transforms into a single pass.
    /// ```rust
    ///   use multicount_flow::collection::Collection;
    ///   use multicount_flow::runner::SequentialRunner;
    ///
    ///   let col = Collection::from_vec(vec![1, 2, 3usize]);
    ///   let new = col.emit(&SequentialRunner, |item, out| {
    ///       if item % 2 == 0 {
    ///           out(format!("{}!", item));
    ///       }
    ///   });
    ///   assert_eq!(new.into_vec(), vec!["2!".to_owned()]);
    /// ```
    pub fn emit<B, R, F>(self, runner: &R, f: F) -> Collection<B>
    where
        B: Send,
        R: Runner + ?Sized,
        F: Fn(&A, &mut dyn FnMut(B)) + Send + Sync,
    {
        let partitions = runner.map_parts(self.partitions, |_idx, part: Vec<A>| {
            let mut out = Vec::new();
            for item in &part {
                f(item, &mut |record| out.push(record));
            }
            out
        });
        Collection { partitions }
    }

    /// Maps a function over every item.
    /// ```rust
    ///   use multicount_flow::collection::Collection;
    ///   use multicount_flow::runner::SequentialRunner;
    ///
    ///   let col = Collection::from_vec(vec![1, 2, 3usize]);
    ///   let strings = col.map(&SequentialRunner, |i| format!("{}", i));
    ///   assert_eq!(strings.into_vec(),
    ///       vec!["1".to_owned(), "2".to_owned(), "3".to_owned()]);
    /// ```
    pub fn map<B, R, F>(self, runner: &R, f: F) -> Collection<B>
    where
        B: Send,
        R: Runner + ?Sized,
        F: Fn(&A) -> B + Send + Sync,
    {
        self.emit(runner, move |item, out| out(f(item)))
    }

    /// Maps every item to a sequence of new items and flattens the result.
    /// ```rust
    ///   use multicount_flow::collection::Collection;
    ///   use multicount_flow::runner::SequentialRunner;
    ///
    ///   let col = Collection::from_vec(vec![1, 3usize]);
    ///   let expanded = col.flat_map(&SequentialRunner, |x| [*x, *x * 10]);
    ///   assert_eq!(expanded.into_vec(), vec![1, 10, 3, 30]);
    /// ```
    pub fn flat_map<B, I, R, F>(self, runner: &R, f: F) -> Collection<B>
    where
        B: Send,
        I: IntoIterator<Item = B>,
        R: Runner + ?Sized,
        F: Fn(&A) -> I + Send + Sync,
    {
        self.emit(runner, move |item, out| {
            for record in f(item) {
                out(record);
            }
        })
    }

    /// Re-partitions the collection into `n_chunks` partitions, distributing
    /// items from each old partition round-robin into the new ones.
    /// ```rust
    ///   use multicount_flow::collection::Collection;
    ///   use multicount_flow::runner::SequentialRunner;
    ///
    ///   let col = Collection::from_vec(vec![1, 2, 3, 4usize]);
    ///   let two = col.split(&SequentialRunner, 2);
    ///   assert_eq!(two.n_partitions(), 2);
    ///   assert_eq!(two.len(), 4);
    /// ```
    pub fn split<R: Runner + ?Sized>(self, runner: &R, n_chunks: usize) -> Collection<A> {
        self.shuffle(runner, n_chunks, |idx, _item| idx)
    }

    /// Routes every item to the partition named by `route`, modulo the
    /// partition count.  This is the data-redistribution primitive behind
    /// both `split` and the `fold_by` shuffle.
    fn shuffle<R, F>(self, runner: &R, partitions: usize, route: F) -> Collection<A>
    where
        R: Runner + ?Sized,
        F: Fn(usize, &A) -> usize + Send + Sync,
    {
        let partitions = partitions.max(1);
        let staged = runner.map_parts(self.partitions, |_idx, part: Vec<A>| {
            let mut buckets: Vec<Vec<A>> = (0..partitions).map(|_| Vec::new()).collect();
            for (idx, item) in part.into_iter().enumerate() {
                let bucket = route(idx, &item) % partitions;
                buckets[bucket].push(item);
            }
            buckets
        });

        let mut merged: Vec<Vec<A>> = (0..partitions).map(|_| Vec::new()).collect();
        for buckets in staged {
            for (idx, mut bucket) in buckets.into_iter().enumerate() {
                merged[idx].append(&mut bucket);
            }
        }
        Collection { partitions: merged }
    }

    /// Folds and accumulates values by key across partitions.  This is a
    /// group-by with a following reducer: each partition is first block
    /// reduced into a key-to-accumulator map with `binop`, the partial
    /// accumulators are then shuffled by key hash into `partitions` buckets,
    /// and each bucket is merged with `reduce`.  The shuffle is the single
    /// synchronization barrier of a job; everything on either side of it is
    /// partition-parallel.
    /// ```rust
    ///   use multicount_flow::collection::Collection;
    ///   use multicount_flow::runner::SequentialRunner;
    ///
    ///   let col = Collection::from_vec(vec![1, 2, 3, 4, 5usize]);
    ///   // Sum all odds and evens together
    ///   let mut sums = col.fold_by(&SequentialRunner,
    ///                              |x| x % 2,
    ///                              || 0usize,
    ///                              |acc, item| *acc += *item,
    ///                              |acc, partial| *acc += partial,
    ///                              2)
    ///       .into_vec();
    ///   sums.sort();
    ///   assert_eq!(sums, vec![(0, 6), (1, 9)]);
    /// ```
    pub fn fold_by<K, B, R, KF, DF, OF, RF>(
        self,
        runner: &R,
        key: KF,
        default: DF,
        binop: OF,
        reduce: RF,
        partitions: usize,
    ) -> Collection<(K, B)>
    where
        K: Hash + Eq + Send,
        B: Send,
        R: Runner + ?Sized,
        KF: Fn(&A) -> K + Send + Sync,
        DF: Fn() -> B + Send + Sync,
        OF: Fn(&mut B, &A) + Send + Sync,
        RF: Fn(&mut B, B) + Send + Sync,
    {
        let partitions = partitions.max(1);
        let blocks = self.block_reduce(runner, &key, &default, &binop);

        let staged = runner.map_parts(blocks, |_idx, block: HashMap<K, B>| {
            let mut buckets: Vec<Vec<(K, B)>> = (0..partitions).map(|_| Vec::new()).collect();
            for (k, v) in block {
                let bucket = bucket_of(&k, partitions);
                buckets[bucket].push((k, v));
            }
            buckets
        });

        let mut gathered: Vec<Vec<(K, B)>> = (0..partitions).map(|_| Vec::new()).collect();
        for buckets in staged {
            for (idx, mut bucket) in buckets.into_iter().enumerate() {
                gathered[idx].append(&mut bucket);
            }
        }

        let merged = runner.map_parts(gathered, |_idx, pairs: Vec<(K, B)>| {
            let mut acc: HashMap<K, B> = HashMap::new();
            for (k, v) in pairs {
                match acc.entry(k) {
                    Entry::Occupied(mut slot) => reduce(slot.get_mut(), v),
                    Entry::Vacant(slot) => {
                        slot.insert(v);
                    }
                }
            }
            acc.into_iter().collect::<Vec<_>>()
        });
        debug!("fold_by produced {} partitions", merged.len());
        Collection { partitions: merged }
    }

    /// Counts occurrences of every distinct key.
    /// ```rust
    ///   use multicount_flow::collection::Collection;
    ///   use multicount_flow::runner::SequentialRunner;
    ///
    ///   let col = Collection::from_vec(vec![1, 2, 1, 5, 1, 2usize]);
    ///   let mut freqs = col.count_by(&SequentialRunner, |x| *x, 1).into_vec();
    ///   freqs.sort();
    ///   assert_eq!(freqs, vec![(1, 3), (2, 2), (5, 1)]);
    /// ```
    pub fn count_by<K, R, KF>(self, runner: &R, key: KF, partitions: usize) -> Collection<(K, u64)>
    where
        K: Hash + Eq + Send,
        R: Runner + ?Sized,
        KF: Fn(&A) -> K + Send + Sync,
    {
        self.fold_by(
            runner,
            key,
            || 0u64,
            |acc, _item| *acc += 1,
            |acc, partial| *acc += partial,
            partitions,
        )
    }

    /// `fold_by` with the shuffle staged through spill files under `dir`
    /// instead of held in memory.  Partial accumulators are written bucket by
    /// bucket as compressed records and streamed back for the merge, so only
    /// one block and one bucket are resident at a time.  Results are
    /// identical to the in-memory path.
    #[allow(clippy::too_many_arguments)]
    pub fn fold_by_spilled<K, B, R, KF, DF, OF, RF>(
        self,
        runner: &R,
        key: KF,
        default: DF,
        binop: OF,
        reduce: RF,
        partitions: usize,
        dir: &Path,
    ) -> Result<Collection<(K, B)>, Error>
    where
        K: Hash + Eq + Send + Serialize + DeserializeOwned,
        B: Send + Serialize + DeserializeOwned,
        R: Runner + ?Sized,
        KF: Fn(&A) -> K + Send + Sync,
        DF: Fn() -> B + Send + Sync,
        OF: Fn(&mut B, &A) + Send + Sync,
        RF: Fn(&mut B, B) + Send + Sync,
    {
        let partitions = partitions.max(1);
        fs::create_dir_all(dir).map_err(|e| Error::SpillIo {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let blocks = self.block_reduce(runner, &key, &default, &binop);
        debug!(
            "spilling {} blocks into {} buckets under {}",
            blocks.len(),
            partitions,
            dir.display()
        );

        let staged = runner.map_parts(
            blocks,
            |_idx, block: HashMap<K, B>| -> Result<Vec<SpillFile<(K, B)>>, Error> {
                let mut writers: Vec<SpillWriter<(K, B)>> = Vec::with_capacity(partitions);
                for _ in 0..partitions {
                    writers.push(SpillWriter::create(dir)?);
                }
                for (k, v) in block {
                    let bucket = bucket_of(&k, partitions);
                    writers[bucket].add(&(k, v))?;
                }
                writers.into_iter().map(|w| w.finish()).collect()
            },
        );

        let mut gathered: Vec<Vec<SpillFile<(K, B)>>> =
            (0..partitions).map(|_| Vec::new()).collect();
        for files in staged {
            for (idx, file) in files?.into_iter().enumerate() {
                gathered[idx].push(file);
            }
        }

        let merged = runner.map_parts(
            gathered,
            |_idx, files: Vec<SpillFile<(K, B)>>| -> Result<Vec<(K, B)>, Error> {
                let mut acc: HashMap<K, B> = HashMap::new();
                for file in files {
                    for record in file.iter()? {
                        let (k, v) = record?;
                        match acc.entry(k) {
                            Entry::Occupied(mut slot) => reduce(slot.get_mut(), v),
                            Entry::Vacant(slot) => {
                                slot.insert(v);
                            }
                        }
                    }
                }
                Ok(acc.into_iter().collect())
            },
        );

        let partitions_out = merged.into_iter().collect::<Result<Vec<_>, _>>()?;
        Ok(Collection {
            partitions: partitions_out,
        })
    }

    /// Combines values sharing a key within each partition.  One map per
    /// partition comes back; the shuffle happens afterwards.
    fn block_reduce<K, B, R, KF, DF, OF>(
        self,
        runner: &R,
        key: &KF,
        default: &DF,
        binop: &OF,
    ) -> Vec<HashMap<K, B>>
    where
        K: Hash + Eq + Send,
        B: Send,
        R: Runner + ?Sized,
        KF: Fn(&A) -> K + Sync,
        DF: Fn() -> B + Sync,
        OF: Fn(&mut B, &A) + Sync,
    {
        runner.map_parts(self.partitions, |_idx, part: Vec<A>| {
            let mut acc: HashMap<K, B> = HashMap::new();
            for item in &part {
                let slot = acc.entry(key(item)).or_insert_with(default);
                binop(slot, item);
            }
            acc
        })
    }
}

fn bucket_of<K: Hash>(key: &K, partitions: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() as usize) % partitions
}

#[cfg(test)]
mod collection_test {
    use super::*;
    use crate::runner::{SequentialRunner, ThreadedRunner};

    #[test]
    fn test_fold_by() {
        let col = Collection::from_vec(vec![1, 2, 3, 1, 2usize]);
        let out = col.fold_by(
            &SequentialRunner,
            |x| *x,
            || 0usize,
            |acc, _item| *acc += 1,
            |acc, partial| *acc += partial,
            1,
        );
        let mut results = out.into_vec();
        results.sort();
        assert_eq!(results, vec![(1, 2), (2, 2), (3, 1)]);
    }

    #[test]
    fn test_fold_by_parts() {
        let col = Collection::from_vec(vec![1, 2, 3, 1, 2usize]);
        let out = col.fold_by(
            &SequentialRunner,
            |x| *x,
            || 0usize,
            |acc, _item| *acc += 1,
            |acc, partial| *acc += partial,
            2,
        );
        assert_eq!(out.n_partitions(), 2);
        let mut results = out.into_vec();
        results.sort();
        assert_eq!(results, vec![(1, 2), (2, 2), (3, 1)]);
    }

    #[test]
    fn test_from_partitions_keeps_layout() {
        let col = Collection::from_partitions(vec![vec![1, 2], vec![3usize]]);
        assert_eq!(col.n_partitions(), 2);
        assert_eq!(col.len(), 3);
        assert_eq!(col.into_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_split_distributes_all_items() {
        let col = Collection::from_vec((0..10usize).collect());
        let split = col.split(&SequentialRunner, 3);
        assert_eq!(split.n_partitions(), 3);
        let mut results = split.into_vec();
        results.sort();
        assert_eq!(results, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_count_by_over_split() {
        let words = vec!["cat", "dog", "cat", "cat", "dog"];
        let col = Collection::from_vec(words).split(&SequentialRunner, 2);
        let mut counts = col
            .count_by(&SequentialRunner, |w| w.to_string(), 2)
            .into_vec();
        counts.sort();
        assert_eq!(
            counts,
            vec![("cat".to_owned(), 3), ("dog".to_owned(), 2)]
        );
    }

    #[test]
    fn test_emit_fans_out() {
        let results = Collection::from_vec(vec![1, 2, 3usize])
            .emit(&SequentialRunner, |num, out| {
                for i in 0..*num {
                    out(i);
                }
            })
            .into_vec();
        assert_eq!(results, vec![0, 0, 1, 0, 1, 2]);
    }

    #[test]
    fn test_threaded_runner_matches_sequential() {
        let items: Vec<usize> = (0..100).map(|x| x % 7).collect();
        let runner = ThreadedRunner::new(4).unwrap();

        let mut seq = Collection::from_vec(items.clone())
            .split(&SequentialRunner, 4)
            .count_by(&SequentialRunner, |x| *x, 3)
            .into_vec();
        let mut par = Collection::from_vec(items)
            .split(&runner, 4)
            .count_by(&runner, |x| *x, 3)
            .into_vec();
        seq.sort();
        par.sort();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_fold_by_spilled_matches_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let items: Vec<u64> = (0..500).map(|x| x % 13).collect();

        let mut in_memory = Collection::from_vec(items.clone())
            .split(&SequentialRunner, 4)
            .count_by(&SequentialRunner, |x| *x, 3)
            .into_vec();
        let mut spilled = Collection::from_vec(items)
            .split(&SequentialRunner, 4)
            .fold_by_spilled(
                &SequentialRunner,
                |x| *x,
                || 0u64,
                |acc, _item| *acc += 1,
                |acc, partial| *acc += partial,
                3,
                dir.path(),
            )
            .unwrap()
            .into_vec();
        in_memory.sort();
        spilled.sort();
        assert_eq!(in_memory, spilled);

        // All spill files are removed once the shuffle is done.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_collection_folds_to_nothing() {
        let col: Collection<usize> = Collection::from_vec(Vec::new());
        let out = col.count_by(&SequentialRunner, |x| *x, 2);
        assert!(out.is_empty());
    }
}
