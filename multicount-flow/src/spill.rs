//! On-disk staging for shuffled records.
//!
//! A [`SpillWriter`] appends bincode-encoded records through a snappy frame
//! encoder into a uniquely named file; finishing it yields a [`SpillFile`]
//! that can be streamed back and that removes its file when dropped.  Only
//! the record currently in flight needs to be resident, which is what lets
//! `fold_by_spilled` shuffle inputs larger than memory.

use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use snap::read::FrameDecoder;
use snap::write::FrameEncoder;
use uuid::Uuid;

use crate::error::Error;

/// Append-only writer for one spill file.
pub struct SpillWriter<A> {
    path: PathBuf,
    out: FrameEncoder<File>,
    records: PhantomData<A>,
}

impl<A: Serialize> SpillWriter<A> {
    /// Opens a fresh, uniquely named file under `dir`.
    pub fn create(dir: &Path) -> Result<Self, Error> {
        let path = dir.join(format!("spill-{}", Uuid::new_v4()));
        let fd = File::create(&path).map_err(|e| Error::SpillIo {
            path: path.clone(),
            source: e,
        })?;
        Ok(SpillWriter {
            path,
            out: FrameEncoder::new(fd),
            records: PhantomData,
        })
    }

    pub fn add(&mut self, item: &A) -> Result<(), Error> {
        bincode::serialize_into(&mut self.out, item).map_err(Error::SpillCodec)
    }

    /// Flushes pending frames and seals the file for reading.
    pub fn finish(mut self) -> Result<SpillFile<A>, Error> {
        self.out.flush().map_err(|e| Error::SpillIo {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(SpillFile {
            path: self.path,
            records: PhantomData,
        })
    }
}

/// A sealed spill file.  The backing file is removed on drop.
pub struct SpillFile<A> {
    path: PathBuf,
    records: PhantomData<A>,
}

impl<A: DeserializeOwned> SpillFile<A> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Streams the records back in write order.
    pub fn iter(&self) -> Result<SpillIter<A>, Error> {
        let fd = File::open(&self.path).map_err(|e| Error::SpillIo {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(SpillIter {
            input: FrameDecoder::new(BufReader::new(fd)),
            records: PhantomData,
        })
    }
}

impl<A> Drop for SpillFile<A> {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("failed to remove spill file {}: {}", self.path.display(), e);
        }
    }
}

pub struct SpillIter<A> {
    input: FrameDecoder<BufReader<File>>,
    records: PhantomData<A>,
}

impl<A: DeserializeOwned> Iterator for SpillIter<A> {
    type Item = Result<A, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match bincode::deserialize_from(&mut self.input) {
            Ok(record) => Some(Ok(record)),
            Err(e) => match *e {
                bincode::ErrorKind::Io(ref io)
                    if io.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    None
                }
                _ => Some(Err(Error::SpillCodec(e))),
            },
        }
    }
}
