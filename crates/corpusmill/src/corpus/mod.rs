//! # Corpus Sampling & Caching Engine
//!
//! A corpus reads a JSONL source file, applies a
//! [`RecordProcessor`](crate::processor::RecordProcessor) to each record,
//! manages a bounded-size sample, and checkpoints the realized sample to a
//! content-addressed cache file so repeated runs skip re-tokenization.
//!
//! Two axes of variants:
//! * eager [`Corpus`] vs [`LazyCorpus`]: eager stores processed instances
//!   (and supports caching); lazy stores raw records and applies the
//!   processor per access, trading memory for repeated CPU cost.
//! * [`SampleMode::Prefix`] vs [`SampleMode::Reservoir`]: prefix takes the
//!   first qualifying records and may stop early; reservoir takes a
//!   uniform random subset in one full pass.

mod eager;
mod lazy;
mod options;
mod progress;

pub use eager::Corpus;
pub use lazy::LazyCorpus;
pub use options::{CorpusOptions, SampleMode};
pub use progress::EtaTracker;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::errors::CorpusResult;
use crate::types::{Instance, Record};

/// The dataset indexing contract consumed by a training loop.
pub trait CorpusDataset: Send + Sync {
    /// The number of sampled items.
    fn len(&self) -> usize;

    /// Whether the corpus is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Random-access lookup; `Ok(None)` when out of bounds.
    ///
    /// Eager corpora return stored instances; lazy corpora invoke the
    /// processor on the stored raw record at every access.
    fn get(
        &self,
        index: usize,
    ) -> CorpusResult<Option<Instance>>;
}

/// Compute a corpus cache fingerprint.
///
/// SHA-256 over `"{variant-label}/{source-path}/{max_instance}/{processor-fingerprint}"`.
/// Any change to one component produces a new cache file; old files are
/// never invalidated or overwritten.
pub(crate) fn corpus_fingerprint(
    label: &str,
    path: &Path,
    max_instance: Option<usize>,
    processor_fingerprint: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(label);
    hasher.update("/");
    hasher.update(path.display().to_string());
    hasher.update("/");
    match max_instance {
        Some(bound) => hasher.update(bound.to_string()),
        None => hasher.update("none"),
    }
    hasher.update("/");
    hasher.update(processor_fingerprint);
    format!("{:x}", hasher.finalize())
}

/// Count the non-blank lines of a source file.
///
/// Used as the `total` for reservoir ETA display; counts every non-blank
/// line regardless of processor filtering.
pub(crate) fn count_records<P: AsRef<Path>>(path: P) -> CorpusResult<usize> {
    let file = File::open(path.as_ref())?;
    let mut count = 0;
    for line in BufReader::new(file).lines() {
        if !line?.trim().is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

/// Iterate the non-blank lines of a JSONL file as parsed [`Record`]s.
pub(crate) fn record_lines<P: AsRef<Path>>(
    path: P,
) -> CorpusResult<impl Iterator<Item = CorpusResult<Record>>> {
    let file = File::open(path.as_ref())?;
    Ok(BufReader::new(file).lines().filter_map(|line| match line {
        Err(err) => Some(Err(err.into())),
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(serde_json::from_str(&line).map_err(Into::into)),
    }))
}
