//! # Lazy Corpus

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;

use crate::corpus::progress::{SampleProgress, report_final};
use crate::corpus::{CorpusDataset, CorpusOptions, SampleMode, record_lines};
use crate::errors::CorpusResult;
use crate::processor::RecordProcessor;
use crate::types::{Instance, Record};

/// A lazy corpus: raw records, processed per access.
///
/// Stores unprocessed [`Record`]s and invokes the processor on every
/// [`get`](CorpusDataset::get), with no memoization; trades memory for
/// repeated CPU cost. Does not participate in caching: a requested cache
/// is forced off with a warning.
///
/// In [`SampleMode::Reservoir`], a lazy corpus draws `max_instance`
/// records *with replacement* after a full read (so duplicates are
/// possible); this diverges from the eager reservoir algorithm and is
/// preserved as-is.
pub struct LazyCorpus {
    source_path: PathBuf,
    processor: Arc<dyn RecordProcessor>,
    records: Vec<Record>,
}

impl LazyCorpus {
    /// Open (sample) a lazy corpus.
    ///
    /// ## Arguments
    /// * `path` - the JSONL source file.
    /// * `processor` - the record processor, applied at access time.
    /// * `options` - sampling options; `use_cache` is ignored.
    pub fn open<P: AsRef<Path>>(
        path: P,
        processor: Arc<dyn RecordProcessor>,
        options: CorpusOptions,
    ) -> CorpusResult<Self> {
        let source_path = path.as_ref().to_path_buf();

        // Caching defaults on, so the warning also fires for unset options.
        if options.use_cache() {
            log::warn!("lazy corpus does not support `use_cache`; disabling it");
        }

        let records = match options.mode {
            SampleMode::Prefix => sample_prefix(&source_path, &options)?,
            SampleMode::Reservoir => sample_choices(&source_path, &options)?,
        };

        report_final(
            &source_path.display().to_string(),
            records.len(),
            options.max_instance,
        );

        Ok(Self {
            source_path,
            processor,
            records,
        })
    }

    /// The source file path.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// The stored raw records.
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

impl CorpusDataset for LazyCorpus {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn get(
        &self,
        index: usize,
    ) -> CorpusResult<Option<Instance>> {
        match self.records.get(index) {
            Some(record) => self.processor.process(record),
            None => Ok(None),
        }
    }
}

/// Take the first `max_instance` raw records.
fn sample_prefix(
    path: &Path,
    options: &CorpusOptions,
) -> CorpusResult<Vec<Record>> {
    let path_str = path.display().to_string();
    let mut progress = SampleProgress::counted(options.progress(), &path_str, options.max_instance);

    let mut records = Vec::new();
    for record in record_lines(path)? {
        records.push(record?);
        progress.inc();

        if let Some(bound) = options.max_instance
            && records.len() >= bound
        {
            break;
        }
    }

    progress.clear();
    Ok(records)
}

/// Read everything, then draw `max_instance` records with replacement.
///
/// An unbounded corpus keeps the full record list.
fn sample_choices(
    path: &Path,
    options: &CorpusOptions,
) -> CorpusResult<Vec<Record>> {
    let path_str = path.display().to_string();
    let mut progress = SampleProgress::counted(options.progress(), &path_str, None);

    let mut records = Vec::new();
    for record in record_lines(path)? {
        records.push(record?);
        progress.inc();
    }
    progress.clear();

    let Some(bound) = options.max_instance else {
        return Ok(records);
    };
    if records.is_empty() {
        return Ok(records);
    }

    let mut rng = options.rng();
    let sample = (0..bound)
        .map(|_| records[rng.random_range(0..records.len())].clone())
        .collect();
    Ok(sample)
}
