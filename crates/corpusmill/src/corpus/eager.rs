//! # Eager Corpus

use std::path::{Path, PathBuf};
use std::sync::Arc;

use corpusmill_disk_cache::{CorpusmillDiskCache, CorpusmillDiskCacheOptions, jsonl};
use rand::Rng;

use crate::corpus::progress::{SampleProgress, report_final};
use crate::corpus::{CorpusDataset, CorpusOptions, SampleMode, corpus_fingerprint, count_records, record_lines};
use crate::errors::CorpusResult;
use crate::processor::RecordProcessor;
use crate::types::Instance;

/// An eager corpus: processed instances, realized at construction.
///
/// Construction runs the shared lifecycle: compute the cache fingerprint,
/// load the checkpoint when one exists, otherwise run the configured
/// sampling pass; report the final count; and persist a new checkpoint
/// when caching is enabled. The sample buffer is immutable afterwards and
/// safe for concurrent reads.
pub struct Corpus {
    source_path: PathBuf,
    fingerprint: String,
    data: Vec<Instance>,
}

impl Corpus {
    /// Open (sample or cache-load) a corpus.
    ///
    /// ## Arguments
    /// * `path` - the JSONL source file.
    /// * `processor` - the record processor.
    /// * `options` - sampling and caching options.
    pub fn open<P: AsRef<Path>>(
        path: P,
        processor: Arc<dyn RecordProcessor>,
        options: CorpusOptions,
    ) -> CorpusResult<Self> {
        let source_path = path.as_ref().to_path_buf();
        let label = format!("Corpus/{}", options.mode.as_str());
        let fingerprint = corpus_fingerprint(
            &label,
            &source_path,
            options.max_instance,
            processor.fingerprint(),
        );

        let cache = if options.use_cache() {
            let cache = CorpusmillDiskCache::new(
                CorpusmillDiskCacheOptions::default().with_cache_dir(options.cache_dir.as_ref()),
            )?;
            cache.ensure_cache_dir()?;
            Some(cache)
        } else {
            None
        };

        let had_checkpoint = cache
            .as_ref()
            .is_some_and(|cache| cache.has_checkpoint(&fingerprint));

        let data = match &cache {
            Some(cache) if had_checkpoint => {
                let checkpoint = cache.checkpoint_path(&fingerprint);
                log::debug!("loading checkpoint {}", checkpoint.display());
                jsonl::read_jsonl(checkpoint)?
            }
            _ => match options.mode {
                SampleMode::Prefix => sample_prefix(&source_path, processor.as_ref(), &options)?,
                SampleMode::Reservoir => {
                    sample_reservoir(&source_path, processor.as_ref(), &options)?
                }
            },
        };

        report_final(
            &source_path.display().to_string(),
            data.len(),
            options.max_instance,
        );

        if let Some(cache) = &cache
            && !had_checkpoint
        {
            let checkpoint = cache.checkpoint_path(&fingerprint);
            log::info!("dumping {} instances to {}", data.len(), checkpoint.display());
            jsonl::write_jsonl(checkpoint, &data)?;
        }

        Ok(Self {
            source_path,
            fingerprint,
            data,
        })
    }

    /// The source file path.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// The corpus cache fingerprint (hex).
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// The realized sample buffer.
    pub fn instances(&self) -> &[Instance] {
        &self.data
    }

    /// Iterate the realized instances.
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.data.iter()
    }
}

impl CorpusDataset for Corpus {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn get(
        &self,
        index: usize,
    ) -> CorpusResult<Option<Instance>> {
        Ok(self.data.get(index).cloned())
    }
}

/// Take the first `max_instance` qualifying records.
fn sample_prefix(
    path: &Path,
    processor: &dyn RecordProcessor,
    options: &CorpusOptions,
) -> CorpusResult<Vec<Instance>> {
    let path_str = path.display().to_string();
    let mut progress = SampleProgress::counted(options.progress(), &path_str, options.max_instance);

    let mut data = Vec::new();
    for record in record_lines(path)? {
        if let Some(instance) = processor.process(&record?)? {
            data.push(instance);
            progress.inc();
        }

        if let Some(bound) = options.max_instance
            && data.len() >= bound
        {
            break;
        }
    }

    progress.clear();
    Ok(data)
}

/// Uniform random subset via the standard online reservoir algorithm.
///
/// For the i-th qualifying record (0-indexed): fill the buffer while below
/// the bound; then draw `j ~ U[0, i]` and replace `buffer[j]` iff `j <
/// bound`. Each of the first `i + 1` records ends up in the buffer with
/// equal probability `bound / (i + 1)`.
fn sample_reservoir(
    path: &Path,
    processor: &dyn RecordProcessor,
    options: &CorpusOptions,
) -> CorpusResult<Vec<Instance>> {
    let path_str = path.display().to_string();
    let total = count_records(path)?;
    let mut progress = SampleProgress::spinner(options.progress(), &path_str, total);

    let mut rng = options.rng();
    let mut data = Vec::new();
    let mut seen = 0usize;

    for record in record_lines(path)? {
        let Some(instance) = processor.process(&record?)? else {
            continue;
        };

        match options.max_instance {
            Some(bound) => {
                if data.len() < bound {
                    data.push(instance);
                } else {
                    let j = rng.random_range(0..=seen);
                    if j < bound {
                        data[j] = instance;
                    }
                }
            }
            None => data.push(instance),
        }

        seen += 1;
        progress.inc();
    }

    progress.clear();
    Ok(data)
}
