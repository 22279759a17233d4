//! # Record Processors
//!
//! A processor turns one raw JSON [`Record`] into a tokenized
//! [`Instance`], given a declarative configuration and a tokenizer
//! capability. Two variants exist:
//!
//! * [`ConcatProcessor`] - ordered multi-field concatenation with
//!   per-field character truncation and a global token budget.
//! * [`ConversationProcessor`] - multi-turn dialogue rendering with
//!   token-level loss masking of the instruction role.

mod concat;
mod conversation;
mod padding;
pub mod template;

pub use concat::ConcatProcessor;
pub use conversation::ConversationProcessor;
pub use padding::{PadSide, Padding};

use sha2::{Digest, Sha256};

use crate::errors::CorpusResult;
use crate::tokenizer::TextTokenizer;
use crate::types::{Instance, Record};

/// A record-to-instance processor.
pub trait RecordProcessor: Send + Sync {
    /// Process one raw record.
    ///
    /// ## Arguments
    /// * `record` - the raw source record.
    ///
    /// ## Returns
    /// `Ok(Some(instance))` on success; `Ok(None)` silently drops the
    /// record from the corpus (reserved for future filtering); `Err` for
    /// malformed records or configuration violations.
    fn process(
        &self,
        record: &Record,
    ) -> CorpusResult<Option<Instance>>;

    /// The processor's config fingerprint (hex).
    ///
    /// Covers the raw config text, the tokenizer identity, and the padding
    /// settings; a corpus folds this into its cache key.
    fn fingerprint(&self) -> &str;
}

impl std::fmt::Debug for dyn RecordProcessor {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("RecordProcessor")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Compute a processor fingerprint.
///
/// SHA-256 over `"{config-text}/{tokenizer-identity}/{pad-side}/{pad-length}"`.
pub(crate) fn processor_fingerprint(
    config_text: &str,
    tokenizer: &dyn TextTokenizer,
    padding: &Padding,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(config_text);
    hasher.update("/");
    hasher.update(tokenizer.identity());
    hasher.update("/");
    hasher.update(padding.side.as_str());
    hasher.update("/");
    match padding.length {
        Some(length) => hasher.update(length.to_string()),
        None => hasher.update("none"),
    }
    format!("{:x}", hasher.finalize())
}
