//! # `corpusmill` Training Corpus Preparation
//!
//! `corpusmill` prepares line-delimited JSON corpora for sequence-model
//! fine-tuning. Each source record is converted into a tokenized
//! `input_ids` / `labels` / `attention_mask` triple, optionally truncated
//! and padded, and the realized sample is checkpointed to disk so repeated
//! runs skip re-tokenization.
//!
//! See:
//! * [`processor`] to turn raw records into [`types::Instance`] triples.
//! * [`corpus`] to sample, cache, and index a realized corpus.
//! * [`stat`] for per-field statistics over corpora and raw files.
//! * [`tokenizer`] for the tokenizer capability consumed by processors.
//!
//! ## Crate Features
//!
//! #### feature: ``testing``
//!
//! Enables test utilities ([`testing`]), including a deterministic
//! [`testing::StubTokenizer`] with call-count instrumentation.
//!
//! ## Preparing a Corpus
//!
//! ```rust,ignore
//! use corpusmill::config::load_processor;
//! use corpusmill::corpus::{Corpus, CorpusDataset, CorpusOptions, SampleMode};
//! use corpusmill::processor::Padding;
//!
//! let processor = load_processor("dataconfig.json", tokenizer, Padding::default())?;
//! let corpus = Corpus::open(
//!     "longalpaca.json",
//!     processor,
//!     CorpusOptions::default()
//!         .with_max_instance(Some(10_000))
//!         .with_mode(SampleMode::Reservoir),
//! )?;
//!
//! let instance = corpus.get(0)?;
//! ```
#![warn(missing_docs, unused)]

pub mod config;
pub mod corpus;
pub mod errors;
pub mod processor;
pub mod stat;
pub mod tokenizer;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[doc(inline)]
pub use corpusmill_disk_cache as disk_cache;

pub use errors::{CorpusResult, CorpusmillError};
pub use types::{IGNORE_INDEX, Instance, Record, TokenId};
