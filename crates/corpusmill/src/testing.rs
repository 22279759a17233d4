//! # Test Utilities
//!
//! A deterministic [`StubTokenizer`] for exercising processors and corpora
//! without a real vocabulary.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::tokenizer::{EncodeOptions, TextTokenizer};
use crate::types::TokenId;

/// Token id emitted for the `"</s>"` turn terminator.
pub const STUB_EOS_ID: TokenId = 2;

/// Token id emitted for the leading special token.
pub const STUB_BOS_ID: TokenId = 1;

/// Pad token id of the stub.
pub const STUB_PAD_ID: TokenId = 0;

/// A deterministic character-level tokenizer.
///
/// Encoding rules:
/// * `"</s>"` encodes as the single token [`STUB_EOS_ID`].
/// * every other character encodes as its scalar value offset by 256.
/// * `add_special_tokens` prepends one [`STUB_BOS_ID`].
///
/// The mapping is strictly concatenative, so token offsets line up with
/// character offsets; this makes conversation-masking arithmetic exact and
/// easy to reason about in tests.
///
/// Every [`encode`](TextTokenizer::encode) call increments an internal
/// counter, so tests can assert that cached corpora skip re-tokenization.
#[derive(Debug, Default)]
pub struct StubTokenizer {
    calls: AtomicUsize,
    max_length: Option<usize>,
}

impl StubTokenizer {
    /// Construct a stub with the default (4096) model max length.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the model max length.
    pub fn with_model_max_length(
        mut self,
        max_length: usize,
    ) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// The number of `encode` calls made so far.
    pub fn encode_calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Reset the `encode` call counter.
    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::Relaxed);
    }
}

impl TextTokenizer for StubTokenizer {
    fn encode(
        &self,
        text: &str,
        options: &EncodeOptions,
    ) -> Vec<TokenId> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let mut ids = Vec::with_capacity(text.len() + 1);
        if options.add_special_tokens {
            ids.push(STUB_BOS_ID);
        }

        let mut rest = text;
        while !rest.is_empty() {
            if let Some(tail) = rest.strip_prefix("</s>") {
                ids.push(STUB_EOS_ID);
                rest = tail;
            } else {
                let ch = rest.chars().next().unwrap();
                ids.push(ch as TokenId + 256);
                rest = &rest[ch.len_utf8()..];
            }
        }

        if options.truncation
            && let Some(max_length) = options.max_length
        {
            ids.truncate(max_length);
        }

        ids
    }

    fn pad_token_id(&self) -> TokenId {
        STUB_PAD_ID
    }

    fn model_max_length(&self) -> usize {
        self.max_length.unwrap_or(4096)
    }

    fn identity(&self) -> &str {
        "StubTokenizer"
    }
}
