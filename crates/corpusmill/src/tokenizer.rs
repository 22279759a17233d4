//! # Tokenizer Capability
//!
//! Processors consume a tokenizer as an opaque capability: text in, token
//! ids out. Concrete tokenizers live outside this crate; the contract here
//! is the minimum the processors need.

use crate::types::TokenId;

/// Options for a single [`TextTokenizer::encode`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeOptions {
    /// Whether to add the tokenizer's special tokens (BOS etc).
    pub add_special_tokens: bool,

    /// Optional maximum token length; only applied when `truncation` is set.
    pub max_length: Option<usize>,

    /// Whether to truncate to `max_length`.
    pub truncation: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            add_special_tokens: true,
            max_length: None,
            truncation: false,
        }
    }
}

impl EncodeOptions {
    /// Set whether special tokens are added.
    pub fn with_special_tokens(
        mut self,
        add_special_tokens: bool,
    ) -> Self {
        self.add_special_tokens = add_special_tokens;
        self
    }

    /// Set the max length.
    pub fn with_max_length(
        mut self,
        max_length: Option<usize>,
    ) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set whether truncation is applied.
    pub fn with_truncation(
        mut self,
        truncation: bool,
    ) -> Self {
        self.truncation = truncation;
        self
    }
}

/// The tokenizer capability consumed by processors.
///
/// Implementations must honor [`EncodeOptions::truncation`]: when set with
/// a `max_length`, the returned sequence is clipped to at most that length.
pub trait TextTokenizer: Send + Sync {
    /// Encode text into token ids.
    ///
    /// ## Arguments
    /// * `text` - the text to encode.
    /// * `options` - per-call encoding options.
    ///
    /// ## Returns
    /// A vector of token ids.
    fn encode(
        &self,
        text: &str,
        options: &EncodeOptions,
    ) -> Vec<TokenId>;

    /// The id used to pad `input_ids`.
    fn pad_token_id(&self) -> TokenId;

    /// The tokenizer's maximum supported sequence length.
    fn model_max_length(&self) -> usize;

    /// A stable identity string, folded into processor fingerprints.
    fn identity(&self) -> &str;
}
