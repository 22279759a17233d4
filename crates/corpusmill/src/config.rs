//! # Declarative Processor Configuration
//!
//! Processors are driven by a small JSON config file. The top-level key
//! selects the variant: `concat` or `conversation` (`concat` wins when both
//! are somehow present). Parsing is strict: unknown or missing keys fail
//! fast at load time, before any sampling begins.
//!
//! Concat shape:
//!
//! ```json
//! {
//!     "concat": {
//!         "input":  {"trunc_rear": false, "trunc_txt": 96, "train": false},
//!         "output": {"trunc_rear": true,  "trunc_txt": 96, "train": true}
//!     },
//!     "truncation": {
//!         "enable": true,
//!         "max_tokens": 16384,
//!         "order": ["input", "output"]
//!     }
//! }
//! ```
//!
//! Conversation shape:
//!
//! ```json
//! {
//!     "conversation": {
//!         "conv_template": "vicuna_v1.1",
//!         "conv_keyword": "conversations",
//!         "role_keyword": "role",
//!         "cont_keyword": "content",
//!         "roles": {"user": 0, "assistant": 1}
//!     },
//!     "truncation": {"enable": false, "max_tokens": 16384}
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::errors::{CorpusResult, CorpusmillError};
use crate::processor::{ConcatProcessor, ConversationProcessor, Padding, RecordProcessor};
use crate::tokenizer::TextTokenizer;

/// Per-field rule for the concat processor.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldRule {
    /// Keep the front of the text when char-truncating; token pruning then
    /// takes from the rear.
    pub trunc_rear: bool,

    /// Character-truncation budget in units of 1024 chars; `null` disables.
    pub trunc_txt: Option<usize>,

    /// Whether the field's tokens contribute to loss.
    pub train: bool,
}

/// Global token-truncation policy for the concat processor.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConcatTruncation {
    /// Whether truncation is applied.
    pub enable: bool,

    /// The total token budget.
    #[serde(default)]
    pub max_tokens: Option<usize>,

    /// Field eviction order.
    #[serde(default)]
    pub order: Option<Vec<String>>,
}

/// Token-truncation policy for the conversation processor.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationTruncation {
    /// Whether the whole-conversation encode truncates.
    pub enable: bool,

    /// The max token length passed to the tokenizer.
    #[serde(default)]
    pub max_tokens: Option<usize>,
}

/// The `conversation` config section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationSection {
    /// Name of the conversation template family.
    pub conv_template: String,

    /// Record field holding the turn list.
    pub conv_keyword: String,

    /// Turn field holding the role name.
    pub role_keyword: String,

    /// Turn field holding the turn text.
    pub cont_keyword: String,

    /// Record-local role name to canonical template role (0 = instruction
    /// giver, non-trainable; 1 = responder, trainable).
    pub roles: HashMap<String, u8>,
}

/// Typed configuration for [`ConcatProcessor`].
#[derive(Debug, Clone)]
pub struct ConcatConfig {
    /// Field rules, in config-file order.
    pub fields: Vec<(String, FieldRule)>,

    /// Global truncation policy.
    pub truncation: ConcatTruncation,
}

/// Typed configuration for [`ConversationProcessor`].
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// The conversation section.
    pub conversation: ConversationSection,

    /// Truncation policy.
    pub truncation: ConversationTruncation,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConcatFile {
    // serde_json `preserve_order` keeps config-file field order.
    concat: serde_json::Map<String, serde_json::Value>,
    truncation: ConcatTruncation,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConversationFile {
    conversation: ConversationSection,
    truncation: ConversationTruncation,
}

impl ConcatConfig {
    /// Parse and validate a concat config from raw JSON text.
    pub fn from_json(text: &str) -> CorpusResult<Self> {
        let raw: RawConcatFile = serde_json::from_str(text)?;

        let mut fields = Vec::with_capacity(raw.concat.len());
        for (name, value) in raw.concat {
            let rule: FieldRule = serde_json::from_value(value)?;
            fields.push((name, rule));
        }

        if let Some(order) = &raw.truncation.order {
            for name in order {
                if !fields.iter().any(|(field, _)| field == name) {
                    return Err(CorpusmillError::MissingField {
                        field: format!("truncation.order entry `{name}`"),
                    });
                }
            }
        }

        Ok(Self {
            fields,
            truncation: raw.truncation,
        })
    }
}

impl ConversationConfig {
    /// Parse and validate a conversation config from raw JSON text.
    pub fn from_json(text: &str) -> CorpusResult<Self> {
        let raw: RawConversationFile = serde_json::from_str(text)?;

        for (role, id) in &raw.conversation.roles {
            if *id > 1 {
                return Err(CorpusmillError::UnknownRole {
                    role: format!("{role} -> {id}"),
                });
            }
        }

        Ok(Self {
            conversation: raw.conversation,
            truncation: raw.truncation,
        })
    }
}

/// Load a processor from a declarative config file.
///
/// Dispatches on the top-level key; `concat` wins if both are present.
///
/// ## Arguments
/// * `path` - the config file path.
/// * `tokenizer` - the tokenizer capability.
/// * `padding` - the shared padding contract.
///
/// ## Returns
/// A boxed [`RecordProcessor`], or [`CorpusmillError::UnknownConfig`] when
/// neither variant key is present.
pub fn load_processor<P: AsRef<Path>>(
    path: P,
    tokenizer: Arc<dyn TextTokenizer>,
    padding: Padding,
) -> CorpusResult<Arc<dyn RecordProcessor>> {
    let text = fs::read_to_string(path.as_ref())?;
    processor_from_json(&text, tokenizer, padding)
}

/// Build a processor from raw config JSON text.
///
/// See [`load_processor`].
pub fn processor_from_json(
    text: &str,
    tokenizer: Arc<dyn TextTokenizer>,
    padding: Padding,
) -> CorpusResult<Arc<dyn RecordProcessor>> {
    let probe: serde_json::Value = serde_json::from_str(text)?;

    if probe.get("concat").is_some() {
        Ok(Arc::new(ConcatProcessor::from_json(
            text, tokenizer, padding,
        )?))
    } else if probe.get("conversation").is_some() {
        Ok(Arc::new(ConversationProcessor::from_json(
            text, tokenizer, padding,
        )?))
    } else {
        Err(CorpusmillError::UnknownConfig)
    }
}
