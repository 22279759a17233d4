//! # Conversation Processor
//!
//! Renders a multi-turn dialogue through a [`template`](super::template)
//! and masks loss so only the responder role's tokens (and the trailing
//! turn terminator) train. Byte-offset text splits are aligned with
//! token-offset boundaries by re-tokenizing each turn and its instruction
//! prefix.

use std::sync::Arc;

use crate::config::ConversationConfig;
use crate::errors::{CorpusResult, CorpusmillError};
use crate::processor::template::{ConvTemplate, get_conv_template};
use crate::processor::{Padding, RecordProcessor, processor_fingerprint};
use crate::tokenizer::{EncodeOptions, TextTokenizer};
use crate::types::{IGNORE_INDEX, Instance, Record, TokenId};

/// Fixed correction subtracted from instruction-prefix token lengths.
///
/// Empirically tuned for the Llama tokenizer's special-token accounting;
/// not derivable generally, and known fragile across tokenizers.
const INSTRUCTION_OFFSET: usize = 2;

/// Turns a record's turn list into a templated, loss-masked instance.
pub struct ConversationProcessor {
    config: ConversationConfig,
    template: &'static ConvTemplate,
    tokenizer: Arc<dyn TextTokenizer>,
    padding: Padding,
    fingerprint: String,
}

impl ConversationProcessor {
    /// Build from raw config JSON text.
    pub fn from_json(
        config_text: &str,
        tokenizer: Arc<dyn TextTokenizer>,
        padding: Padding,
    ) -> CorpusResult<Self> {
        let config = ConversationConfig::from_json(config_text)?;
        let template = get_conv_template(&config.conversation.conv_template)?;
        let fingerprint = processor_fingerprint(config_text, tokenizer.as_ref(), &padding);

        Ok(Self {
            config,
            template,
            tokenizer,
            padding,
            fingerprint,
        })
    }

    /// The typed configuration.
    pub fn config(&self) -> &ConversationConfig {
        &self.config
    }

    /// Extract `(canonical_role, content)` turns from a record.
    fn extract_turns<'a>(
        &self,
        record: &'a Record,
    ) -> CorpusResult<Vec<(usize, &'a str)>> {
        let section = &self.config.conversation;

        let turns = record
            .get(&section.conv_keyword)
            .ok_or_else(|| CorpusmillError::MissingField {
                field: section.conv_keyword.clone(),
            })?
            .as_array()
            .ok_or(CorpusmillError::FieldType {
                field: section.conv_keyword.clone(),
                expected: "array",
            })?;

        let mut messages = Vec::with_capacity(turns.len());
        for turn in turns {
            let role_name = turn
                .get(&section.role_keyword)
                .and_then(|v| v.as_str())
                .ok_or(CorpusmillError::FieldType {
                    field: section.role_keyword.clone(),
                    expected: "string",
                })?;
            let content = turn
                .get(&section.cont_keyword)
                .and_then(|v| v.as_str())
                .ok_or(CorpusmillError::FieldType {
                    field: section.cont_keyword.clone(),
                    expected: "string",
                })?;

            let role = *section
                .roles
                .get(role_name)
                .ok_or_else(|| CorpusmillError::UnknownRole {
                    role: role_name.to_string(),
                })? as usize;

            messages.push((role, content));
        }

        // Some datasets emit a leading system/context turn; drop it when it
        // does not hold the instruction role.
        if messages.first().is_some_and(|(role, _)| *role != 0) {
            messages.remove(0);
        }

        for (index, (role, _)) in messages.iter().enumerate() {
            if *role != index % 2 {
                return Err(CorpusmillError::RoleAlternation { index });
            }
        }

        Ok(messages)
    }

    /// Mask instruction spans in `target`, walking rendered turns.
    fn mask_instructions(
        &self,
        conversation: &str,
        target: &mut [TokenId],
    ) {
        let total_len = target.len();
        let prefix = self.template.responder_prefix();

        let mut cur_len = 1;
        for label in target.iter_mut().take(cur_len.min(total_len)) {
            *label = IGNORE_INDEX;
        }

        for turn in conversation.split(self.template.sep2) {
            if turn.is_empty() {
                break;
            }
            let turn_len = self
                .tokenizer
                .encode(turn, &EncodeOptions::default())
                .len();

            let parts: Vec<&str> = turn.split(prefix.as_str()).collect();
            if parts.len() != 2 {
                // Malformed or final unterminated turn.
                break;
            }

            let instruction = format!("{}{}", parts[0], prefix);
            let instruction_len = self
                .tokenizer
                .encode(&instruction, &EncodeOptions::default())
                .len()
                .saturating_sub(INSTRUCTION_OFFSET);

            let start = cur_len.min(total_len);
            let end = (cur_len + instruction_len).min(total_len);
            for label in &mut target[start..end] {
                *label = IGNORE_INDEX;
            }

            cur_len += turn_len;
        }

        for label in &mut target[cur_len.min(total_len)..] {
            *label = IGNORE_INDEX;
        }

        // Turn-boundary tokenization must agree with the whole-string
        // tokenization; when it does not (and truncation did not
        // intervene), train on nothing rather than on misaligned labels.
        if cur_len < self.tokenizer.model_max_length() && cur_len != total_len {
            log::warn!(
                "tokenization mismatch: {cur_len} vs. {total_len}. \
                 #turn = {}. (ignored)",
                conversation.split(self.template.sep2).count() - 1,
            );
            for label in target.iter_mut() {
                *label = IGNORE_INDEX;
            }
        }
    }
}

impl RecordProcessor for ConversationProcessor {
    fn process(
        &self,
        record: &Record,
    ) -> CorpusResult<Option<Instance>> {
        let messages = self.extract_turns(record)?;
        let conversation = self.template.render(&messages);

        let truncation = &self.config.truncation;
        let input_ids = self.tokenizer.encode(
            &conversation,
            &EncodeOptions::default()
                .with_max_length(truncation.max_tokens)
                .with_truncation(truncation.enable),
        );

        let mut labels = input_ids.clone();
        self.mask_instructions(&conversation, &mut labels);

        let attention_mask = vec![0; input_ids.len()];

        let instance = self.padding.pad(
            self.tokenizer.pad_token_id(),
            Instance {
                input_ids,
                labels,
                attention_mask,
            },
        )?;

        Ok(Some(instance))
    }

    fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::template::VICUNA_V1_1;
    use crate::testing::{STUB_EOS_ID, StubTokenizer};

    const CONFIG: &str = r#"{
        "conversation": {
            "conv_template": "vicuna_v1.1",
            "conv_keyword": "conversations",
            "role_keyword": "role",
            "cont_keyword": "content",
            "roles": {"user": 0, "assistant": 1}
        },
        "truncation": {"enable": false, "max_tokens": null}
    }"#;

    fn processor() -> (Arc<StubTokenizer>, ConversationProcessor) {
        let tokenizer = Arc::new(StubTokenizer::new());
        let processor =
            ConversationProcessor::from_json(CONFIG, tokenizer.clone(), Padding::default())
                .unwrap();
        (tokenizer, processor)
    }

    fn conversation_record(turns: &[(&str, &str)]) -> Record {
        let turns: Vec<serde_json::Value> = turns
            .iter()
            .map(|(role, content)| serde_json::json!({"role": role, "content": content}))
            .collect();
        let mut record = Record::new();
        record.insert("conversations".to_string(), serde_json::Value::Array(turns));
        record
    }

    #[test]
    fn test_two_turn_masking() {
        let (_, processor) = processor();

        let record = conversation_record(&[("user", "Hi"), ("assistant", "Hello")]);
        let instance = processor.process(&record).unwrap().unwrap();

        // The stub maps char c of the rendered string to token index 1+c.
        let rendered = VICUNA_V1_1.render(&[(0, "Hi"), (1, "Hello")]);
        let response_char = rendered.find("Hello").unwrap();

        assert_eq!(instance.len(), rendered.len() - "</s>".len() + 2);

        // BOS masked.
        assert_eq!(instance.labels[0], IGNORE_INDEX);

        // Everything through " ASSISTANT:" masked; the final prefix space
        // (token index `response_char`) carries the documented offset slack.
        for i in 1..response_char {
            assert_eq!(instance.labels[i], IGNORE_INDEX, "position {i}");
        }

        // Responder tokens and the trailing turn terminator train.
        for i in (response_char + 1)..instance.len() {
            assert_eq!(instance.labels[i], instance.input_ids[i], "position {i}");
        }
        assert_eq!(*instance.input_ids.last().unwrap(), STUB_EOS_ID);
        assert_ne!(*instance.labels.last().unwrap(), IGNORE_INDEX);
    }

    #[test]
    fn test_multi_turn_masking_is_consistent() {
        let (_, processor) = processor();

        let record = conversation_record(&[
            ("user", "Hi"),
            ("assistant", "Hello"),
            ("user", "Again"),
            ("assistant", "Sure"),
        ]);
        let instance = processor.process(&record).unwrap().unwrap();

        // A consistency failure would mask every label; the responder turns
        // must survive.
        assert!(instance.labels.iter().any(|&l| l != IGNORE_INDEX));
    }

    #[test]
    fn test_alternation_violation() {
        let (_, processor) = processor();

        let record = conversation_record(&[("user", "Hi"), ("user", "Hi again")]);
        let err = processor.process(&record).unwrap_err();
        assert!(matches!(err, CorpusmillError::RoleAlternation { index: 1 }));
    }

    #[test]
    fn test_leading_responder_turn_dropped() {
        let (_, processor) = processor();

        let record = conversation_record(&[
            ("assistant", "Context preamble"),
            ("user", "Hi"),
            ("assistant", "Hello"),
        ]);
        let instance = processor.process(&record).unwrap().unwrap();

        // Dropped turn leaves a well-formed two-turn conversation.
        assert!(instance.labels.iter().any(|&l| l != IGNORE_INDEX));
    }

    #[test]
    fn test_unknown_role() {
        let (_, processor) = processor();

        let record = conversation_record(&[("narrator", "Hi")]);
        let err = processor.process(&record).unwrap_err();
        assert!(matches!(err, CorpusmillError::UnknownRole { .. }));
    }

    #[test]
    fn test_offset_mismatch_masks_all_labels() {
        let (_, processor) = processor();

        // An embedded turn terminator de-syncs the turn split from the
        // whole-string tokenization; the instance is kept but trains on
        // nothing.
        let record = conversation_record(&[("user", "a</s>b"), ("assistant", "ok")]);
        let instance = processor.process(&record).unwrap().unwrap();

        assert!(!instance.is_empty());
        assert!(instance.labels.iter().all(|&l| l == IGNORE_INDEX));
    }

    #[test]
    fn test_missing_turn_list() {
        let (_, processor) = processor();

        let err = processor.process(&Record::new()).unwrap_err();
        assert!(matches!(err, CorpusmillError::MissingField { .. }));
    }
}
