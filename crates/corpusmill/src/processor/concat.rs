//! # Field Concatenation Processor

use std::sync::Arc;

use crate::config::ConcatConfig;
use crate::errors::{CorpusResult, CorpusmillError};
use crate::processor::{Padding, RecordProcessor, processor_fingerprint};
use crate::tokenizer::{EncodeOptions, TextTokenizer};
use crate::types::{IGNORE_INDEX, Instance, Record, TokenId};

struct FieldTokens {
    input_ids: Vec<TokenId>,
    labels: Vec<TokenId>,
    trunc_rear: bool,
}

/// Concatenates configured record fields into one token sequence.
///
/// Fields are tokenized in config order; non-trainable fields have their
/// labels masked with [`IGNORE_INDEX`]. Two truncation layers apply:
/// per-field character truncation before tokenization, and a global token
/// budget enforced afterwards by evicting tokens field-by-field in the
/// configured order.
pub struct ConcatProcessor {
    config: ConcatConfig,
    tokenizer: Arc<dyn TextTokenizer>,
    padding: Padding,
    fingerprint: String,
}

impl ConcatProcessor {
    /// Build from raw config JSON text.
    pub fn from_json(
        config_text: &str,
        tokenizer: Arc<dyn TextTokenizer>,
        padding: Padding,
    ) -> CorpusResult<Self> {
        let config = ConcatConfig::from_json(config_text)?;
        let fingerprint = processor_fingerprint(config_text, tokenizer.as_ref(), &padding);

        Ok(Self {
            config,
            tokenizer,
            padding,
            fingerprint,
        })
    }

    /// The typed configuration.
    pub fn config(&self) -> &ConcatConfig {
        &self.config
    }

    fn tokenize_field(
        &self,
        name: &str,
        rule: &crate::config::FieldRule,
        record: &Record,
    ) -> CorpusResult<FieldTokens> {
        let value = record.get(name).ok_or_else(|| CorpusmillError::MissingField {
            field: name.to_string(),
        })?;
        let text = value.as_str().ok_or(CorpusmillError::FieldType {
            field: name.to_string(),
            expected: "string",
        })?;

        // Character-level truncation first; budget is in KiB of chars.
        let text = match rule.trunc_txt {
            Some(budget) => {
                let budget = budget * 1024;
                if rule.trunc_rear {
                    take_prefix_chars(text, budget)
                } else {
                    take_suffix_chars(text, budget)
                }
            }
            None => text,
        };

        let input_ids = self.tokenizer.encode(
            text,
            &EncodeOptions::default().with_special_tokens(false),
        );
        let labels = if rule.train {
            input_ids.clone()
        } else {
            vec![IGNORE_INDEX; input_ids.len()]
        };

        Ok(FieldTokens {
            input_ids,
            labels,
            trunc_rear: rule.trunc_rear,
        })
    }

    fn evict_excess(
        &self,
        pieces: &mut [(String, FieldTokens)],
        num_tokens: usize,
    ) {
        let truncation = &self.config.truncation;
        let Some(max_tokens) = truncation.max_tokens else {
            return;
        };
        if num_tokens <= max_tokens {
            return;
        }
        let mut exceed = num_tokens - max_tokens;

        let order: Vec<String> = match &truncation.order {
            Some(order) => order.clone(),
            None => pieces.iter().map(|(name, _)| name.clone()).collect(),
        };

        for name in order {
            let piece = &mut pieces
                .iter_mut()
                .find(|(field, _)| *field == name)
                .expect("order entries validated at config load")
                .1;

            let length = piece.input_ids.len();
            let num_prune = length.min(exceed);
            let num_remain = length - num_prune;

            if piece.trunc_rear {
                // Text retention kept the front; prune from the rear.
                piece.input_ids.truncate(num_remain);
                piece.labels.truncate(num_remain);
            } else {
                piece.input_ids.drain(..num_prune);
                piece.labels.drain(..num_prune);
            }

            exceed -= num_prune;
            if exceed == 0 {
                break;
            }
        }
    }
}

impl RecordProcessor for ConcatProcessor {
    fn process(
        &self,
        record: &Record,
    ) -> CorpusResult<Option<Instance>> {
        let mut pieces = Vec::with_capacity(self.config.fields.len());
        let mut num_tokens = 0;

        for (name, rule) in &self.config.fields {
            let tokens = self.tokenize_field(name, rule, record)?;
            num_tokens += tokens.input_ids.len();
            pieces.push((name.clone(), tokens));
        }

        if self.config.truncation.enable {
            self.evict_excess(&mut pieces, num_tokens);
        }

        let mut input_ids = Vec::new();
        let mut labels = Vec::new();
        for (_, piece) in pieces {
            input_ids.extend(piece.input_ids);
            labels.extend(piece.labels);
        }
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

/// Keep the first `n` chars of `text`.
fn take_prefix_chars(
    text: &str,
    n: usize,
) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Keep the last `n` chars of `text`.
fn take_suffix_chars(
    text: &str,
    n: usize,
) -> &str {
    let count = text.chars().count();
    if count <= n {
        return text;
    }
    match text.char_indices().nth(count - n) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::PadSide;
    use crate::testing::StubTokenizer;

    fn record(entries: &[(&str, &str)]) -> Record {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect()
    }

    fn processor(
        config: &str,
        padding: Padding,
    ) -> (Arc<StubTokenizer>, ConcatProcessor) {
        let tokenizer = Arc::new(StubTokenizer::new());
        let processor =
            ConcatProcessor::from_json(config, tokenizer.clone(), padding).unwrap();
        (tokenizer, processor)
    }

    const PLAIN: &str = r#"{
        "concat": {
            "input":  {"trunc_rear": false, "trunc_txt": null, "train": false},
            "output": {"trunc_rear": true,  "trunc_txt": null, "train": true}
        },
        "truncation": {"enable": false, "max_tokens": null, "order": null}
    }"#;

    #[test]
    fn test_concat_labels_and_lengths() {
        let (_, processor) = processor(PLAIN, Padding::default());

        let instance = processor
            .process(&record(&[("input", "abc"), ("output", "de")]))
            .unwrap()
            .unwrap();

        assert_eq!(instance.len(), 5);
        assert_eq!(instance.labels[..3], [IGNORE_INDEX; 3]);
        assert_eq!(instance.labels[3..], instance.input_ids[3..]);
        assert_eq!(instance.attention_mask, vec![0; 5]);
    }

    #[test]
    fn test_missing_field() {
        let (_, processor) = processor(PLAIN, Padding::default());

        let err = processor
            .process(&record(&[("input", "abc")]))
            .unwrap_err();
        assert!(matches!(err, CorpusmillError::MissingField { .. }));
    }

    #[test]
    fn test_non_string_field() {
        let (_, processor) = processor(PLAIN, Padding::default());

        let mut rec = record(&[("input", "abc")]);
        rec.insert("output".to_string(), serde_json::json!(17));
        let err = processor.process(&rec).unwrap_err();
        assert!(matches!(err, CorpusmillError::FieldType { .. }));
    }

    #[test]
    fn test_truncation_budget() {
        let config = r#"{
            "concat": {
                "a": {"trunc_rear": true,  "trunc_txt": null, "train": false},
                "b": {"trunc_rear": false, "trunc_txt": null, "train": true}
            },
            "truncation": {"enable": true, "max_tokens": 8, "order": ["a", "b"]}
        }"#;
        let (_, processor) = processor(config, Padding::default());

        let instance = processor
            .process(&record(&[
                ("a", "0123456789"),
                ("b", "0123456789"),
            ]))
            .unwrap()
            .unwrap();

        assert_eq!(instance.len(), 8);
    }

    #[test]
    fn test_eviction_order_touches_first_field_only() {
        let config = r#"{
            "concat": {
                "a": {"trunc_rear": true,  "trunc_txt": null, "train": false},
                "b": {"trunc_rear": false, "trunc_txt": null, "train": false},
                "c": {"trunc_rear": false, "trunc_txt": null, "train": true}
            },
            "truncation": {"enable": true, "max_tokens": 12, "order": ["a", "b", "c"]}
        }"#;
        let (tokenizer, processor) = processor(config, Padding::default());

        // 5 + 5 + 5 = 15 tokens; excess of 3 < len(a), so only `a` shrinks.
        let instance = processor
            .process(&record(&[("a", "aaaaa"), ("b", "bbbbb"), ("c", "ccccc")]))
            .unwrap()
            .unwrap();

        assert_eq!(instance.len(), 12);

        let b_ids = tokenizer.encode(
            "bbbbb",
            &crate::tokenizer::EncodeOptions::default().with_special_tokens(false),
        );
        let c_ids = tokenizer.encode(
            "ccccc",
            &crate::tokenizer::EncodeOptions::default().with_special_tokens(false),
        );
        assert_eq!(&instance.input_ids[2..7], b_ids.as_slice());
        assert_eq!(&instance.input_ids[7..], c_ids.as_slice());
    }

    #[test]
    fn test_eviction_empties_field_and_continues() {
        let config = r#"{
            "concat": {
                "a": {"trunc_rear": true,  "trunc_txt": null, "train": false},
                "b": {"trunc_rear": true,  "trunc_txt": null, "train": true}
            },
            "truncation": {"enable": true, "max_tokens": 3, "order": ["a", "b"]}
        }"#;
        let (_, processor) = processor(config, Padding::default());

        // 4 + 5 = 9; excess 6 empties `a` (4) then prunes 2 from `b`.
        let instance = processor
            .process(&record(&[("a", "aaaa"), ("b", "bbbbb")]))
            .unwrap()
            .unwrap();

        assert_eq!(instance.len(), 3);
        assert_eq!(instance.labels, instance.input_ids);
    }

    #[test]
    fn test_char_truncation_sides() {
        assert_eq!(take_prefix_chars("abcdef", 3), "abc");
        assert_eq!(take_prefix_chars("ab", 3), "ab");
        assert_eq!(take_suffix_chars("abcdef", 3), "def");
        assert_eq!(take_suffix_chars("ab", 3), "ab");
    }

    #[test]
    fn test_padding_invariant() {
        let (_, processor) = processor(
            PLAIN,
            Padding::default().with_side(PadSide::Left).with_length(Some(32)),
        );

        let instance = processor
            .process(&record(&[("input", "abc"), ("output", "de")]))
            .unwrap()
            .unwrap();

        assert_eq!(instance.input_ids.len(), 32);
        assert_eq!(instance.labels.len(), 32);
        assert_eq!(instance.attention_mask.len(), 32);
    }
}
