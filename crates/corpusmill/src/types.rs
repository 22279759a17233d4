//! # Core Data Types

use serde::{Deserialize, Serialize};

/// Token id type.
///
/// Signed so label sequences can carry [`IGNORE_INDEX`] alongside real ids.
pub type TokenId = i32;

/// Label sentinel marking a position excluded from loss.
pub const IGNORE_INDEX: TokenId = -100;

/// A raw source record: one JSON object per source line.
///
/// Field order is preserved (`serde_json` `preserve_order`); records have
/// no identity beyond their file position.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A processed training instance.
///
/// Invariant: `input_ids`, `labels`, and `attention_mask` always have equal
/// lengths, including after truncation and padding. `labels[i] ==
/// IGNORE_INDEX` marks a position excluded from loss; all other positions
/// are trainable token ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Token ids of the rendered text.
    pub input_ids: Vec<TokenId>,

    /// Loss targets; [`IGNORE_INDEX`] where loss is masked.
    pub labels: Vec<TokenId>,

    /// Attention mask, same length as `input_ids`.
    pub attention_mask: Vec<TokenId>,
}

impl Instance {
    /// The shared sequence length.
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    /// Whether the instance is empty.
    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_serde() {
        let instance = Instance {
            input_ids: vec![5, 6, 7],
            labels: vec![IGNORE_INDEX, 6, 7],
            attention_mask: vec![0, 0, 0],
        };

        let json = serde_json::to_string(&instance).unwrap();
        let back: Instance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, instance);
        assert_eq!(back.len(), 3);
    }
}
