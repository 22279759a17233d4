//! # Shared Padding Contract

use crate::errors::{CorpusResult, CorpusmillError};
use crate::types::{IGNORE_INDEX, Instance, TokenId};

/// Which side of the sequence padding is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadSide {
    /// Pad at the front of the sequence.
    #[default]
    Left,

    /// Pad at the end of the sequence.
    Right,
}

impl PadSide {
    /// Stable lowercase name, used in fingerprints.
    pub fn as_str(&self) -> &'static str {
        match self {
            PadSide::Left => "left",
            PadSide::Right => "right",
        }
    }
}

/// The shared padding contract applied by every processor.
///
/// When `length` is set, instances are padded to exactly that length:
/// `input_ids` with the tokenizer's pad token, `labels` with
/// [`IGNORE_INDEX`], and `attention_mask` with `1`.
///
/// The attention-mask pad value of `1` (with `0` for real content) inverts
/// the usual convention; downstream consumers expect exactly this encoding
/// and compensate for it. See the padding tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    /// The side padding is applied to.
    pub side: PadSide,

    /// Target length; `None` leaves instances unpadded.
    pub length: Option<usize>,
}

impl Padding {
    /// Set the pad side.
    pub fn with_side(
        mut self,
        side: PadSide,
    ) -> Self {
        self.side = side;
        self
    }

    /// Set the target length.
    pub fn with_length(
        mut self,
        length: Option<usize>,
    ) -> Self {
        self.length = length;
        self
    }

    /// Pad an instance to the configured length.
    ///
    /// ## Arguments
    /// * `pad_token_id` - the tokenizer's pad token id.
    /// * `instance` - the instance to pad.
    ///
    /// ## Returns
    /// The padded instance; [`CorpusmillError::PadOverflow`] when the
    /// sequence already exceeds the target (a truncation-policy bug
    /// upstream, never silently clipped).
    pub fn pad(
        &self,
        pad_token_id: TokenId,
        mut instance: Instance,
    ) -> CorpusResult<Instance> {
        let Some(target) = self.length else {
            return Ok(instance);
        };

        let length = instance.len();
        if length > target {
            return Err(CorpusmillError::PadOverflow { length, target });
        }
        let remain = target - length;

        match self.side {
            PadSide::Left => {
                instance.input_ids.splice(0..0, std::iter::repeat_n(pad_token_id, remain));
                instance.labels.splice(0..0, std::iter::repeat_n(IGNORE_INDEX, remain));
                instance.attention_mask.splice(0..0, std::iter::repeat_n(1, remain));
            }
            PadSide::Right => {
                instance.input_ids.extend(std::iter::repeat_n(pad_token_id, remain));
                instance.labels.extend(std::iter::repeat_n(IGNORE_INDEX, remain));
                instance.attention_mask.extend(std::iter::repeat_n(1, remain));
            }
        }

        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(n: usize) -> Instance {
        Instance {
            input_ids: (0..n as TokenId).collect(),
            labels: (0..n as TokenId).collect(),
            attention_mask: vec![0; n],
        }
    }

    #[test]
    fn test_pad_left() {
        let padding = Padding::default().with_length(Some(5));
        let padded = padding.pad(9, triple(3)).unwrap();

        assert_eq!(padded.input_ids, vec![9, 9, 0, 1, 2]);
        assert_eq!(padded.labels, vec![IGNORE_INDEX, IGNORE_INDEX, 0, 1, 2]);
        // Pad positions get mask 1, content keeps 0; asserted on purpose.
        assert_eq!(padded.attention_mask, vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_pad_right() {
        let padding = Padding::default()
            .with_side(PadSide::Right)
            .with_length(Some(4));
        let padded = padding.pad(9, triple(2)).unwrap();

        assert_eq!(padded.input_ids, vec![0, 1, 9, 9]);
        assert_eq!(padded.labels, vec![0, 1, IGNORE_INDEX, IGNORE_INDEX]);
        assert_eq!(padded.attention_mask, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_pad_overflow() {
        let padding = Padding::default().with_length(Some(2));
        let err = padding.pad(9, triple(3)).unwrap_err();
        assert!(matches!(
            err,
            CorpusmillError::PadOverflow {
                length: 3,
                target: 2,
            },
        ));
    }

    #[test]
    fn test_no_target_is_identity() {
        let padding = Padding::default();
        let instance = triple(3);
        assert_eq!(padding.pad(9, instance.clone()).unwrap(), instance);
    }
}
