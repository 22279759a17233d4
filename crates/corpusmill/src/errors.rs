//! # Error Types

/// Errors from corpusmill operations.
#[derive(Debug, thiserror::Error)]
pub enum CorpusmillError {
    /// A configured field is absent from a source record.
    #[error("record is missing configured field `{field}`")]
    MissingField {
        /// The missing field name.
        field: String,
    },

    /// Padding was requested for a sequence already longer than the target.
    ///
    /// Indicates a truncation-policy bug upstream; never silently truncated.
    #[error("sequence length ({length}) exceeds pad target ({target})")]
    PadOverflow {
        /// The sequence length.
        length: usize,
        /// The configured pad target.
        target: usize,
    },

    /// Conversation turns violate strict 0,1,0,1 role alternation.
    #[error("conversation turn {index} violates role alternation")]
    RoleAlternation {
        /// The offending turn index.
        index: usize,
    },

    /// A record role name is absent from the configured role map.
    #[error("unknown conversation role `{role}`")]
    UnknownRole {
        /// The unmapped role name.
        role: String,
    },

    /// No conversation template is registered under the requested name.
    #[error("unknown conversation template `{name}`")]
    UnknownTemplate {
        /// The requested template name.
        name: String,
    },

    /// The processor config file has neither a `concat` nor a
    /// `conversation` top-level key.
    #[error("processor config declares neither `concat` nor `conversation`")]
    UnknownConfig,

    /// A record field has the wrong JSON shape for its processor.
    #[error("field `{field}` is not a {expected}")]
    FieldType {
        /// The field name.
        field: String,
        /// The expected JSON shape.
        expected: &'static str,
    },

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error from the disk cache layer.
    #[error(transparent)]
    Cache(#[from] anyhow::Error),
}

/// Result type for corpusmill operations.
pub type CorpusResult<T> = core::result::Result<T, CorpusmillError>;
