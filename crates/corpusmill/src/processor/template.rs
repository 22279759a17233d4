//! # Conversation Templates
//!
//! A template family renders a two-role alternating dialogue into one
//! prompt string: a fixed system preamble, then `ROLE: content` turns
//! joined by a pair of separators. The primary separator follows role-0
//! turns; the terminator (`sep2`) follows role-1 turns and doubles as the
//! turn boundary during loss masking.

use crate::errors::{CorpusResult, CorpusmillError};

/// A two-role colon-style conversation template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvTemplate {
    /// Registry name.
    pub name: &'static str,

    /// System preamble, emitted before the first turn.
    pub system: &'static str,

    /// Canonical role names; index 0 gives instructions, index 1 responds.
    pub roles: [&'static str; 2],

    /// Separator appended after the system preamble and each role-0 turn.
    pub sep: &'static str,

    /// Turn terminator appended after each role-1 turn.
    pub sep2: &'static str,
}

impl ConvTemplate {
    /// Render messages into a single prompt string.
    ///
    /// ## Arguments
    /// * `messages` - `(canonical_role_index, content)` pairs, strictly
    ///   alternating 0,1,0,1...
    pub fn render(
        &self,
        messages: &[(usize, &str)],
    ) -> String {
        let mut out = String::with_capacity(
            self.system.len() + messages.iter().map(|(_, m)| m.len() + 16).sum::<usize>(),
        );
        out.push_str(self.system);
        out.push_str(self.sep);

        for (i, (role, content)) in messages.iter().enumerate() {
            out.push_str(self.roles[*role]);
            out.push_str(": ");
            out.push_str(content);
            out.push_str(if i % 2 == 0 { self.sep } else { self.sep2 });
        }
        out
    }

    /// The search key for the responder turn prefix: `sep + roles[1] + ": "`.
    pub fn responder_prefix(&self) -> String {
        format!("{}{}: ", self.sep, self.roles[1])
    }
}

/// Vicuna v1.1 prompt format.
pub const VICUNA_V1_1: ConvTemplate = ConvTemplate {
    name: "vicuna_v1.1",
    system: "A chat between a curious user and an artificial intelligence assistant. \
             The assistant gives helpful, detailed, and polite answers to the user's questions.",
    roles: ["USER", "ASSISTANT"],
    sep: " ",
    sep2: "</s>",
};

const REGISTRY: &[&ConvTemplate] = &[&VICUNA_V1_1];

/// Look up a template by registry name.
pub fn get_conv_template(name: &str) -> CorpusResult<&'static ConvTemplate> {
    REGISTRY
        .iter()
        .find(|template| template.name == name)
        .copied()
        .ok_or_else(|| CorpusmillError::UnknownTemplate {
            name: name.to_string(),
        })
}
