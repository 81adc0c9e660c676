use serde::{Deserialize, Serialize};

pub const DEFAULT_PAD: &str = "<pad>";
pub const DEFAULT_UNK: &str = "<unk>";

/// Controls how the vocabulary of one field is built.
///
/// Unset keys take their defaults when deserialized, so `{"min_count": 2}` is a
/// complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabOptions {
    /// Tokens occurring fewer times than this are left out. Defaults to 2, so tokens
    /// seen only once fall back to the unknown token.
    pub min_count: usize,
    /// Padding token, placed at index 0. Only added to fields that hold sequences.
    pub pad: Option<String>,
    /// Unknown token, placed right after the padding token (if any).
    pub unk: Option<String>,
    /// Maximum number of tokens, not counting `pad` and `unk`.
    pub max_size: Option<usize>,
}

impl Default for VocabOptions {
    fn default() -> Self {
        VocabOptions {
            min_count: 2,
            pad: Some(DEFAULT_PAD.to_string()),
            unk: Some(DEFAULT_UNK.to_string()),
            max_size: None,
        }
    }
}

impl VocabOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn pad(mut self, token: impl Into<String>) -> Self {
        self.pad = Some(token.into());
        self
    }

    pub fn no_pad(mut self) -> Self {
        self.pad = None;
        self
    }

    pub fn unk(mut self, token: impl Into<String>) -> Self {
        self.unk = Some(token.into());
        self
    }

    pub fn no_unk(mut self) -> Self {
        self.unk = None;
        self
    }
}
