//! Decoder configuration

use crate::consts;

/// Knobs for decoding. Encoding has no configuration: it always emits
/// the canonical form.
///
/// ```
/// use bare_core::Config;
///
/// let config = Config::default()
///     .with_strict_varints(false)
///     .with_max_length(1 << 20);
/// assert!(!config.strict_varints);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Reject varints with redundant continuation bytes.
    pub strict_varints: bool,

    /// Upper bound on any decoded length or element count.
    pub max_length: usize,

    /// Accept input that continues past the root value.
    pub allow_trailing_bytes: bool,

    /// Nesting limit of the serde deserializer.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict_varints: true,
            max_length: usize::MAX,
            allow_trailing_bytes: false,
            max_depth: consts::DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    pub fn with_strict_varints(mut self, strict: bool) -> Self {
        self.strict_varints = strict;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_trailing_bytes(mut self, allow: bool) -> Self {
        self.allow_trailing_bytes = allow;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
