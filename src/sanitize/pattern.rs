use std::fmt;

use regex::{Captures, Regex};

use crate::sanitize::ConfigError;

/// A regular expression that has to match the whole input.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `pattern`, anchored at both ends.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(&format!(r"^(?:{})\z", pattern)).map_err(|source| {
            ConfigError::Regex {
                pattern: pattern.to_owned(),
                source,
            }
        })?;

        Ok(Pattern {
            source: pattern.to_owned(),
            regex,
        })
    }

    /// The pattern as given, without the anchors.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.regex.captures(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

/// A key or URL predicate: a [`Pattern`], or one of the two trivial ones.
#[derive(Debug, Clone, Default)]
pub enum Matcher {
    Everything,
    #[default]
    Nothing,
    Pattern(Pattern),
}

impl Matcher {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Pattern::new(pattern).map(Matcher::Pattern)
    }

    /// Match any of `alternatives`; matches nothing when there are none.
    pub fn any_of<S: AsRef<str>>(alternatives: &[S]) -> Result<Self, ConfigError> {
        if alternatives.is_empty() {
            return Ok(Matcher::Nothing);
        }
        let joined = alternatives
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("|");
        Matcher::new(&joined)
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Everything => true,
            Matcher::Nothing => false,
            Matcher::Pattern(pattern) => pattern.is_match(text),
        }
    }
}
