//! Glob patterns for names
//!
//! Supported syntax:
//! - `*`  any run of characters within one namespace segment
//! - `**` any run of characters, crossing namespace separators
//! - `?`  exactly one character
//! - `|`  alternation between whole patterns
//!
//! Patterns are anchored and case-sensitive: `public|Public` matches exactly
//! `public` or `Public`.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// A compiled name pattern
#[derive(Clone)]
pub struct GlobPattern {
    source: String,
    regex: Arc<Regex>,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&Self::to_regex(pattern)).map_err(|e| {
            Error::ConstructionError(format!("invalid name pattern `{pattern}`: {e}"))
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex: Arc::new(regex),
        })
    }

    /// Translate a glob into an anchored regular expression
    pub fn to_regex(pattern: &str) -> String {
        let mut regex = String::with_capacity(pattern.len() * 2 + 8);
        regex.push_str("^(?:");
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '*' if chars.peek() == Some(&'*') => {
                    chars.next();
                    regex.push_str(".*");
                }
                '*' => regex.push_str(r"[^\\]*"),
                '?' => regex.push('.'),
                '|' => regex.push('|'),
                other => regex.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        regex.push_str(")$");
        regex
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern contains no wildcard or alternation
    pub fn is_literal(&self) -> bool {
        is_literal(&self.source)
    }
}

pub(crate) fn is_literal(pattern: &str) -> bool {
    !pattern.contains(['*', '?', '|'])
}

impl fmt::Debug for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobPattern({:?})", self.source)
    }
}

impl PartialEq for GlobPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}
