//! Regex alternation matching.

use regex::Regex;

use crate::types::Result;

/// Matches text against an OR-combination of pattern fragments.
///
/// Built from an empty fragment list it matches everything.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Option<Regex>,
}

impl Matcher {
    pub fn is_match(&self, text: &str) -> bool {
        match self.regex {
            Some(ref regex) => regex.is_match(text),
            None => true,
        }
    }

    /// Whether this matcher accepts every input.
    pub fn matches_all(&self) -> bool {
        self.regex.is_none()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.regex.as_ref().map(Regex::as_str)
    }
}

/// Compile `patterns` into a single `(p1|p2|...)` matcher.
///
/// An empty slice yields a matcher that accepts every string.
///
/// ```rust
/// use cmdtee_sdk::util::compile_alternation;
///
/// let matcher = compile_alternation(&["^foo", "bar$"]).unwrap();
/// assert!(matcher.is_match("foobaz"));
/// assert!(!matcher.is_match("bazfoo"));
/// ```
pub fn compile_alternation<S: AsRef<str>>(patterns: &[S]) -> Result<Matcher> {
    if patterns.is_empty() {
        return Ok(Matcher { regex: None });
    }

    let joined = patterns
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<&str>>()
        .join("|");
    let regex = Regex::new(&format!("({})", joined))?;
    Ok(Matcher { regex: Some(regex) })
}

/// Whether `text` matches any of `patterns`; always true for an empty slice.
pub fn matches_any<S: AsRef<str>>(text: &str, patterns: &[S]) -> Result<bool> {
    Ok(compile_alternation(patterns)?.is_match(text))
}
