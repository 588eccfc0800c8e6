//! Shell-style word handling.

use crate::types::{Error, Result};

/// Split a command line into words, honoring shell quoting rules.
///
/// An empty (or whitespace-only) line is rejected, as there is no program to
/// run.
pub fn split_command_line(line: &str) -> Result<Vec<String>> {
    let words =
        shell_words::split(line).map_err(|e| Error::MalformedCommandLine(e.to_string()))?;
    if words.is_empty() {
        return Err(Error::MalformedCommandLine("command line is empty".to_string()));
    }
    Ok(words)
}

/// Join words into a command line, quoting where the shell would need it.
pub fn join_command_line<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    shell_words::join(words)
}

/// Surround `word` with `quote`, adding it only on the sides where it is
/// missing.
///
/// ```rust
/// use cmdtee_sdk::util::quote_if_needed;
///
/// assert_eq!(quote_if_needed("test", '\''), "'test'");
/// assert_eq!(quote_if_needed("'test'", '\''), "'test'");
/// ```
pub fn quote_if_needed(word: &str, quote: char) -> String {
    let mut quoted = String::with_capacity(word.len() + 2 * quote.len_utf8());
    if !word.starts_with(quote) {
        quoted.push(quote);
    }
    quoted.push_str(word);
    // A lone quote char already opened the word; it still needs a closer.
    if !word.ends_with(quote) || quoted.chars().count() == 1 {
        quoted.push(quote);
    }
    quoted
}
