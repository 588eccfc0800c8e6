//! Stateless helpers used around command execution.

mod encoding;
mod glob;
mod matcher;
mod path;
mod words;

pub use encoding::encoding_for_label;
pub use glob::expand_globs;
pub use matcher::{Matcher, compile_alternation, matches_any};
pub use path::{base_name_without_extension, resolve_executable_path, resolve_executable_path_in};
pub use words::{join_command_line, quote_if_needed, split_command_line};
