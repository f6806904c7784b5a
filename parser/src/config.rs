//! Parser configuration.
//!
//! [`ParserOptions`] is consumed by the scanner and aggregator. It is plain
//! serde data so a host application can embed it in its own settings.
//!
//! # Example (JSON)
//!
//! ```json
//! {
//!   "short_prefixes": ["-"],
//!   "long_prefixes": ["--"],
//!   "option_breaks": ["--"],
//!   "help_tokens": ["-h", "--help"],
//!   "value_splitters": ["="],
//!   "short_case": "sensitive",
//!   "long_case": "insensitive",
//!   "unknown_options_as_values": false,
//!   "argument_run_end": "any_option"
//! }
//! ```

use serde::{Deserialize, Serialize};
use verb_dispatch_core::CaseMode;

/// Which tokens end a run of optional option arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentRunEnd {
    /// Any option-shaped token ends the run (the default).
    #[default]
    AnyOption,
    /// Only options the arity lookup recognizes end the run; other
    /// option-shaped tokens are taken as arguments.
    RecognizedOptions,
}

/// Lexical conventions for scanning an argument vector.
///
/// # Examples
///
/// ```
/// use verb_dispatch_parser::ParserOptions;
///
/// let options = ParserOptions::default();
/// assert!(options.is_help("--help"));
/// assert!(options.is_break("--"));
/// assert_eq!(options.long_prefix_of("--verbose"), Some("--"));
/// assert_eq!(options.short_prefix_of("-v"), Some("-"));
///
/// let windows = ParserOptions::windows();
/// assert_eq!(windows.long_prefix_of("/verbose"), Some("/"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Prefixes introducing short options (`-v`).
    pub short_prefixes: Vec<String>,
    /// Prefixes introducing long options (`--verbose`).
    pub long_prefixes: Vec<String>,
    /// Tokens after which everything is positional.
    pub option_breaks: Vec<String>,
    /// Tokens that request help and stop scanning.
    pub help_tokens: Vec<String>,
    /// Characters separating an inline value from its option name.
    pub value_splitters: Vec<char>,
    /// Case mode of the short-option map.
    pub short_case: CaseMode,
    /// Case mode of the long-option map.
    pub long_case: CaseMode,
    /// Treat unrecognized options as plain positional values.
    pub unknown_options_as_values: bool,
    /// Which tokens end a run of optional option arguments.
    pub argument_run_end: ArgumentRunEnd,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            short_prefixes: vec!["-".to_string()],
            long_prefixes: vec!["--".to_string()],
            option_breaks: vec!["--".to_string()],
            help_tokens: ["-h", "/h", "--help", "-?", "/?"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            value_splitters: vec!['='],
            short_case: CaseMode::Sensitive,
            long_case: CaseMode::Sensitive,
            unknown_options_as_values: false,
            argument_run_end: ArgumentRunEnd::AnyOption,
        }
    }
}

impl ParserOptions {
    /// Conventions that additionally accept `/` prefixes and `:` splitters,
    /// with case-insensitive long names.
    pub fn windows() -> Self {
        Self {
            short_prefixes: vec!["-".to_string(), "/".to_string()],
            long_prefixes: vec!["--".to_string(), "/".to_string()],
            value_splitters: vec!['=', ':'],
            long_case: CaseMode::Insensitive,
            ..Self::default()
        }
    }

    /// Returns `true` if `arg` is an option-break token.
    pub fn is_break(&self, arg: &str) -> bool {
        self.option_breaks.iter().any(|b| b == arg)
    }

    /// Returns `true` if `arg` is a help token.
    pub fn is_help(&self, arg: &str) -> bool {
        self.help_tokens.iter().any(|h| h == arg)
    }

    /// Longest long prefix of `arg` that leaves a non-empty name.
    pub fn long_prefix_of(&self, arg: &str) -> Option<&str> {
        longest_prefix(&self.long_prefixes, arg)
    }

    /// Longest short prefix of `arg` that leaves a non-empty name.
    pub fn short_prefix_of(&self, arg: &str) -> Option<&str> {
        longest_prefix(&self.short_prefixes, arg)
    }

    /// Returns `true` if `arg` is exactly one of the configured prefixes.
    pub fn is_bare_prefix(&self, arg: &str) -> bool {
        self.short_prefixes
            .iter()
            .chain(&self.long_prefixes)
            .any(|p| p == arg)
    }

    /// Splits `name=value` at the first configured splitter.
    ///
    /// # Examples
    ///
    /// ```
    /// use verb_dispatch_parser::ParserOptions;
    ///
    /// let options = ParserOptions::default();
    /// assert_eq!(options.split_inline("out=a=b"), ("out", Some("a=b")));
    /// assert_eq!(options.split_inline("out"), ("out", None));
    /// ```
    pub fn split_inline<'a>(&self, body: &'a str) -> (&'a str, Option<&'a str>) {
        match body.find(|c: char| self.value_splitters.contains(&c)) {
            Some(at) => {
                let splitter_len = body[at..].chars().next().map_or(1, char::len_utf8);
                (&body[..at], Some(&body[at + splitter_len..]))
            }
            None => (body, None),
        }
    }

    /// Strips one leading splitter character, if present.
    pub fn strip_splitter<'a>(&self, text: &'a str) -> &'a str {
        match text.chars().next() {
            Some(c) if self.value_splitters.contains(&c) => &text[c.len_utf8()..],
            _ => text,
        }
    }
}

fn longest_prefix<'a>(prefixes: &'a [String], arg: &str) -> Option<&'a str> {
    prefixes
        .iter()
        .filter(|p| !p.is_empty() && arg.len() > p.len() && arg.starts_with(p.as_str()))
        .max_by_key(|p| p.len())
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_needs_a_name() {
        let options = ParserOptions::default();
        assert_eq!(options.long_prefix_of("--"), None);
        assert_eq!(options.short_prefix_of("-"), None);
        assert_eq!(options.short_prefix_of("--x"), Some("-"));
        assert!(options.is_bare_prefix("--"));
    }

    #[test]
    fn test_windows_prefers_longest_prefix() {
        let options = ParserOptions::windows();
        assert_eq!(options.long_prefix_of("--name"), Some("--"));
        assert_eq!(options.split_inline("name:value"), ("name", Some("value")));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ParserOptions =
            serde_json::from_str(r#"{"long_case":"insensitive","unknown_options_as_values":true}"#)
                .unwrap();
        assert_eq!(options.long_case, CaseMode::Insensitive);
        assert!(options.unknown_options_as_values);
        assert_eq!(options.short_prefixes, vec!["-".to_string()]);
    }

    #[test]
    fn test_strip_splitter() {
        let options = ParserOptions::default();
        assert_eq!(options.strip_splitter("=5"), "5");
        assert_eq!(options.strip_splitter("5"), "5");
    }
}
