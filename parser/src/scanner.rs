//! Token scanner: a five-mode lexical state machine over the raw arguments.
//!
//! The scanner never fails. Ambiguous input degrades to being treated as a
//! value, and the binder decides later whether the result makes sense.
//!
//! # Modes
//!
//! - `ValueOrOption`: default; each token is classified as a break, help,
//!   long option, short-option bundle, or value.
//! - `Value`: after an option break; everything but help is a value.
//! - `OneOrMoreArguments`: the next token is a mandatory option argument.
//! - `ZeroOrMoreArguments`: tokens are option arguments until an
//!   option-shaped token, break, or help token appears.
//! - `ZeroOrMoreExplicitArguments`: same, after an unknown option.

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;
use verb_dispatch_core::{OptionForm, ValueArity};

use crate::config::{ArgumentRunEnd, ParserOptions};
use crate::token::{Token, TokenKind};

/// Negative numbers and other numeric literals that must never be read as
/// option names.
static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?$")
        .expect("static regex must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    ValueOrOption,
    Value,
    OneOrMoreArguments,
    ZeroOrMoreArguments,
    ZeroOrMoreExplicitArguments,
}

/// Lazy, single-pass tokenizer over an argument vector.
///
/// `arity_of` reports the value arity of a known option name; `None` marks
/// the name as unknown.
///
/// # Examples
///
/// ```
/// use verb_dispatch_core::{OptionForm, ValueArity};
/// use verb_dispatch_parser::{ParserOptions, Scanner, TokenKind};
///
/// let args = ["-zo123", "file.txt"];
/// let options = ParserOptions::default();
/// let arity = |name: &str, _form: OptionForm| match name {
///     "z" => Some(ValueArity::Zero),
///     "o" => Some(ValueArity::One),
///     _ => None,
/// };
///
/// let kinds: Vec<(TokenKind, String)> = Scanner::new(&args, &options, arity)
///     .map(|t| (t.kind, t.text))
///     .collect();
/// assert_eq!(
///     kinds,
///     vec![
///         (TokenKind::ShortOption, "z".to_string()),
///         (TokenKind::ShortOption, "o".to_string()),
///         (TokenKind::OptionArgument, "123".to_string()),
///         (TokenKind::OptionArgument, "file.txt".to_string()),
///     ]
/// );
/// ```
pub struct Scanner<'a, S, F> {
    arguments: &'a [S],
    options: &'a ParserOptions,
    arity_of: F,
    index: usize,
    mode: ScanMode,
    pending: VecDeque<Token>,
    finished: bool,
}

impl<'a, S, F> Scanner<'a, S, F>
where
    S: AsRef<str>,
    F: Fn(&str, OptionForm) -> Option<ValueArity>,
{
    /// Creates a scanner over `arguments`.
    pub fn new(arguments: &'a [S], options: &'a ParserOptions, arity_of: F) -> Self {
        Self {
            arguments,
            options,
            arity_of,
            index: 0,
            mode: ScanMode::ValueOrOption,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    fn emit(&mut self, kind: TokenKind, text: &str, index: usize) {
        trace!(?kind, text, index, "Scanned token");
        self.pending.push_back(Token::new(kind, text, index));
    }

    fn scan_argument(&mut self, arg: &str, index: usize) {
        if self.options.is_help(arg) {
            self.emit(TokenKind::HelpOption, arg, index);
            self.finished = true;
            return;
        }

        match self.mode {
            ScanMode::Value => self.emit(TokenKind::Value, arg, index),
            ScanMode::OneOrMoreArguments => {
                self.emit(TokenKind::OptionArgument, arg, index);
                self.mode = ScanMode::ZeroOrMoreArguments;
            }
            ScanMode::ZeroOrMoreArguments | ScanMode::ZeroOrMoreExplicitArguments => {
                if self.ends_argument_run(arg) {
                    self.mode = ScanMode::ValueOrOption;
                    self.scan_option_or_value(arg, index);
                } else {
                    self.emit(TokenKind::OptionArgument, arg, index);
                }
            }
            ScanMode::ValueOrOption => self.scan_option_or_value(arg, index),
        }
    }

    fn ends_argument_run(&self, arg: &str) -> bool {
        if self.options.is_break(arg) {
            return true;
        }
        match (self.mode, self.options.argument_run_end) {
            (ScanMode::ZeroOrMoreArguments, ArgumentRunEnd::RecognizedOptions) => {
                self.is_recognized_option(arg)
            }
            _ => self.looks_like_option(arg),
        }
    }

    fn looks_like_option(&self, arg: &str) -> bool {
        if is_numeric(arg) {
            return false;
        }
        let prefix = self
            .options
            .long_prefix_of(arg)
            .or_else(|| self.options.short_prefix_of(arg));
        prefix.is_some_and(|p| !starts_numeric(&arg[p.len()..]))
    }

    fn is_recognized_option(&self, arg: &str) -> bool {
        if is_numeric(arg) {
            return false;
        }
        if let Some(prefix) = self.options.long_prefix_of(arg) {
            let (name, _) = self.options.split_inline(&arg[prefix.len()..]);
            if !starts_numeric(name) && (self.arity_of)(name, OptionForm::Long).is_some() {
                return true;
            }
        }
        if let Some(prefix) = self.options.short_prefix_of(arg) {
            let body = &arg[prefix.len()..];
            if let Some(letter) = body.chars().next() {
                let mut buf = [0; 4];
                return !starts_numeric(body)
                    && (self.arity_of)(letter.encode_utf8(&mut buf), OptionForm::Short).is_some();
            }
        }
        false
    }

    fn scan_option_or_value(&mut self, arg: &str, index: usize) {
        let options = self.options;
        if options.is_break(arg) {
            self.emit(TokenKind::OptionBreak, arg, index);
            self.mode = ScanMode::Value;
            return;
        }
        if options.is_help(arg) {
            self.emit(TokenKind::HelpOption, arg, index);
            self.finished = true;
            return;
        }
        if is_numeric(arg) || options.is_bare_prefix(arg) {
            self.emit(TokenKind::Value, arg, index);
            return;
        }

        if let Some(prefix) = options.long_prefix_of(arg) {
            let body = &arg[prefix.len()..];
            if !starts_numeric(body) && self.scan_long(arg, prefix, body, index) {
                return;
            }
        }

        if let Some(prefix) = options.short_prefix_of(arg) {
            let body = &arg[prefix.len()..];
            if starts_numeric(body) {
                self.emit(TokenKind::Value, arg, index);
            } else {
                self.scan_short_bundle(arg, body, index);
            }
            return;
        }

        self.emit(TokenKind::Value, arg, index);
    }

    /// Returns `false` when the token should be retried as a short bundle.
    fn scan_long(&mut self, arg: &str, prefix: &str, body: &str, index: usize) -> bool {
        let (name, inline) = self.options.split_inline(body);

        if let Some(arity) = (self.arity_of)(name, OptionForm::Long) {
            self.emit(TokenKind::LongOption, name, index);
            if let Some(value) = inline {
                self.emit(TokenKind::OptionArgument, value, index);
            }
            self.mode = mode_after(arity, inline.is_some());
            return true;
        }

        // `/name` may still be a bundle of short options when `/` is also a
        // short prefix; `--name` never is.
        let shadows_short = self
            .options
            .short_prefix_of(arg)
            .is_some_and(|short| short.len() >= prefix.len());
        if shadows_short {
            return false;
        }

        self.scan_unknown(arg, name, inline, index);
        true
    }

    fn scan_short_bundle(&mut self, arg: &str, body: &str, index: usize) {
        let letters: Vec<(usize, char)> = body.char_indices().collect();

        for (position, &(offset, letter)) in letters.iter().enumerate() {
            let mut buf = [0; 4];
            let name = letter.encode_utf8(&mut buf);
            let rest = &body[offset + letter.len_utf8()..];

            let Some(arity) = (self.arity_of)(name, OptionForm::Short) else {
                if position == 0 {
                    let (name, inline) = self.options.split_inline(body);
                    self.scan_unknown(arg, name, inline, index);
                } else {
                    self.scan_unknown_remainder(&body[offset..], index);
                }
                return;
            };

            self.emit(TokenKind::ShortOption, name, index);
            if rest.is_empty() {
                self.mode = mode_after(arity, false);
                return;
            }

            let rest_is_inline = self.options.strip_splitter(rest).len() != rest.len();
            let keeps_bundling = match arity {
                ValueArity::Zero => !rest_is_inline,
                ValueArity::ZeroOrOne | ValueArity::ZeroOrMany => {
                    !rest_is_inline && self.next_letter_is_known(rest)
                }
                ValueArity::One | ValueArity::OneOrMany => false,
            };
            if keeps_bundling {
                continue;
            }

            let value = self.options.strip_splitter(rest);
            self.emit(TokenKind::OptionArgument, value, index);
            self.mode = mode_after(arity, true);
            return;
        }
    }

    fn next_letter_is_known(&self, rest: &str) -> bool {
        rest.chars().next().is_some_and(|letter| {
            let mut buf = [0; 4];
            (self.arity_of)(letter.encode_utf8(&mut buf), OptionForm::Short).is_some()
        })
    }

    fn scan_unknown(&mut self, arg: &str, name: &str, inline: Option<&str>, index: usize) {
        if self.options.unknown_options_as_values {
            self.emit(TokenKind::Value, arg, index);
            self.mode = ScanMode::ValueOrOption;
            return;
        }
        self.emit(TokenKind::UnknownOption, name, index);
        if let Some(value) = inline {
            self.emit(TokenKind::OptionArgument, value, index);
        }
        self.mode = ScanMode::ZeroOrMoreExplicitArguments;
    }

    /// Unknown letter after one or more zero-arity letters of a bundle.
    fn scan_unknown_remainder(&mut self, remainder: &str, index: usize) {
        if self.options.unknown_options_as_values || starts_numeric(remainder) {
            self.emit(TokenKind::Value, remainder, index);
            self.mode = ScanMode::ValueOrOption;
            return;
        }
        let (name, inline) = self.options.split_inline(remainder);
        self.emit(TokenKind::UnknownOption, name, index);
        if let Some(value) = inline {
            self.emit(TokenKind::OptionArgument, value, index);
        }
        self.mode = ScanMode::ZeroOrMoreExplicitArguments;
    }
}

impl<S, F> Iterator for Scanner<'_, S, F>
where
    S: AsRef<str>,
    F: Fn(&str, OptionForm) -> Option<ValueArity>,
{
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.finished || self.index >= self.arguments.len() {
                return None;
            }
            let index = self.index;
            self.index += 1;
            let arguments = self.arguments;
            self.scan_argument(arguments[index].as_ref(), index);
        }
    }
}

/// Scans `arguments` eagerly.
///
/// # Examples
///
/// ```
/// use verb_dispatch_core::ValueArity;
/// use verb_dispatch_parser::{ParserOptions, TokenKind, scan};
///
/// let tokens = scan(&["--", "-1"], &ParserOptions::default(), |_, _| Some(ValueArity::One));
/// assert_eq!(tokens[0].kind, TokenKind::OptionBreak);
/// assert_eq!(tokens[1].kind, TokenKind::Value);
/// assert_eq!(tokens[1].text, "-1");
/// ```
pub fn scan<S, F>(arguments: &[S], options: &ParserOptions, arity_of: F) -> Vec<Token>
where
    S: AsRef<str>,
    F: Fn(&str, OptionForm) -> Option<ValueArity>,
{
    Scanner::new(arguments, options, arity_of).collect()
}

/// Mode to continue in after an option; an inline value counts as the
/// mandatory argument.
fn mode_after(arity: ValueArity, has_inline: bool) -> ScanMode {
    match arity {
        ValueArity::Zero => ScanMode::ValueOrOption,
        ValueArity::One | ValueArity::OneOrMany if !has_inline => ScanMode::OneOrMoreArguments,
        _ => ScanMode::ZeroOrMoreArguments,
    }
}

/// Returns `true` for numeric literals such as `-1`, `+2.5`, `-.5`, `1e3`.
pub fn is_numeric(text: &str) -> bool {
    NUMERIC.is_match(text)
}

fn starts_numeric(body: &str) -> bool {
    let mut chars = body.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arity_table(
        table: &'static [(&'static str, ValueArity)],
    ) -> impl Fn(&str, OptionForm) -> Option<ValueArity> {
        move |name: &str, _: OptionForm| table.iter().find(|(n, _)| *n == name).map(|(_, a)| *a)
    }

    fn kinds(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
        tokens.iter().map(|t| (t.kind, t.text.as_str())).collect()
    }

    #[test]
    fn test_negative_numbers_are_values() {
        let options = ParserOptions::default();
        let tokens = scan(&["-1", "-.5", "-2e3", "-3x"], &options, |_, _| Some(ValueArity::Zero));
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Value));
    }

    #[test]
    fn test_negative_number_is_option_argument_after_option() {
        let options = ParserOptions::default();
        let tokens = scan(&["--offset", "-5"], &options, arity_table(&[("offset", ValueArity::One)]));
        assert_eq!(
            kinds(&tokens),
            vec![(TokenKind::LongOption, "offset"), (TokenKind::OptionArgument, "-5")]
        );
    }

    #[test]
    fn test_break_switches_to_values() {
        let options = ParserOptions::default();
        let tokens = scan(&["--", "-v", "--name", "--"], &options, |_, _| Some(ValueArity::Zero));
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::OptionBreak, "--"),
                (TokenKind::Value, "-v"),
                (TokenKind::Value, "--name"),
                (TokenKind::Value, "--"),
            ]
        );
    }

    #[test]
    fn test_help_stops_scanning_even_after_break() {
        let options = ParserOptions::default();
        let tokens = scan(&["a", "--", "b", "-h", "c"], &options, |_, _| None);
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::Value, "a"),
                (TokenKind::OptionBreak, "--"),
                (TokenKind::Value, "b"),
                (TokenKind::HelpOption, "-h"),
            ]
        );
    }

    #[test]
    fn test_inline_long_value() {
        let options = ParserOptions::default();
        let tokens = scan(&["--out=a.txt", "b"], &options, arity_table(&[("out", ValueArity::One)]));
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::LongOption, "out"),
                (TokenKind::OptionArgument, "a.txt"),
                (TokenKind::OptionArgument, "b"),
            ]
        );
    }

    #[test]
    fn test_zero_arity_returns_to_values() {
        let options = ParserOptions::default();
        let tokens = scan(&["-vv", "file"], &options, arity_table(&[("v", ValueArity::Zero)]));
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::ShortOption, "v"),
                (TokenKind::ShortOption, "v"),
                (TokenKind::Value, "file"),
            ]
        );
    }

    #[test]
    fn test_optional_arity_bundles_known_letters() {
        let options = ParserOptions::default();
        let table = arity_table(&[("a", ValueArity::ZeroOrOne), ("b", ValueArity::ZeroOrOne)]);
        let tokens = scan(&["-ab"], &options, table);
        assert_eq!(
            kinds(&tokens),
            vec![(TokenKind::ShortOption, "a"), (TokenKind::ShortOption, "b")]
        );
    }

    #[test]
    fn test_optional_arity_takes_unknown_remainder_as_value() {
        let options = ParserOptions::default();
        let tokens = scan(&["-afalse"], &options, arity_table(&[("a", ValueArity::ZeroOrOne)]));
        assert_eq!(
            kinds(&tokens),
            vec![(TokenKind::ShortOption, "a"), (TokenKind::OptionArgument, "false")]
        );
    }

    #[test]
    fn test_short_inline_with_splitter() {
        let options = ParserOptions::default();
        let tokens = scan(&["-c=3"], &options, arity_table(&[("c", ValueArity::Zero)]));
        assert_eq!(
            kinds(&tokens),
            vec![(TokenKind::ShortOption, "c"), (TokenKind::OptionArgument, "3")]
        );
    }

    #[test]
    fn test_unknown_option_swallows_following_values() {
        let options = ParserOptions::default();
        let tokens = scan(&["--color", "red", "blue", "-v"], &options, arity_table(&[("v", ValueArity::Zero)]));
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::UnknownOption, "color"),
                (TokenKind::OptionArgument, "red"),
                (TokenKind::OptionArgument, "blue"),
                (TokenKind::ShortOption, "v"),
            ]
        );
    }

    #[test]
    fn test_unknown_options_as_values() {
        let options = ParserOptions {
            unknown_options_as_values: true,
            ..ParserOptions::default()
        };
        let tokens = scan(&["--color", "-x", "red"], &options, |_, _| None);
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::Value, "--color"),
                (TokenKind::Value, "-x"),
                (TokenKind::Value, "red"),
            ]
        );
    }

    #[test]
    fn test_unknown_letter_after_zero_arity_numeric_remainder() {
        let options = ParserOptions::default();
        let tokens = scan(&["-n5"], &options, arity_table(&[("n", ValueArity::Zero)]));
        assert_eq!(
            kinds(&tokens),
            vec![(TokenKind::ShortOption, "n"), (TokenKind::Value, "5")]
        );
    }

    #[test]
    fn test_unknown_multi_letter_short_is_single_unknown() {
        let options = ParserOptions::default();
        let tokens = scan(&["-foo=1"], &options, |_, _| None);
        assert_eq!(
            kinds(&tokens),
            vec![(TokenKind::UnknownOption, "foo"), (TokenKind::OptionArgument, "1")]
        );
    }

    #[test]
    fn test_recognized_options_only_end_runs() {
        let options = ParserOptions {
            argument_run_end: ArgumentRunEnd::RecognizedOptions,
            ..ParserOptions::default()
        };
        let table = arity_table(&[("args", ValueArity::ZeroOrMany), ("v", ValueArity::Zero)]);
        let tokens = scan(&["--args", "-x", "--y", "-v"], &options, table);
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::LongOption, "args"),
                (TokenKind::OptionArgument, "-x"),
                (TokenKind::OptionArgument, "--y"),
                (TokenKind::ShortOption, "v"),
            ]
        );
    }

    #[test]
    fn test_windows_slash_options() {
        let options = ParserOptions::windows();
        let table = arity_table(&[("name", ValueArity::One), ("v", ValueArity::Zero), ("q", ValueArity::Zero)]);
        let tokens = scan(&["/name:x", "/vq", "/?"], &options, table);
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::LongOption, "name"),
                (TokenKind::OptionArgument, "x"),
                (TokenKind::ShortOption, "v"),
                (TokenKind::ShortOption, "q"),
                (TokenKind::HelpOption, "/?"),
            ]
        );
    }

    #[test]
    fn test_mandatory_argument_takes_option_shaped_token() {
        let options = ParserOptions::default();
        let tokens = scan(&["--pattern", "--literal"], &options, arity_table(&[("pattern", ValueArity::One)]));
        assert_eq!(
            kinds(&tokens),
            vec![(TokenKind::LongOption, "pattern"), (TokenKind::OptionArgument, "--literal")]
        );
    }

    #[test]
    fn test_tokens_carry_argument_index() {
        let options = ParserOptions::default();
        let tokens = scan(&["-ab", "x"], &options, |_, _| Some(ValueArity::Zero));
        let indices: Vec<usize> = tokens.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 0, 1]);
    }

    #[test]
    fn test_scanner_is_lazy() {
        let options = ParserOptions::default();
        let args = ["a", "b", "c"];
        let mut scanner = Scanner::new(&args, &options, |_, _| None);
        assert_eq!(scanner.next().map(|t| t.text), Some("a".to_string()));
        assert_eq!(scanner.count(), 2);
    }

    #[test]
    fn test_bare_dash_is_value() {
        let options = ParserOptions::default();
        let tokens = scan(&["-"], &options, |_, _| Some(ValueArity::Zero));
        assert_eq!(kinds(&tokens), vec![(TokenKind::Value, "-")]);
    }
}
