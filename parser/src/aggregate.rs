//! Folding a token stream into [`ParsedArguments`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use verb_dispatch_core::{CaseMode, OptionForm, ValueArity};

use crate::config::ParserOptions;
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};

/// Everything collected for one option name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    /// Name as first typed (without prefix).
    pub name: String,
    /// Raw values in order of appearance.
    pub values: Vec<String>,
    /// Number of occurrences, independent of the value count.
    pub count: usize,
}

impl OptionValue {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: Vec::new(),
            count: 0,
        }
    }
}

/// Option values keyed by name, folded per the map's case mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionMap {
    case: CaseMode,
    entries: BTreeMap<String, OptionValue>,
}

impl OptionMap {
    /// Creates an empty map.
    pub fn new(case: CaseMode) -> Self {
        Self {
            case,
            entries: BTreeMap::new(),
        }
    }

    /// Looks up an option by name.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.get(self.case.fold(name).as_ref())
    }

    /// Returns `true` if the option appeared.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionValue> {
        self.entries.values()
    }

    /// Number of distinct options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no option appeared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case mode used to fold keys.
    pub fn case(&self) -> CaseMode {
        self.case
    }

    fn key(&self, name: &str) -> String {
        self.case.fold(name).into_owned()
    }

    fn entry(&mut self, name: &str) -> &mut OptionValue {
        let key = self.key(name);
        self.entries.entry(key).or_insert_with(|| OptionValue::new(name))
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut OptionValue> {
        let key = self.key(name);
        self.entries.get_mut(&key)
    }
}

/// Structured result of parsing an argument vector.
///
/// # Examples
///
/// ```
/// use verb_dispatch_core::ValueArity;
/// use verb_dispatch_parser::{ParserOptions, parse};
///
/// let parsed = parse(
///     &["-o", "1", "-o", "file"],
///     &ParserOptions::default(),
///     |_, _| Some(ValueArity::ZeroOrOne),
/// );
/// let o = parsed.short().get("o").unwrap();
/// assert_eq!(o.count, 2);
/// assert_eq!(o.values, vec!["1", "file"]);
/// assert!(parsed.positional().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedArguments {
    short: OptionMap,
    long: OptionMap,
    positional: Vec<String>,
    help_requested: bool,
}

impl ParsedArguments {
    /// Short options (`-v`), plus single-letter unknown options.
    pub fn short(&self) -> &OptionMap {
        &self.short
    }

    /// Long options (`--verbose`), plus longer unknown options.
    pub fn long(&self) -> &OptionMap {
        &self.long
    }

    /// Positional values in order.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Returns `true` if a help token was seen.
    pub fn help_requested(&self) -> bool {
        self.help_requested
    }

    /// Looks up an option in the map for `form`.
    pub fn option(&self, name: &str, form: OptionForm) -> Option<&OptionValue> {
        match form {
            OptionForm::Short => self.short.get(name),
            OptionForm::Long => self.long.get(name),
        }
    }
}

#[derive(Clone, Copy)]
enum Cursor<'t> {
    None,
    Short(&'t str),
    Long(&'t str),
}

/// Folds scanned tokens into option maps and positional values.
pub fn aggregate<'t>(tokens: impl IntoIterator<Item = &'t Token>, options: &ParserOptions) -> ParsedArguments {
    let mut parsed = ParsedArguments {
        short: OptionMap::new(options.short_case),
        long: OptionMap::new(options.long_case),
        ..ParsedArguments::default()
    };
    let mut cursor = Cursor::None;

    for token in tokens {
        match token.kind {
            TokenKind::ShortOption => {
                parsed.short.entry(&token.text).count += 1;
                cursor = Cursor::Short(&token.text);
            }
            TokenKind::LongOption => {
                parsed.long.entry(&token.text).count += 1;
                cursor = Cursor::Long(&token.text);
            }
            TokenKind::UnknownOption => {
                if token.text.chars().count() == 1 {
                    parsed.short.entry(&token.text).count += 1;
                    cursor = Cursor::Short(&token.text);
                } else {
                    parsed.long.entry(&token.text).count += 1;
                    cursor = Cursor::Long(&token.text);
                }
            }
            TokenKind::OptionArgument => {
                let target = match cursor {
                    Cursor::Short(name) => parsed.short.get_mut(name),
                    Cursor::Long(name) => parsed.long.get_mut(name),
                    Cursor::None => None,
                };
                match target {
                    Some(option) => option.values.push(token.text.clone()),
                    None => parsed.positional.push(token.text.clone()),
                }
            }
            TokenKind::Value => {
                parsed.positional.push(token.text.clone());
                cursor = Cursor::None;
            }
            TokenKind::OptionBreak => cursor = Cursor::None,
            TokenKind::HelpOption => {
                parsed.help_requested = true;
                cursor = Cursor::None;
            }
        }
    }

    parsed
}

/// Scans and aggregates `arguments` in one step.
pub fn parse<S, F>(arguments: &[S], options: &ParserOptions, arity_of: F) -> ParsedArguments
where
    S: AsRef<str>,
    F: Fn(&str, OptionForm) -> Option<ValueArity>,
{
    let tokens: Vec<Token> = Scanner::new(arguments, options, arity_of).collect();
    aggregate(&tokens, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_or_one(_: &str, _: OptionForm) -> Option<ValueArity> {
        Some(ValueArity::ZeroOrOne)
    }

    #[test]
    fn test_single_flag_has_count_and_no_values() {
        let parsed = parse(&["-o"], &ParserOptions::default(), zero_or_one);
        let o = parsed.short().get("o").unwrap();
        assert_eq!(o.count, 1);
        assert!(o.values.is_empty());
    }

    #[test]
    fn test_repeated_flag_accumulates() {
        let parsed = parse(&["-o", "1", "-o"], &ParserOptions::default(), zero_or_one);
        let o = parsed.short().get("o").unwrap();
        assert_eq!(o.count, 2);
        assert_eq!(o.values, vec!["1"]);
    }

    #[test]
    fn test_bundle_with_inline_value() {
        let arity = |name: &str, _: OptionForm| match name {
            "z" => Some(ValueArity::Zero),
            "o" => Some(ValueArity::One),
            _ => None,
        };
        let parsed = parse(&["-zo123"], &ParserOptions::default(), arity);
        let z = parsed.short().get("z").unwrap();
        assert_eq!((z.count, z.values.len()), (1, 0));
        assert_eq!(parsed.short().get("o").unwrap().values, vec!["123"]);
    }

    #[test]
    fn test_break_then_negative_number_is_positional() {
        let parsed = parse(&["--", "-1"], &ParserOptions::default(), zero_or_one);
        assert_eq!(parsed.positional(), &["-1".to_string()]);
        assert!(parsed.short().is_empty());
    }

    #[test]
    fn test_value_clears_cursor() {
        let arity = |_: &str, _: OptionForm| Some(ValueArity::Zero);
        let parsed = parse(&["-v", "a", "b"], &ParserOptions::default(), arity);
        assert_eq!(parsed.positional(), &["a".to_string(), "b".to_string()]);
        assert!(parsed.short().get("v").unwrap().values.is_empty());
    }

    #[test]
    fn test_unknown_options_land_by_length() {
        let parsed = parse(&["-x", "1", "--color", "red"], &ParserOptions::default(), |_, _| None);
        assert_eq!(parsed.short().get("x").unwrap().values, vec!["1"]);
        assert_eq!(parsed.long().get("color").unwrap().values, vec!["red"]);
    }

    #[test]
    fn test_long_case_folding() {
        let options = ParserOptions {
            long_case: CaseMode::Insensitive,
            ..ParserOptions::default()
        };
        let parsed = parse(&["--Name", "a", "--NAME", "b"], &options, zero_or_one);
        let name = parsed.long().get("name").unwrap();
        assert_eq!(name.name, "Name");
        assert_eq!(name.count, 2);
        assert_eq!(name.values, vec!["a", "b"]);
        assert_eq!(parsed.long().len(), 1);
    }

    #[test]
    fn test_help_flag_set() {
        let parsed = parse(&["add", "--help", "1"], &ParserOptions::default(), zero_or_one);
        assert!(parsed.help_requested());
        assert_eq!(parsed.positional(), &["add".to_string()]);
    }

    #[test]
    fn test_parsed_arguments_serialize() {
        let parsed = parse(&["-v", "x"], &ParserOptions::default(), |_, _| Some(ValueArity::Zero));
        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json["positional"][0], "x");
        assert_eq!(json["short"]["entries"]["v"]["count"], 1);
    }
}
