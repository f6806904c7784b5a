//! Rebuilding an argument vector from [`ParsedArguments`].

use crate::aggregate::{OptionMap, ParsedArguments};
use crate::config::ParserOptions;

impl ParsedArguments {
    /// Formats the parsed result back into raw arguments.
    ///
    /// Long options come first, then short options, then the positional
    /// values (behind the first option break when one is configured) and
    /// finally the first help token if help was requested. Every occurrence
    /// of an option is written out; values follow the first occurrence, the
    /// first of them inline when a splitter is configured.
    ///
    /// # Examples
    ///
    /// ```
    /// use verb_dispatch_core::ValueArity;
    /// use verb_dispatch_parser::{ParserOptions, parse};
    ///
    /// let options = ParserOptions::default();
    /// let arity = |_: &str, _| Some(ValueArity::ZeroOrMany);
    /// let parsed = parse(&["pos", "--name", "a", "b", "-v"], &options, arity);
    ///
    /// let rebuilt = parsed.to_arguments(&options);
    /// assert_eq!(rebuilt, vec!["--name=a", "b", "-v", "--", "pos"]);
    /// assert_eq!(parse(&rebuilt, &options, arity), parsed);
    /// ```
    pub fn to_arguments(&self, options: &ParserOptions) -> Vec<String> {
        let mut arguments = Vec::new();
        let long_prefix = options.long_prefixes.first().map_or("--", String::as_str);
        let short_prefix = options.short_prefixes.first().map_or("-", String::as_str);
        let splitter = options.value_splitters.first().copied();

        format_options(&mut arguments, self.long(), long_prefix, splitter);
        format_options(&mut arguments, self.short(), short_prefix, splitter);

        match options.option_breaks.first() {
            Some(option_break) if !self.positional().is_empty() => {
                arguments.push(option_break.clone());
                arguments.extend(self.positional().iter().cloned());
            }
            Some(_) => {}
            None => {
                arguments.splice(0..0, self.positional().iter().cloned());
            }
        }

        if self.help_requested() {
            if let Some(help) = options.help_tokens.first() {
                arguments.push(help.clone());
            }
        }

        arguments
    }
}

fn format_options(arguments: &mut Vec<String>, map: &OptionMap, prefix: &str, splitter: Option<char>) {
    for option in map.iter() {
        let mut values = option.values.iter();
        let first = match (splitter, values.next()) {
            (Some(splitter), Some(value)) => format!("{prefix}{}{splitter}{value}", option.name),
            (None, Some(value)) => {
                arguments.push(format!("{prefix}{}", option.name));
                value.clone()
            }
            (_, None) => format!("{prefix}{}", option.name),
        };
        arguments.push(first);
        arguments.extend(values.cloned());
        for _ in 1..option.count {
            arguments.push(format!("{prefix}{}", option.name));
        }
    }
}

#[cfg(test)]
mod tests {
    use verb_dispatch_core::{OptionForm, ValueArity};

    use crate::config::ParserOptions;
    use crate::parse;

    fn arity(name: &str, _: OptionForm) -> Option<ValueArity> {
        match name {
            "v" => Some(ValueArity::Zero),
            "o" | "force" => Some(ValueArity::ZeroOrOne),
            _ => Some(ValueArity::ZeroOrMany),
        }
    }

    #[test]
    fn test_round_trip_reproduces_parse() {
        let options = ParserOptions::default();
        let input = ["a", "-vv", "--files", "x", "y", "-o", "1", "-o", "--force", "b"];
        let parsed = parse(&input, &options, arity);

        let rebuilt = parsed.to_arguments(&options);
        assert_eq!(parse(&rebuilt, &options, arity), parsed);
    }

    #[test]
    fn test_round_trip_keeps_help() {
        let options = ParserOptions::default();
        let parsed = parse(&["-v", "--help"], &options, arity);

        let rebuilt = parsed.to_arguments(&options);
        assert_eq!(rebuilt, vec!["-v", "-h"]);
        assert!(parse(&rebuilt, &options, arity).help_requested());
    }

    #[test]
    fn test_without_break_positionals_come_first() {
        let options = ParserOptions {
            option_breaks: Vec::new(),
            ..ParserOptions::default()
        };
        let parsed = parse(&["--files", "x", "-v", "pos"], &options, arity);

        let rebuilt = parsed.to_arguments(&options);
        assert_eq!(rebuilt, vec!["pos", "--files=x", "-v"]);
        assert_eq!(parse(&rebuilt, &options, arity), parsed);
    }

    #[test]
    fn test_without_splitter_values_are_separate() {
        let options = ParserOptions {
            value_splitters: Vec::new(),
            ..ParserOptions::default()
        };
        let parsed = parse(&["--files", "x", "y"], &options, arity);

        assert_eq!(parsed.to_arguments(&options), vec!["--files", "x", "y"]);
    }
}
