//! Command-line argument scanning and aggregation.
//!
//! Parsing runs in two steps:
//!
//! 1. [`Scanner`] turns the raw argument vector into typed [`Token`]s. It
//!    is driven by an arity lookup supplied by the caller, so the same input
//!    can be scanned differently for different verbs.
//! 2. [`aggregate`] folds the tokens into [`ParsedArguments`]: short and
//!    long option maps, positional values, and a help flag.
//!
//! [`ParsedArguments::to_arguments`] formats the result back into an
//! argument vector that scans to the same result.
//!
//! # Example
//!
//! ```
//! use verb_dispatch_core::{OptionForm, ValueArity};
//! use verb_dispatch_parser::{ParserOptions, parse};
//!
//! let arity = |name: &str, form: OptionForm| match (name, form) {
//!     ("verbose", OptionForm::Long) | ("v", OptionForm::Short) => Some(ValueArity::Zero),
//!     ("out", OptionForm::Long) => Some(ValueArity::One),
//!     _ => None,
//! };
//!
//! let parsed = parse(&["input", "-vv", "--out=a.txt"], &ParserOptions::default(), arity);
//! assert_eq!(parsed.short().get("v").unwrap().count, 2);
//! assert_eq!(parsed.long().get("out").unwrap().values, vec!["a.txt"]);
//! ```

mod aggregate;
mod config;
mod format;
mod scanner;
mod token;

pub use aggregate::{OptionMap, OptionValue, ParsedArguments, aggregate, parse};
pub use config::{ArgumentRunEnd, ParserOptions};
pub use scanner::{Scanner, is_numeric, scan};
pub use token::{Token, TokenKind};
