//! Value arity and option-name matching primitives.
//!
//! [`ValueArity`] describes how many raw string values an option may carry.
//! The scanner uses it to decide whether the tokens that follow an option are
//! that option's arguments, and the binder uses [`ValueArity::check`] to turn
//! a raw-value count into a per-parameter failure.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of raw string values an option may legally carry.
///
/// # Examples
///
/// ```
/// use verb_dispatch_core::ValueArity;
///
/// assert!(ValueArity::ZeroOrOne.accepts(0));
/// assert!(ValueArity::ZeroOrOne.accepts(1));
/// assert!(!ValueArity::ZeroOrOne.accepts(2));
/// assert!(ValueArity::OneOrMany.requires_value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueArity {
    /// The option never carries a value (occurrence counters).
    Zero,
    /// At most one value (boolean switches: `--force` or `--force=false`).
    ZeroOrOne,
    /// Exactly one value (scalars).
    One,
    /// Any number of values (lists).
    ZeroOrMany,
    /// At least one value (bit-flag enumerations).
    OneOrMany,
}

impl ValueArity {
    /// Returns `true` if `count` raw values satisfy this arity.
    pub fn accepts(self, count: usize) -> bool {
        self.check(count).is_ok()
    }

    /// Returns `true` if at least one value is mandatory.
    pub fn requires_value(self) -> bool {
        matches!(self, Self::One | Self::OneOrMany)
    }

    /// Returns `true` if more than one value is allowed.
    pub fn allows_many(self) -> bool {
        matches!(self, Self::ZeroOrMany | Self::OneOrMany)
    }

    /// Validates a raw-value count against this arity.
    ///
    /// Each kind of mismatch has its own error so diagnostics can say
    /// exactly what was wrong.
    ///
    /// # Examples
    ///
    /// ```
    /// use verb_dispatch_core::{ArityError, ValueArity};
    ///
    /// assert_eq!(ValueArity::One.check(0), Err(ArityError::RequiresValue));
    /// assert_eq!(ValueArity::One.check(2), Err(ArityError::RequiresExactlyOne(2)));
    /// assert_eq!(ValueArity::ZeroOrOne.check(3), Err(ArityError::RequiresAtMostOne(3)));
    /// assert_eq!(ValueArity::Zero.check(1), Err(ArityError::RequiresNoValue(1)));
    /// assert!(ValueArity::ZeroOrMany.check(5).is_ok());
    /// ```
    pub fn check(self, count: usize) -> Result<(), ArityError> {
        match (self, count) {
            (Self::Zero, n) if n > 0 => Err(ArityError::RequiresNoValue(n)),
            (Self::One | Self::OneOrMany, 0) => Err(ArityError::RequiresValue),
            (Self::One, n) if n > 1 => Err(ArityError::RequiresExactlyOne(n)),
            (Self::ZeroOrOne, n) if n > 1 => Err(ArityError::RequiresAtMostOne(n)),
            _ => Ok(()),
        }
    }
}

/// A raw-value count that does not fit a [`ValueArity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArityError {
    /// Zero-arity option was given values.
    #[error("requires no value, but {0} were given")]
    RequiresNoValue(usize),
    /// Mandatory value is missing.
    #[error("requires a value")]
    RequiresValue,
    /// Single-valued option was given several values.
    #[error("requires exactly one value, but {0} were given")]
    RequiresExactlyOne(usize),
    /// Optional-valued option was given several values.
    #[error("requires at most one value, but {0} were given")]
    RequiresAtMostOne(usize),
}

/// Which form an option name was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionForm {
    /// Single-character name after a short prefix (`-v`).
    Short,
    /// Word name after a long prefix (`--verbose`).
    Long,
}

/// Case sensitivity for option and verb names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseMode {
    /// Names must match exactly.
    #[default]
    Sensitive,
    /// Names match ignoring case.
    Insensitive,
}

impl CaseMode {
    /// Folds a name into its lookup key.
    ///
    /// # Examples
    ///
    /// ```
    /// use verb_dispatch_core::CaseMode;
    ///
    /// assert_eq!(CaseMode::Insensitive.fold("Verbose"), "verbose");
    /// assert_eq!(CaseMode::Sensitive.fold("Verbose"), "Verbose");
    /// ```
    pub fn fold<'a>(self, name: &'a str) -> Cow<'a, str> {
        match self {
            Self::Sensitive => Cow::Borrowed(name),
            Self::Insensitive => Cow::Owned(name.to_lowercase()),
        }
    }

    /// Compares two names under this mode.
    pub fn eq(self, a: &str, b: &str) -> bool {
        match self {
            Self::Sensitive => a == b,
            Self::Insensitive => a.to_lowercase() == b.to_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_mismatches_are_distinct() {
        let errors = [
            ValueArity::Zero.check(1).unwrap_err(),
            ValueArity::One.check(0).unwrap_err(),
            ValueArity::One.check(2).unwrap_err(),
            ValueArity::ZeroOrOne.check(2).unwrap_err(),
        ];
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(messages[0], "requires no value, but 1 were given");
        assert_eq!(messages[1], "requires a value");
        assert_eq!(messages[2], "requires exactly one value, but 2 were given");
        assert_eq!(messages[3], "requires at most one value, but 2 were given");
    }

    #[test]
    fn test_many_arities_accept_any_count() {
        assert!(ValueArity::ZeroOrMany.accepts(0));
        assert!(ValueArity::ZeroOrMany.accepts(10));
        assert!(!ValueArity::OneOrMany.accepts(0));
        assert!(ValueArity::OneOrMany.accepts(3));
    }

    #[test]
    fn test_case_mode_eq() {
        assert!(CaseMode::Insensitive.eq("ADD", "add"));
        assert!(!CaseMode::Sensitive.eq("ADD", "add"));
    }
}
