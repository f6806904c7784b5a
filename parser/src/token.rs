//! Scanner tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Positional value.
    Value,
    /// Known short option name (without prefix).
    ShortOption,
    /// Known long option name (without prefix).
    LongOption,
    /// Option-shaped token whose name is not known.
    UnknownOption,
    /// Value attached to the preceding option.
    OptionArgument,
    /// Option break (`--`).
    OptionBreak,
    /// Help request.
    HelpOption,
}

/// A typed piece of the argument vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// What the token is.
    pub kind: TokenKind,
    /// Payload: option name, value text, or the raw token for breaks/help.
    pub text: String,
    /// Index of the raw argument the token came from.
    pub index: usize,
}

impl Token {
    /// Creates a token.
    pub fn new(kind: TokenKind, text: impl Into<String>, index: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            index,
        }
    }

    /// Returns `true` for option-name tokens, known or not.
    pub fn is_option(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::ShortOption | TokenKind::LongOption | TokenKind::UnknownOption
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.text)
    }
}
