//! String-to-value conversion.

use std::path::PathBuf;

use thiserror::Error;
use verb_dispatch_core::{Value, ValueType};

/// A raw value that could not be converted to its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert '{value}' to {target}: {reason}")]
pub struct ConversionError {
    /// The offending raw value.
    pub value: String,
    /// Description of the target type.
    pub target: String,
    /// Why conversion failed.
    pub reason: String,
}

impl ConversionError {
    fn new(value: &str, target: impl ToString, reason: impl ToString) -> Self {
        Self {
            value: value.to_string(),
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Converts raw command-line strings into typed values.
///
/// The binder calls this for every bound value; hosts replace
/// [`DefaultConverter`] to support other spellings.
pub trait ValueConverter: Send + Sync {
    /// Converts one raw value.
    fn convert(&self, raw: &str, target: &ValueType) -> Result<Value, ConversionError>;

    /// Combines flag names into a bit set.
    ///
    /// Each raw value may hold several comma-separated names; repeated
    /// values are united. Bit `i` stands for `names[i]`.
    fn convert_flags(&self, raws: &[String], names: &[String]) -> Result<Value, ConversionError> {
        let target = || format!("flags ({})", names.join("|"));
        let mut bits = 0_u64;
        for raw in raws {
            for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let index = names
                    .iter()
                    .position(|n| n.eq_ignore_ascii_case(part))
                    .ok_or_else(|| ConversionError::new(part, target(), "unknown flag"))?;
                if index >= u64::BITS as usize {
                    return Err(ConversionError::new(part, target(), "too many flags"));
                }
                bits |= 1 << index;
            }
        }
        Ok(Value::Flags(bits))
    }
}

/// Conversion with Rust's standard parsing rules.
///
/// Booleans additionally accept `yes`/`no`, `on`/`off` and `1`/`0`; choices
/// match case-insensitively and keep their declared spelling.
///
/// # Examples
///
/// ```
/// use verb_dispatch_binder::{DefaultConverter, ValueConverter};
/// use verb_dispatch_core::{Value, ValueType};
///
/// let converter = DefaultConverter;
/// assert_eq!(converter.convert("-3", &ValueType::Integer).unwrap(), Value::Integer(-3));
/// assert_eq!(converter.convert("Off", &ValueType::Bool).unwrap(), Value::Bool(false));
///
/// let level = ValueType::Choice(vec!["Debug".into(), "Info".into()]);
/// assert_eq!(converter.convert("info", &level).unwrap(), Value::Choice("Info".into()));
/// assert!(converter.convert("trace", &level).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl ValueConverter for DefaultConverter {
    fn convert(&self, raw: &str, target: &ValueType) -> Result<Value, ConversionError> {
        let fail = |reason: &dyn ToString| ConversionError::new(raw, target, reason.to_string());
        match target {
            ValueType::String => Ok(Value::String(raw.to_string())),
            ValueType::Integer => raw.parse().map(Value::Integer).map_err(|e| fail(&e)),
            ValueType::Unsigned => raw.parse().map(Value::Unsigned).map_err(|e| fail(&e)),
            ValueType::Float => raw.parse().map(Value::Float).map_err(|e| fail(&e)),
            ValueType::Bool => parse_bool(raw).map(Value::Bool).ok_or_else(|| fail(&"not a boolean")),
            ValueType::Char => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(fail(&"expected exactly one character")),
                }
            }
            ValueType::Path if raw.is_empty() => Err(fail(&"empty path")),
            ValueType::Path => Ok(Value::Path(PathBuf::from(raw))),
            ValueType::Choice(choices) => choices
                .iter()
                .find(|c| c.to_lowercase() == raw.to_lowercase())
                .map(|c| Value::Choice(c.clone()))
                .ok_or_else(|| fail(&"not a valid choice")),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_integer_conversion_error_keeps_value() {
        let err = DefaultConverter.convert("ten", &ValueType::Integer).unwrap_err();
        assert_eq!(err.value, "ten");
        assert_eq!(err.target, "integer");
        assert!(err.to_string().starts_with("cannot convert 'ten' to integer"));
    }

    #[test]
    fn test_unsigned_rejects_negative() {
        assert!(DefaultConverter.convert("-1", &ValueType::Unsigned).is_err());
        assert_eq!(
            DefaultConverter.convert("7", &ValueType::Unsigned).unwrap(),
            Value::Unsigned(7)
        );
    }

    #[test]
    fn test_char_requires_single_character() {
        assert_eq!(DefaultConverter.convert("x", &ValueType::Char).unwrap(), Value::Char('x'));
        assert!(DefaultConverter.convert("xy", &ValueType::Char).is_err());
    }

    #[test]
    fn test_flags_union_of_comma_and_repeat() {
        let flags = names(&["read", "write", "exec"]);
        let raws = names(&["read,exec", "WRITE"]);
        assert_eq!(DefaultConverter.convert_flags(&raws, &flags).unwrap(), Value::Flags(0b111));

        let raws = names(&["read", "read"]);
        assert_eq!(DefaultConverter.convert_flags(&raws, &flags).unwrap(), Value::Flags(0b001));
    }

    #[test]
    fn test_flags_unknown_name() {
        let flags = names(&["read"]);
        let err = DefaultConverter.convert_flags(&names(&["delete"]), &flags).unwrap_err();
        assert_eq!(err.value, "delete");
        assert_eq!(err.target, "flags (read)");
    }
}
