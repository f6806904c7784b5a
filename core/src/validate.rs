//! Verb declaration validation.
//!
//! Declarations are plain data and can be assembled freely; these checks
//! catch structural mistakes (duplicate names, a misplaced variadic
//! collector, defaults of the wrong type) before they turn into confusing
//! binding results.
//!
//! # Examples
//!
//! ```
//! use verb_dispatch_core::*;
//!
//! let set = VerbSet::new([Verb::builder("add")
//!     .parameter(Parameter::single("a", ValueType::Integer))
//!     .parameter(Parameter::single("b", ValueType::Integer))
//!     .build()]);
//! assert!(validate_verb_set(&set).is_empty());
//!
//! // Invalid: two parameters answer to `-a`
//! let bad = VerbSet::new([Verb::builder("add")
//!     .parameter(Parameter::single("a", ValueType::Integer))
//!     .parameter(Parameter::single("all", ValueType::Integer).with_alias('a'))
//!     .build()]);
//! assert!(!validate_verb_set(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::types::{Parameter, ParameterKind, ServiceKind, ValueType, Verb, VerbSet};
use crate::value::Value;

/// Declaration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Verb name is empty or whitespace-only.
    #[error("verb name cannot be empty")]
    EmptyVerbName,
    /// Parameter name is empty.
    #[error("verb '{verb}' has a parameter with an empty name")]
    EmptyParameterName { verb: String },
    /// Parameter name cannot be written as an option.
    #[error("verb '{verb}': invalid parameter name '{name}'")]
    InvalidParameterName { verb: String, name: String },
    /// Two parameters share a long name.
    #[error("verb '{verb}': duplicate parameter '{name}'")]
    DuplicateParameter { verb: String, name: String },
    /// Two parameters answer to the same short name.
    #[error("verb '{verb}': duplicate short alias '-{alias}'")]
    DuplicateAlias { verb: String, alias: char },
    /// More than one variadic collector.
    #[error("verb '{verb}' declares more than one variadic parameter")]
    MultipleVariadic { verb: String },
    /// Variadic collector followed by other bound parameters.
    #[error("verb '{verb}': variadic parameter '{name}' must be the last bound parameter")]
    VariadicNotLast { verb: String, name: String },
    /// Variadic collector that cannot hold several values.
    #[error("verb '{verb}': variadic parameter '{name}' must be a list")]
    VariadicNotList { verb: String, name: String },
    /// Default value does not fit the parameter kind.
    #[error("verb '{verb}': default for '{name}' does not match its type")]
    DefaultTypeMismatch { verb: String, name: String },
    /// More than one sub-verb service.
    #[error("verb '{verb}' requests nested verbs more than once")]
    MultipleSubVerbs { verb: String },
    /// Two overloads with the same name and the same bound signature.
    #[error("duplicate overload of verb '{0}'")]
    DuplicateOverload(String),
}

/// Validates a whole verb set.
///
/// Each verb is checked with [`validate_verb`]; overloads are additionally
/// checked for identical signatures, which could never be told apart.
pub fn validate_verb_set(set: &VerbSet) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut signatures: HashSet<(String, Vec<ParameterKind>)> = HashSet::new();

    for verb in set.iter() {
        errors.extend(validate_verb(verb));
        if !errors.is_empty() {
            return errors;
        }

        let signature = (
            verb.name.to_lowercase(),
            verb.parameters.iter().map(|p| p.kind.clone()).collect(),
        );
        if !signatures.insert(signature) {
            errors.push(ValidationError::DuplicateOverload(verb.name.clone()));
            return errors;
        }
    }

    errors
}

/// Validates a single verb declaration.
pub fn validate_verb(verb: &Verb) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if verb.name.trim().is_empty() {
        errors.push(ValidationError::EmptyVerbName);
        return errors;
    }

    errors.extend(validate_parameters(verb));
    if !errors.is_empty() {
        return errors;
    }

    let sub_verbs = verb
        .services
        .iter()
        .filter(|s| s.kind == ServiceKind::SubVerbs)
        .count();
    if sub_verbs > 1 {
        errors.push(ValidationError::MultipleSubVerbs {
            verb: verb.name.clone(),
        });
    }

    errors
}

fn validate_parameters(verb: &Verb) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();
    let mut aliases = HashSet::new();
    let name = || verb.name.clone();

    for (index, parameter) in verb.parameters.iter().enumerate() {
        if parameter.name.is_empty() {
            errors.push(ValidationError::EmptyParameterName { verb: name() });
            return errors;
        }
        if parameter.name.starts_with('-')
            || parameter.name.contains(|c: char| c.is_whitespace() || c == '=')
        {
            errors.push(ValidationError::InvalidParameterName {
                verb: name(),
                name: parameter.name.clone(),
            });
            return errors;
        }
        if !names.insert(parameter.name.as_str()) {
            errors.push(ValidationError::DuplicateParameter {
                verb: name(),
                name: parameter.name.clone(),
            });
            return errors;
        }

        let short = parameter.alias.into_iter().chain(single_letter(&parameter.name));
        for alias in short.collect::<HashSet<_>>() {
            if !aliases.insert(alias) {
                errors.push(ValidationError::DuplicateAlias {
                    verb: name(),
                    alias,
                });
                return errors;
            }
        }

        if parameter.variadic {
            if !matches!(parameter.kind, ParameterKind::List(_)) {
                errors.push(ValidationError::VariadicNotList {
                    verb: name(),
                    name: parameter.name.clone(),
                });
                return errors;
            }
            if verb.parameters[index + 1..].iter().any(|p| p.variadic) {
                errors.push(ValidationError::MultipleVariadic { verb: name() });
                return errors;
            }
            if index + 1 != verb.parameters.len() {
                errors.push(ValidationError::VariadicNotLast {
                    verb: name(),
                    name: parameter.name.clone(),
                });
                return errors;
            }
        }

        if let Some(default) = &parameter.default {
            if !default_fits(parameter, default) {
                errors.push(ValidationError::DefaultTypeMismatch {
                    verb: name(),
                    name: parameter.name.clone(),
                });
                return errors;
            }
        }
    }

    errors
}

fn single_letter(name: &str) -> Option<char> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn default_fits(parameter: &Parameter, default: &Value) -> bool {
    match (&parameter.kind, default) {
        (_, Value::Absent) => true,
        (ParameterKind::Switch, Value::Bool(_)) => true,
        (ParameterKind::Counter, Value::Count(_)) => true,
        (ParameterKind::Flags(_), Value::Flags(_)) => true,
        (ParameterKind::Single(ty), value) => scalar_fits(ty, value),
        (ParameterKind::List(ty), Value::List(items)) => items.iter().all(|v| scalar_fits(ty, v)),
        _ => false,
    }
}

fn scalar_fits(ty: &ValueType, value: &Value) -> bool {
    matches!(
        (ty, value),
        (ValueType::String, Value::String(_))
            | (ValueType::Integer, Value::Integer(_))
            | (ValueType::Unsigned, Value::Unsigned(_))
            | (ValueType::Float, Value::Float(_))
            | (ValueType::Bool, Value::Bool(_))
            | (ValueType::Char, Value::Char(_))
            | (ValueType::Path, Value::Path(_))
            | (ValueType::Choice(_), Value::Choice(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ServiceParameter, ValueType};

    #[test]
    fn test_validate_rejects_variadic_not_last() {
        let verb = Verb::builder("cp")
            .parameter(Parameter::list("sources", ValueType::Path).variadic())
            .parameter(Parameter::single("dest", ValueType::Path))
            .build();

        assert_eq!(
            validate_verb(&verb),
            vec![ValidationError::VariadicNotLast {
                verb: "cp".to_string(),
                name: "sources".to_string()
            }]
        );
    }

    #[test]
    fn test_validate_rejects_scalar_variadic() {
        let verb = Verb::builder("echo")
            .parameter(Parameter::single("text", ValueType::String).variadic())
            .build();

        assert!(matches!(
            validate_verb(&verb)[..],
            [ValidationError::VariadicNotList { .. }]
        ));
    }

    #[test]
    fn test_validate_rejects_alias_clashing_with_single_letter_name() {
        let verb = Verb::builder("ls")
            .parameter(Parameter::switch("a"))
            .parameter(Parameter::switch("all").with_alias('a'))
            .build();

        assert_eq!(
            validate_verb(&verb),
            vec![ValidationError::DuplicateAlias {
                verb: "ls".to_string(),
                alias: 'a'
            }]
        );
    }

    #[test]
    fn test_validate_rejects_mistyped_default() {
        let verb = Verb::builder("serve")
            .parameter(Parameter::single("port", ValueType::Unsigned).with_default(Value::String("80".into())))
            .build();

        assert!(matches!(
            validate_verb(&verb)[..],
            [ValidationError::DefaultTypeMismatch { .. }]
        ));
    }

    #[test]
    fn test_validate_rejects_double_sub_verbs() {
        let verb = Verb::builder("remote")
            .service(ServiceParameter::new("a", ServiceKind::SubVerbs))
            .service(ServiceParameter::new("b", ServiceKind::SubVerbs))
            .build();

        assert_eq!(
            validate_verb(&verb),
            vec![ValidationError::MultipleSubVerbs {
                verb: "remote".to_string()
            }]
        );
    }

    #[test]
    fn test_validate_set_rejects_identical_overloads() {
        let set = VerbSet::new([
            Verb::builder("find").parameter(Parameter::single("a", ValueType::String)).build(),
            Verb::builder("find").parameter(Parameter::single("b", ValueType::String)).build(),
        ]);

        assert_eq!(
            validate_verb_set(&set),
            vec![ValidationError::DuplicateOverload("find".to_string())]
        );
    }

    #[test]
    fn test_validate_set_accepts_distinct_overloads() {
        let set = VerbSet::new([
            Verb::builder("find").parameter(Parameter::single("a", ValueType::String)).build(),
            Verb::builder("find")
                .parameter(Parameter::single("a", ValueType::String))
                .parameter(Parameter::single("b", ValueType::String))
                .build(),
        ]);

        assert!(validate_verb_set(&set).is_empty());
    }
}
