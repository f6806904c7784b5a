//! Binding the command line to one candidate verb.
//!
//! Every bound parameter is resolved independently and its outcome recorded
//! as a [`ParameterBinding`]; one failing parameter never stops the others
//! from being checked, so a failed candidate still carries a complete
//! diagnostic.
//!
//! Sources, in order of preference:
//!
//! 1. options: `--name` and the short forms (`-n`, alias or single-letter
//!    name), merged when both are given;
//! 2. the positional value at the parameter's declared position, when no
//!    option supplied it;
//! 3. for the variadic collector, every positional value nobody else took;
//! 4. the declared default, the implicit value of switches and counters, or
//!    [`Value::Absent`] for optional parameters.

use std::sync::Arc;

use thiserror::Error;
use verb_dispatch_core::{
    ArityError, OptionForm, Parameter, ParameterKind, Value, ValueType, Verb,
};
use verb_dispatch_parser::{ParsedArguments, ParserOptions, TokenKind, aggregate, scan};

use crate::convert::{ConversionError, ValueConverter};

/// Why a single parameter failed to bind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    /// Wrong number of raw values.
    #[error("parameter '{name}' {source}")]
    Arity { name: String, source: ArityError },
    /// Required parameter without any source.
    #[error("missing required parameter '{name}'")]
    Missing { name: String },
    /// A raw value did not convert to the declared type.
    #[error("invalid value for parameter '{name}': {source}")]
    Conversion {
        name: String,
        source: ConversionError,
    },
}

/// Where a parameter's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// `--name` or `-n`.
    Named,
    /// One or more positional values.
    Positional,
    /// The declared default.
    Default,
    /// Nothing; the implicit value or a failure.
    Unset,
}

/// Outcome of binding one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBinding {
    /// Declared parameter name.
    pub name: String,
    /// Where the value came from.
    pub source: ValueSource,
    /// Converted value or the reason it could not be produced.
    pub result: Result<Value, ParameterError>,
}

impl ParameterBinding {
    /// Returns `true` if a value was produced.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-parameter outcome of binding one verb.
#[derive(Debug, Clone)]
pub struct CandidateBinding {
    /// The candidate.
    pub verb: Arc<Verb>,
    /// One entry per bound parameter, in declaration order.
    pub parameters: Vec<ParameterBinding>,
    /// Options that match no parameter.
    pub unrecognized: Vec<String>,
    /// Positional values no parameter took.
    pub surplus: Vec<String>,
    /// A help token was seen.
    pub help_requested: bool,
    /// Raw arguments bound against this verb.
    pub arguments: Vec<String>,
    /// Raw arguments left for a nested verb set.
    pub remaining: Vec<String>,
}

impl CandidateBinding {
    /// Returns `true` if every parameter bound and nothing was left over.
    pub fn is_bound(&self) -> bool {
        self.unrecognized.is_empty()
            && self.surplus.is_empty()
            && self.parameters.iter().all(ParameterBinding::is_ok)
    }

    /// Number of parameters that bound successfully.
    pub fn score(&self) -> usize {
        self.parameters.iter().filter(|p| p.is_ok()).count()
    }

    /// Failed parameters and their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ParameterError)> {
        self.parameters
            .iter()
            .filter_map(|p| p.result.as_ref().err().map(|e| (p.name.as_str(), e)))
    }

    /// Successfully converted values in declaration order.
    pub(crate) fn values(&self) -> impl Iterator<Item = &Value> {
        self.parameters.iter().filter_map(|p| p.result.as_ref().ok())
    }
}

#[derive(Default)]
struct Occurrence {
    count: usize,
    values: Vec<String>,
}

/// Binds `arguments` against `verb`.
pub(crate) fn bind_candidate(
    verb: &Arc<Verb>,
    arguments: &[String],
    options: &ParserOptions,
    converter: &dyn ValueConverter,
) -> CandidateBinding {
    let arity_of = |name: &str, form: OptionForm| {
        verb.find_parameter(name, form, case_of(options, form))
            .map(Parameter::arity)
    };

    let mut tokens = scan(arguments, options, arity_of);
    let mut bound = arguments.to_vec();
    let mut remaining = Vec::new();
    if verb.has_sub_verbs() {
        // A value inside a bundle (`-v5`) stays with the bundle's argument.
        let split = tokens.iter().enumerate().position(|(at, t)| {
            t.kind == TokenKind::Value && (at == 0 || tokens[at - 1].index != t.index)
        });
        if let Some(at) = split {
            let index = tokens[at].index;
            tokens.truncate(at);
            remaining = bound.split_off(index);
        }
    }

    let parsed = aggregate(&tokens, options);
    let positional = parsed.positional();
    let mut claimed = vec![false; positional.len()];
    let mut found: Vec<(ValueSource, Option<Occurrence>)> = Vec::with_capacity(verb.parameters.len());
    for parameter in &verb.parameters {
        let named = named_occurrence(parameter, &parsed, options);
        if named.is_some() {
            found.push((ValueSource::Named, named));
            continue;
        }
        let value = if parameter.variadic || !takes_positional(parameter) {
            None
        } else {
            positional.get(parameter.position)
        };
        match value {
            Some(value) => {
                claimed[parameter.position] = true;
                let occurrence = Occurrence {
                    count: 1,
                    values: vec![value.clone()],
                };
                found.push((ValueSource::Positional, Some(occurrence)));
            }
            None => found.push((ValueSource::Unset, None)),
        }
    }

    let mut unclaimed: Vec<String> = positional
        .iter()
        .zip(&claimed)
        .filter(|(_, taken)| !**taken)
        .map(|(value, _)| value.clone())
        .collect();
    if let Some(at) = verb.parameters.iter().position(|p| p.variadic) {
        let rest = std::mem::take(&mut unclaimed);
        match &mut found[at] {
            (_, Some(occurrence)) => occurrence.values.extend(rest),
            (source, slot) if !rest.is_empty() => {
                *source = ValueSource::Positional;
                *slot = Some(Occurrence { count: 1, values: rest });
            }
            _ => {}
        }
    }

    let parameters = verb
        .parameters
        .iter()
        .zip(found)
        .map(|(parameter, (source, occurrence))| match occurrence {
            Some(occurrence) => ParameterBinding {
                name: parameter.name.clone(),
                source,
                result: convert_occurrence(parameter, occurrence, converter),
            },
            None => unset_binding(parameter),
        })
        .collect();

    CandidateBinding {
        verb: Arc::clone(verb),
        parameters,
        unrecognized: unrecognized_options(verb, &parsed, options),
        surplus: unclaimed,
        help_requested: parsed.help_requested(),
        arguments: bound,
        remaining,
    }
}

fn case_of(options: &ParserOptions, form: OptionForm) -> verb_dispatch_core::CaseMode {
    match form {
        OptionForm::Short => options.short_case,
        OptionForm::Long => options.long_case,
    }
}

fn takes_positional(parameter: &Parameter) -> bool {
    matches!(
        parameter.kind,
        ParameterKind::Single(_) | ParameterKind::List(_) | ParameterKind::Flags(_)
    )
}

fn named_occurrence(
    parameter: &Parameter,
    parsed: &ParsedArguments,
    options: &ParserOptions,
) -> Option<Occurrence> {
    let long = parsed.long().get(&parameter.name);
    let short = parsed
        .short()
        .iter()
        .filter(|o| parameter.matches(&o.name, OptionForm::Short, options.short_case));

    let mut found: Option<Occurrence> = None;
    for option in long.into_iter().chain(short) {
        let occurrence = found.get_or_insert_with(Occurrence::default);
        occurrence.count += option.count;
        occurrence.values.extend(option.values.iter().cloned());
    }
    found
}

fn unrecognized_options(verb: &Verb, parsed: &ParsedArguments, options: &ParserOptions) -> Vec<String> {
    let long = parsed
        .long()
        .iter()
        .filter(|o| verb.find_parameter(&o.name, OptionForm::Long, options.long_case).is_none());
    let short = parsed
        .short()
        .iter()
        .filter(|o| verb.find_parameter(&o.name, OptionForm::Short, options.short_case).is_none());
    long.chain(short).map(|o| o.name.clone()).collect()
}

fn unset_binding(parameter: &Parameter) -> ParameterBinding {
    let name = parameter.name.clone();
    if let Some(default) = &parameter.default {
        return ParameterBinding {
            name,
            source: ValueSource::Default,
            result: Ok(default.clone()),
        };
    }

    let result = match parameter.kind {
        ParameterKind::Switch => Ok(Value::Bool(false)),
        ParameterKind::Counter => Ok(Value::Count(0)),
        _ if parameter.optional => Ok(Value::Absent),
        _ => Err(ParameterError::Missing { name: name.clone() }),
    };
    ParameterBinding {
        name,
        source: ValueSource::Unset,
        result,
    }
}

fn convert_occurrence(
    parameter: &Parameter,
    occurrence: Occurrence,
    converter: &dyn ValueConverter,
) -> Result<Value, ParameterError> {
    let name = || parameter.name.clone();
    let convert = |raw: &str, ty: &ValueType| {
        converter
            .convert(raw, ty)
            .map_err(|source| ParameterError::Conversion { name: name(), source })
    };

    // Counters take their occurrence count; any values are ignored.
    if parameter.kind != ParameterKind::Counter {
        parameter
            .arity()
            .check(occurrence.values.len())
            .map_err(|source| ParameterError::Arity { name: name(), source })?;
    }

    match &parameter.kind {
        ParameterKind::Counter => Ok(Value::Count(occurrence.count)),
        ParameterKind::Switch => match occurrence.values.first() {
            Some(raw) => convert(raw.as_str(), &ValueType::Bool),
            None => Ok(Value::Bool(true)),
        },
        ParameterKind::Single(ty) => match occurrence.values.first() {
            Some(raw) => convert(raw.as_str(), ty),
            None => Err(ParameterError::Arity {
                name: name(),
                source: ArityError::RequiresValue,
            }),
        },
        ParameterKind::List(ty) => occurrence
            .values
            .iter()
            .map(|raw| convert(raw.as_str(), ty))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        ParameterKind::Flags(names) => converter
            .convert_flags(&occurrence.values, names)
            .map_err(|source| ParameterError::Conversion { name: name(), source }),
    }
}
