//! Selecting the verb to bind.
//!
//! A tentative scan, with every option taken as `ZeroOrOne`, decides whether
//! the first argument names a verb and whether help was requested. Then:
//!
//! 1. a named verb binds the remaining arguments; if no overload binds and
//!    its own scan saw a help token, help replaces the failure;
//! 2. otherwise a configured default verb binds the whole argument list,
//!    unless help was requested;
//! 3. otherwise help without a verb, an unknown verb, or no verb at all.
//!
//! Overloads are tried in declaration order and the first one that binds
//! wins. When none does, the best-scoring failure is kept for diagnostics.

use std::cmp::Reverse;
use std::sync::Arc;

use tracing::debug;
use verb_dispatch_core::{ValueArity, Verb, VerbSet};
use verb_dispatch_parser::{ParserOptions, TokenKind, scan};

use crate::binding::{CandidateBinding, bind_candidate};
use crate::convert::ValueConverter;
use crate::dispatch::DispatchOptions;
use crate::report::BindFailure;

/// Result of verb selection, before services are resolved.
#[derive(Debug)]
pub(crate) enum Resolution {
    Bound(CandidateBinding),
    Failed(BindFailure),
    Help(Option<Arc<Verb>>),
    NoVerb,
}

pub(crate) fn resolve(
    verbs: &VerbSet,
    arguments: &[String],
    options: &DispatchOptions,
    converter: &dyn ValueConverter,
) -> Resolution {
    let tokens = scan(arguments, &options.parser, |_, _| Some(ValueArity::ZeroOrOne));
    let help = tokens.iter().any(|t| t.kind == TokenKind::HelpOption);
    let verb_name = tokens
        .first()
        .filter(|t| t.kind == TokenKind::Value && t.index == 0)
        .map(|t| t.text.as_str());

    if let Some(name) = verb_name {
        let candidates = verbs.find(name, options.verb_case);
        if !candidates.is_empty() {
            return bind_named(name, &candidates, &arguments[1..], &options.parser, converter);
        }
    }

    if !help {
        if let Some(default) = &options.default_verb {
            let candidates = verbs.find(default, options.verb_case);
            if !candidates.is_empty() {
                return bind_named(default, &candidates, arguments, &options.parser, converter);
            }
        }
    }

    if help {
        debug!("Help requested without a verb");
        return Resolution::Help(None);
    }

    match tokens.iter().find(|t| t.kind == TokenKind::Value) {
        Some(token) => {
            debug!(verb = %token.text, "Unknown verb");
            Resolution::Failed(BindFailure {
                requested: token.text.clone(),
                best_match: None,
            })
        }
        None => Resolution::NoVerb,
    }
}

fn bind_named(
    requested: &str,
    candidates: &[&Arc<Verb>],
    arguments: &[String],
    parser: &ParserOptions,
    converter: &dyn ValueConverter,
) -> Resolution {
    let mut failures = Vec::with_capacity(candidates.len());
    let mut help: Option<&Arc<Verb>> = None;

    for (overload, verb) in candidates.iter().enumerate() {
        let binding = bind_candidate(verb, arguments, parser, converter);
        if binding.is_bound() {
            debug!(verb = %verb.name, overload, "Candidate bound");
            return Resolution::Bound(binding);
        }
        debug!(
            verb = %verb.name,
            overload,
            score = binding.score(),
            unrecognized = binding.unrecognized.len(),
            surplus = binding.surplus.len(),
            "Candidate failed to bind"
        );
        if binding.help_requested && help.is_none() {
            help = Some(*verb);
        }
        failures.push(binding);
    }

    if let Some(verb) = help {
        debug!(verb = %verb.name, "Help requested");
        return Resolution::Help(Some(Arc::clone(verb)));
    }

    let best_match = failures
        .into_iter()
        .enumerate()
        .max_by_key(|(overload, binding)| (binding.score(), Reverse(*overload)))
        .map(|(_, binding)| binding);
    if let Some(best) = &best_match {
        debug!(verb = %best.verb.name, score = best.score(), "Selected best match");
    }

    Resolution::Failed(BindFailure {
        requested: requested.to_string(),
        best_match,
    })
}
