//! Bind-failure diagnostics and nested outcome reporting.

use std::fmt;

use tracing::{info, warn};
use verb_dispatch_core::VerbChain;

use crate::binding::CandidateBinding;
use crate::dispatch::RunOutcome;

/// Why no verb could be bound.
///
/// `best_match` is the same-named candidate with the most successfully bound
/// parameters (earliest declared on ties); it is `None` when the requested
/// name matched no verb at all.
#[derive(Debug, Clone)]
pub struct BindFailure {
    /// Verb name as requested on the command line.
    pub requested: String,
    /// Closest candidate, for diagnostics.
    pub best_match: Option<CandidateBinding>,
}

impl BindFailure {
    /// Names of the parameters that failed in the best match.
    pub fn failed_parameters(&self) -> Vec<&str> {
        self.best_match
            .iter()
            .flat_map(|c| c.failures().map(|(name, _)| name))
            .collect()
    }
}

impl fmt::Display for BindFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(candidate) = &self.best_match else {
            return write!(f, "unknown verb '{}'", self.requested);
        };

        write!(f, "could not bind verb '{}'", candidate.verb.name)?;
        for (_, error) in candidate.failures() {
            write!(f, "\n  {error}")?;
        }
        for option in &candidate.unrecognized {
            write!(f, "\n  unrecognized option '{option}'")?;
        }
        for value in &candidate.surplus {
            write!(f, "\n  unexpected value '{value}'")?;
        }
        Ok(())
    }
}

/// Turns a nested run that did not complete into an exit code.
///
/// The root caller sees nested outcomes only through the exit code returned
/// by the delegating verb, so they are reported here instead.
pub trait OutcomeReporter: Send + Sync {
    /// Reports `outcome` of a nested run under `chain` and returns its exit
    /// code.
    fn report(&self, outcome: &RunOutcome, chain: &VerbChain) -> i32;
}

/// Reports nested outcomes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl OutcomeReporter for LogReporter {
    fn report(&self, outcome: &RunOutcome, chain: &VerbChain) -> i32 {
        let parent = chain.path();
        match outcome {
            RunOutcome::Completed(_) => {}
            RunOutcome::HelpRequested(verb) => {
                let verb = verb.as_ref().map(|v| v.name.as_str());
                info!(parent = %parent, verb = ?verb, "Help requested for nested verb");
            }
            RunOutcome::FailedToBind(failure) => {
                warn!(parent = %parent, "{failure}");
            }
            RunOutcome::NoVerbSpecified => {
                warn!(parent = %parent, "No nested verb specified");
            }
        }
        outcome.exit_code()
    }
}
