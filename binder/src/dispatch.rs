//! Binding and invoking verbs.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use verb_dispatch_core::{
    Argument, CancellationToken, CaseMode, ChainError, Invocation, InvocationContext, Service,
    ServiceKind, SubVerbRunner, SubVerbs, Target, Verb, VerbChain, VerbError, VerbFuture,
    VerbSet,
};
use verb_dispatch_parser::ParserOptions;

use crate::binding::CandidateBinding;
use crate::convert::{DefaultConverter, ValueConverter};
use crate::report::{BindFailure, LogReporter, OutcomeReporter};
use crate::resolve::{Resolution, resolve};
use crate::services::{ServiceProvider, ServiceRegistry};

/// Dispatcher configuration.
///
/// # Example (YAML)
///
/// ```yaml
/// verb_case: insensitive
/// default_verb: status
/// parser:
///   long_case: insensitive
///   unknown_options_as_values: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchOptions {
    /// Lexical conventions for scanning.
    pub parser: ParserOptions,
    /// Case mode for verb names and aliases.
    pub verb_case: CaseMode,
    /// Verb to bind when the first argument names no verb.
    pub default_verb: Option<String>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            parser: ParserOptions::default(),
            verb_case: CaseMode::Insensitive,
            default_verb: None,
        }
    }
}

/// Fatal dispatch errors.
///
/// Unlike a [`BindFailure`], these are never recovered from by trying another
/// candidate; they propagate unchanged through nested runs.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A required service parameter had no registered service.
    #[error("verb '{verb}' requires service '{service}', which is not registered")]
    ServiceUnresolved { verb: String, service: String },
    /// The target instance of an instance verb is not registered.
    #[error("verb '{verb}' requires target instance '{key}', which is not registered")]
    TargetUnresolved { verb: String, key: String },
    /// A verb delegated back into itself.
    #[error(transparent)]
    CyclicDelegation(#[from] ChainError),
    /// The verb body returned an error.
    #[error("verb '{verb}' failed: {source}")]
    VerbFailed { verb: String, source: VerbError },
}

/// A verb with every argument slot filled, ready to invoke.
#[derive(Clone)]
pub struct BoundCall {
    /// The selected verb (overload).
    pub verb: Arc<Verb>,
    /// Target instance for instance verbs.
    pub target: Option<Service>,
    /// Arguments in slot order.
    pub arguments: Vec<Argument>,
}

impl fmt::Debug for BoundCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundCall")
            .field("verb", &self.verb.name)
            .field("target", &self.target.is_some())
            .field("arguments", &self.arguments)
            .finish()
    }
}

impl BoundCall {
    /// Converts into the invocation handed to the verb body.
    pub fn into_invocation(self) -> Invocation {
        Invocation {
            verb: self.verb,
            target: self.target,
            arguments: self.arguments,
        }
    }

    /// Calls the verb body.
    pub fn invoke(self) -> VerbFuture {
        let verb = Arc::clone(&self.verb);
        verb.invoke(self.into_invocation())
    }
}

/// Result of [`Dispatcher::bind`].
#[derive(Debug)]
pub enum BindOutcome {
    /// A verb bound successfully.
    Bound(BoundCall),
    /// No candidate bound; carries the diagnostic.
    FailedToBind(BindFailure),
    /// A help token was given; `verb` is set when a verb was named.
    HelpRequested { verb: Option<Arc<Verb>> },
    /// The argument list named no verb.
    NoVerbSpecified,
}

/// Result of [`Dispatcher::run`].
#[derive(Debug)]
pub enum RunOutcome {
    /// The verb ran and returned this exit code.
    Completed(i32),
    /// Help was requested, for the named verb if any.
    HelpRequested(Option<Arc<Verb>>),
    /// No candidate bound.
    FailedToBind(BindFailure),
    /// The argument list named no verb.
    NoVerbSpecified,
}

impl RunOutcome {
    /// Process exit code for this outcome.
    ///
    /// # Examples
    ///
    /// ```
    /// use verb_dispatch_binder::RunOutcome;
    ///
    /// assert_eq!(RunOutcome::Completed(3).exit_code(), 3);
    /// assert_eq!(RunOutcome::HelpRequested(None).exit_code(), 0);
    /// assert_eq!(RunOutcome::NoVerbSpecified.exit_code(), 1);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed(code) => *code,
            Self::HelpRequested(_) => 0,
            Self::FailedToBind(_) | Self::NoVerbSpecified => 1,
        }
    }
}

/// Binds argument vectors to verbs and invokes them.
///
/// Cloning is cheap; clones share the converter, services, reporter and
/// cancellation token.
///
/// # Examples
///
/// ```
/// use verb_dispatch_binder::{DispatchOptions, Dispatcher, RunOutcome};
/// use verb_dispatch_core::{Parameter, ValueType, Verb, VerbSet};
///
/// let verbs = VerbSet::new([Verb::builder("add")
///     .parameter(Parameter::single("a", ValueType::Integer))
///     .parameter(Parameter::single("b", ValueType::Integer))
///     .handler(|call| async move {
///         let sum: i64 = call.get::<i64>("a")? + call.get::<i64>("b")?;
///         Ok(i32::try_from(sum)?)
///     })
///     .build()]);
///
/// let dispatcher = Dispatcher::new(DispatchOptions::default());
/// let outcome = futures::executor::block_on(dispatcher.run(&verbs, &["add", "--a", "1", "--b", "2"]));
/// assert!(matches!(outcome, Ok(RunOutcome::Completed(3))));
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    options: Arc<DispatchOptions>,
    converter: Arc<dyn ValueConverter>,
    services: Arc<dyn ServiceProvider>,
    reporter: Arc<dyn OutcomeReporter>,
    cancellation: CancellationToken,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("options", &self.options)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatchOptions::default())
    }
}

impl Dispatcher {
    /// Creates a dispatcher with the default converter, an empty service
    /// registry, and log-based reporting.
    pub fn new(options: DispatchOptions) -> Self {
        Self {
            options: Arc::new(options),
            converter: Arc::new(DefaultConverter),
            services: Arc::new(ServiceRegistry::new()),
            reporter: Arc::new(LogReporter),
            cancellation: CancellationToken::new(),
        }
    }

    /// Replaces the value converter.
    pub fn with_converter(mut self, converter: impl ValueConverter + 'static) -> Self {
        self.converter = Arc::new(converter);
        self
    }

    /// Replaces the service provider.
    pub fn with_services(mut self, services: impl ServiceProvider + 'static) -> Self {
        self.services = Arc::new(services);
        self
    }

    /// Replaces the reporter for nested outcomes.
    pub fn with_reporter(mut self, reporter: impl OutcomeReporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// Sets the token handed to verbs that ask for cancellation.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Options used for every run.
    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Token handed to verbs that declare a cancellation parameter.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Selects and binds a verb without invoking it.
    ///
    /// Per-parameter failures are reported through
    /// [`BindOutcome::FailedToBind`]; only unresolvable services, targets and
    /// delegation cycles are errors.
    pub fn bind<S: AsRef<str>>(&self, verbs: &VerbSet, arguments: &[S]) -> Result<BindOutcome, DispatchError> {
        self.bind_in_chain(verbs, arguments, &VerbChain::new())
    }

    /// Like [`bind`](Self::bind), for a nested verb set entered through
    /// `chain`.
    pub fn bind_in_chain<S: AsRef<str>>(
        &self,
        verbs: &VerbSet,
        arguments: &[S],
        chain: &VerbChain,
    ) -> Result<BindOutcome, DispatchError> {
        let arguments: Vec<String> = arguments.iter().map(|a| a.as_ref().to_string()).collect();

        match resolve(verbs, &arguments, &self.options, self.converter.as_ref()) {
            Resolution::Bound(candidate) => {
                let call = self.complete(candidate, chain)?;
                debug!(verb = %call.verb.name, chain = %chain.path(), "Bound verb");
                Ok(BindOutcome::Bound(call))
            }
            Resolution::Failed(failure) => Ok(BindOutcome::FailedToBind(failure)),
            Resolution::Help(verb) => Ok(BindOutcome::HelpRequested { verb }),
            Resolution::NoVerb => Ok(BindOutcome::NoVerbSpecified),
        }
    }

    /// Binds and invokes a verb.
    ///
    /// Errors returned by a verb body become [`DispatchError::VerbFailed`],
    /// except fatal dispatch errors raised by nested runs, which are
    /// returned as they are.
    pub async fn run<S: AsRef<str>>(&self, verbs: &VerbSet, arguments: &[S]) -> Result<RunOutcome, DispatchError> {
        let arguments: Vec<String> = arguments.iter().map(|a| a.as_ref().to_string()).collect();
        self.run_in_chain(verbs, &arguments, VerbChain::new()).await
    }

    async fn run_in_chain(
        &self,
        verbs: &VerbSet,
        arguments: &[String],
        chain: VerbChain,
    ) -> Result<RunOutcome, DispatchError> {
        let outcome = self.bind_in_chain(verbs, arguments, &chain).inspect_err(|e| {
            warn!(error = %e, chain = %chain.path(), "Dispatch failed");
        })?;

        match outcome {
            BindOutcome::Bound(call) => {
                let verb = call.verb.name.clone();
                match call.invoke().await {
                    Ok(code) => Ok(RunOutcome::Completed(code)),
                    Err(error) => match error.downcast::<DispatchError>() {
                        Ok(fatal) => Err(*fatal),
                        Err(source) => {
                            warn!(verb = %verb, error = %source, "Verb failed");
                            Err(DispatchError::VerbFailed { verb, source })
                        }
                    },
                }
            }
            BindOutcome::FailedToBind(failure) => Ok(RunOutcome::FailedToBind(failure)),
            BindOutcome::HelpRequested { verb } => Ok(RunOutcome::HelpRequested(verb)),
            BindOutcome::NoVerbSpecified => Ok(RunOutcome::NoVerbSpecified),
        }
    }

    /// Fills service slots and resolves the target of a bound candidate.
    fn complete(&self, candidate: CandidateBinding, chain: &VerbChain) -> Result<BoundCall, DispatchError> {
        let verb = Arc::clone(&candidate.verb);
        let mut slots: Vec<Option<Argument>> = vec![None; verb.slot_count()];

        for (parameter, value) in verb.parameters.iter().zip(candidate.values()) {
            slots[parameter.slot] = Some(Argument::Value(value.clone()));
        }

        for service in &verb.services {
            let argument = match &service.kind {
                ServiceKind::Context => Argument::Context(InvocationContext {
                    verb: verb.name.clone(),
                    chain: chain.clone(),
                    arguments: candidate.arguments.clone(),
                }),
                ServiceKind::Cancellation => Argument::Cancellation(self.cancellation.clone()),
                ServiceKind::SubVerbs => {
                    let chain = chain.push(&verb)?;
                    Argument::SubVerbs(SubVerbs::new(
                        chain,
                        candidate.remaining.clone(),
                        Arc::new(self.clone()),
                    ))
                }
                ServiceKind::Dependency(key) => match self.services.resolve(key) {
                    Some(instance) => Argument::Service(Some(instance)),
                    None if service.optional => Argument::Service(None),
                    None => {
                        return Err(DispatchError::ServiceUnresolved {
                            verb: verb.name.clone(),
                            service: service.name.clone(),
                        });
                    }
                },
            };
            slots[service.slot] = Some(argument);
        }

        let target = match &verb.target {
            Target::Static => None,
            Target::Instance(key) => Some(self.services.resolve(key).ok_or_else(|| {
                DispatchError::TargetUnresolved {
                    verb: verb.name.clone(),
                    key: key.clone(),
                }
            })?),
        };

        Ok(BoundCall {
            verb,
            target,
            arguments: slots.into_iter().flatten().collect(),
        })
    }
}

impl SubVerbRunner for Dispatcher {
    fn run(&self, verbs: Arc<VerbSet>, arguments: Vec<String>, chain: VerbChain) -> VerbFuture {
        let dispatcher = self.clone();
        Box::pin(async move {
            match dispatcher.run_in_chain(&verbs, &arguments, chain.clone()).await {
                Ok(RunOutcome::Completed(code)) => Ok(code),
                Ok(other) => Ok(dispatcher.reporter.report(&other, &chain)),
                Err(fatal) => Err(VerbError::from(fatal)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use verb_dispatch_core::{Parameter, ServiceParameter, ValueType};

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: DispatchOptions =
            serde_json::from_str(r#"{"default_verb":"status","parser":{"long_case":"insensitive"}}"#).unwrap();
        assert_eq!(options.verb_case, CaseMode::Insensitive);
        assert_eq!(options.default_verb.as_deref(), Some("status"));
        assert_eq!(options.parser.long_case, CaseMode::Insensitive);
        assert_eq!(options.parser.option_breaks, vec!["--".to_string()]);
    }

    #[test]
    fn test_slots_follow_declaration_order() {
        let verbs = VerbSet::new([Verb::builder("copy")
            .parameter(Parameter::single("from", ValueType::Path))
            .service(ServiceParameter::new("ctx", ServiceKind::Context))
            .parameter(Parameter::single("to", ValueType::Path))
            .build()]);
        let Ok(BindOutcome::Bound(call)) = Dispatcher::default().bind(&verbs, &["copy", "a", "b"]) else {
            panic!("expected a bound call");
        };

        assert_eq!(call.arguments.len(), 3);
        assert!(matches!(call.arguments[1], Argument::Context(ref c) if c.arguments == ["a", "b"]));
        let invocation = call.into_invocation();
        assert_eq!(invocation.get::<std::path::PathBuf>("to").unwrap(), std::path::PathBuf::from("b"));
    }

    #[test]
    fn test_verb_error_becomes_verb_failed() {
        let verbs = VerbSet::new([Verb::builder("fail")
            .handler(|_| async { Err("disk full".into()) })
            .build()]);
        let err = block_on(Dispatcher::default().run(&verbs, &["fail"])).unwrap_err();
        assert_eq!(err.to_string(), "verb 'fail' failed: disk full");
    }

    #[test]
    fn test_optional_dependency_may_be_missing() {
        let verbs = VerbSet::new([Verb::builder("status")
            .service(ServiceParameter::new("db", ServiceKind::Dependency("db".into())).optional())
            .handler(|call| async move { Ok(if call.service::<String>("db").is_some() { 1 } else { 0 }) })
            .build()]);
        let outcome = block_on(Dispatcher::default().run(&verbs, &["status"])).unwrap();
        assert_eq!(outcome.exit_code(), 0);
    }
}
