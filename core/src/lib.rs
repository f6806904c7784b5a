//! Verb and parameter model for command-line verb dispatch.
//!
//! This crate defines the read-only metadata the parser and binder work
//! against:
//!
//! - [`Verb`]: a named operation with bound and service parameters and an
//!   asynchronous body, declared through [`VerbBuilder`].
//! - [`Parameter`]: a command-line parameter whose [`ParameterKind`]
//!   determines its [`ValueArity`].
//! - [`ServiceParameter`]: a parameter resolved outside the command line
//!   (context, cancellation, nested verbs, dependencies).
//! - [`VerbSet`]: an ordered, overload-aware collection of verbs.
//! - [`Value`] / [`Invocation`]: what a verb body receives.
//! - [`VerbChain`]: cycle detection for nested verb-set delegation.
//!
//! Validation ([`validate_verb`], [`validate_verb_set`]) catches structural
//! errors such as duplicate parameter names or a misplaced variadic
//! collector.
//!
//! # Example
//!
//! ```
//! use verb_dispatch_core::*;
//!
//! let set = VerbSet::new([
//!     Verb::builder("copy")
//!         .description("Copy files")
//!         .parameter(Parameter::switch("force").with_alias('f'))
//!         .parameter(Parameter::list("files", ValueType::Path).variadic())
//!         .build(),
//! ]);
//!
//! let copy = set.find("COPY", CaseMode::Insensitive)[0];
//! assert_eq!(copy.find_parameter("f", OptionForm::Short, CaseMode::Sensitive).unwrap().name, "force");
//! assert_eq!(copy.variadic_parameter().unwrap().arity(), ValueArity::ZeroOrMany);
//! assert!(validate_verb_set(&set).is_empty());
//! ```

mod arity;
mod chain;
mod invoke;
mod types;
mod validate;
mod value;

pub use arity::{ArityError, CaseMode, OptionForm, ValueArity};
pub use chain::{ChainError, VerbChain};
pub use invoke::{
    Argument, Invocation, InvocationContext, Invoker, Service, SubVerbRunner, SubVerbs,
    VerbError, VerbFuture, VerbResult,
};
pub use types::*;
pub use validate::{ValidationError, validate_verb, validate_verb_set};
pub use value::{ArgumentError, FromValue, Value};

/// Re-exported so verb bodies and hosts share one cancellation type.
pub use tokio_util::sync::CancellationToken;
