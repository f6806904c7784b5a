//! Verb resolution, parameter binding and invocation.
//!
//! [`Dispatcher`] is the entry point. Given a [`VerbSet`](verb_dispatch_core::VerbSet)
//! and a raw argument vector it:
//!
//! 1. picks the verb named by the first argument (or the default verb);
//! 2. binds every bound parameter of each same-named overload, recording a
//!    per-parameter result instead of stopping at the first error;
//! 3. resolves service parameters (context, cancellation, nested verbs,
//!    dependencies from a [`ServiceProvider`]) and the target instance;
//! 4. invokes the verb body and returns its exit code.
//!
//! Binding failures are data ([`BindOutcome::FailedToBind`] with the
//! best-matching candidate); only unresolvable services and delegation
//! cycles are errors ([`DispatchError`]).
//!
//! # Example
//!
//! ```
//! use verb_dispatch_binder::{BindOutcome, Dispatcher};
//! use verb_dispatch_core::{Parameter, ValueType, Verb, VerbSet};
//!
//! let verbs = VerbSet::new([Verb::builder("scale")
//!     .parameter(Parameter::single("x", ValueType::Float))
//!     .build()]);
//!
//! let outcome = Dispatcher::default().bind(&verbs, &["scale"]).unwrap();
//! let BindOutcome::FailedToBind(failure) = outcome else { panic!() };
//! assert_eq!(failure.failed_parameters(), vec!["x"]);
//! assert_eq!(
//!     failure.to_string(),
//!     "could not bind verb 'scale'\n  missing required parameter 'x'"
//! );
//! ```

mod binding;
mod convert;
mod dispatch;
mod report;
mod resolve;
mod services;

pub use binding::{CandidateBinding, ParameterBinding, ParameterError, ValueSource};
pub use convert::{ConversionError, DefaultConverter, ValueConverter};
pub use dispatch::{BindOutcome, BoundCall, DispatchError, DispatchOptions, Dispatcher, RunOutcome};
pub use report::{BindFailure, LogReporter, OutcomeReporter};
pub use services::{ServiceProvider, ServiceRegistry};
