//! Bound calls and the arguments handed to verb bodies.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::chain::VerbChain;
use crate::types::{ServiceKind, Verb, VerbSet};
use crate::value::{ArgumentError, FromValue, Value};

/// Error returned by a verb body.
pub type VerbError = Box<dyn std::error::Error + Send + Sync>;

/// Exit code or failure of a verb body.
pub type VerbResult = Result<i32, VerbError>;

/// Deferred result of a verb body.
pub type VerbFuture = BoxFuture<'static, VerbResult>;

/// Type-erased verb body.
pub type Invoker = Arc<dyn Fn(Invocation) -> VerbFuture + Send + Sync>;

/// Type-erased service or target instance.
pub type Service = Arc<dyn Any + Send + Sync>;

/// Information about the current call, available as a service.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Name of the bound verb.
    pub verb: String,
    /// Verbs entered before this one.
    pub chain: VerbChain,
    /// Raw arguments the verb was bound against.
    pub arguments: Vec<String>,
}

/// Runs a nested verb set on behalf of a parent verb.
///
/// Implemented by the dispatcher; verb bodies use it through [`SubVerbs`].
pub trait SubVerbRunner: Send + Sync {
    /// Binds and invokes `arguments` against `verbs` with `chain` as the
    /// delegation history.
    fn run(&self, verbs: Arc<VerbSet>, arguments: Vec<String>, chain: VerbChain) -> VerbFuture;
}

/// Handle for delegating the remaining arguments to a nested verb set.
#[derive(Clone)]
pub struct SubVerbs {
    chain: VerbChain,
    arguments: Vec<String>,
    runner: Arc<dyn SubVerbRunner>,
}

impl fmt::Debug for SubVerbs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubVerbs")
            .field("chain", &self.chain)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

impl SubVerbs {
    /// Creates a handle; `chain` already contains the delegating verb.
    pub fn new(chain: VerbChain, arguments: Vec<String>, runner: Arc<dyn SubVerbRunner>) -> Self {
        Self {
            chain,
            arguments,
            runner,
        }
    }

    /// Delegation history including the delegating verb.
    pub fn chain(&self) -> &VerbChain {
        &self.chain
    }

    /// Arguments left for the nested verb set.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Dispatches the remaining arguments into `verbs`.
    pub fn run(self, verbs: impl Into<Arc<VerbSet>>) -> VerbFuture {
        self.runner.run(verbs.into(), self.arguments, self.chain)
    }
}

/// One entry of a bound call's argument array.
#[derive(Clone)]
pub enum Argument {
    /// Converted command-line value.
    Value(Value),
    /// Call context.
    Context(InvocationContext),
    /// Cancellation signal.
    Cancellation(CancellationToken),
    /// Nested verb-set handle.
    SubVerbs(SubVerbs),
    /// Resolved dependency; `None` when an optional one was unavailable.
    Service(Option<Service>),
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Context(c) => f.debug_tuple("Context").field(c).finish(),
            Self::Cancellation(t) => f.debug_tuple("Cancellation").field(&t.is_cancelled()).finish(),
            Self::SubVerbs(s) => f.debug_tuple("SubVerbs").field(s).finish(),
            Self::Service(s) => f.debug_tuple("Service").field(&s.is_some()).finish(),
        }
    }
}

impl Argument {
    /// The converted value, if this slot holds one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// A fully bound call, handed to the verb body.
#[derive(Clone)]
pub struct Invocation {
    /// The verb being invoked.
    pub verb: Arc<Verb>,
    /// Target instance for instance verbs.
    pub target: Option<Service>,
    /// Arguments in slot order.
    pub arguments: Vec<Argument>,
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("verb", &self.verb.name)
            .field("target", &self.target.is_some())
            .field("arguments", &self.arguments)
            .finish()
    }
}

impl Invocation {
    /// The converted value of a bound parameter.
    pub fn value(&self, name: &str) -> Option<&Value> {
        let parameter = self.verb.parameter(name)?;
        self.arguments.get(parameter.slot)?.as_value()
    }

    /// Reads a bound parameter as a native type.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ArgumentError> {
        let parameter = self
            .verb
            .parameter(name)
            .ok_or_else(|| ArgumentError::UnknownParameter(name.to_string()))?;
        let value = self
            .arguments
            .get(parameter.slot)
            .and_then(Argument::as_value)
            .ok_or(ArgumentError::NotAValue(parameter.slot))?;
        T::from_value(value).map_err(|found| ArgumentError::TypeMismatch {
            name: name.to_string(),
            expected: T::EXPECTED,
            found,
        })
    }

    /// The call context, if the verb declared one.
    pub fn context(&self) -> Option<&InvocationContext> {
        self.arguments.iter().find_map(|a| match a {
            Argument::Context(c) => Some(c),
            _ => None,
        })
    }

    /// The cancellation token, if the verb declared one.
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.arguments.iter().find_map(|a| match a {
            Argument::Cancellation(t) => Some(t),
            _ => None,
        })
    }

    /// The nested verb-set handle, if the verb declared one.
    pub fn sub_verbs(&self) -> Option<SubVerbs> {
        self.arguments.iter().find_map(|a| match a {
            Argument::SubVerbs(s) => Some(s.clone()),
            _ => None,
        })
    }

    /// A resolved dependency, downcast to `T`.
    pub fn service<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        let service = self
            .verb
            .services
            .iter()
            .find(|s| s.name == name && matches!(s.kind, ServiceKind::Dependency(_)))?;
        match self.arguments.get(service.slot)? {
            Argument::Service(Some(instance)) => instance.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    /// The target instance, downcast to `T`.
    pub fn target<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.target.clone()?.downcast::<T>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Parameter, ServiceParameter, ValueType};

    fn invocation() -> Invocation {
        let verb = Verb::builder("greet")
            .parameter(Parameter::single("name", ValueType::String))
            .service(ServiceParameter::new("db", ServiceKind::Dependency("db".into())))
            .build();
        Invocation {
            verb: Arc::new(verb),
            target: None,
            arguments: vec![
                Argument::Value(Value::String("ada".into())),
                Argument::Service(Some(Arc::new(42_u32))),
            ],
        }
    }

    #[test]
    fn test_get_reads_by_name() {
        let call = invocation();
        assert_eq!(call.get::<String>("name").unwrap(), "ada");
        assert_eq!(
            call.get::<i64>("name"),
            Err(ArgumentError::TypeMismatch {
                name: "name".into(),
                expected: "integer",
                found: "string",
            })
        );
        assert_eq!(
            call.get::<i64>("missing"),
            Err(ArgumentError::UnknownParameter("missing".into()))
        );
    }

    #[test]
    fn test_service_downcasts() {
        let call = invocation();
        assert_eq!(call.service::<u32>("db").as_deref(), Some(&42));
        assert!(call.service::<String>("db").is_none());
        assert!(call.cancellation().is_none());
    }
}
