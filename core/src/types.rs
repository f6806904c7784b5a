//! Verb and parameter declarations.
//!
//! A [`Verb`] is a named, invocable operation with an ordered parameter
//! signature. Bound [`Parameter`]s are filled from the command line; service
//! parameters ([`ServiceParameter`]) are resolved from outside it. Verbs are
//! built once through [`VerbBuilder`] and shared read-only inside a
//! [`VerbSet`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::arity::{CaseMode, OptionForm, ValueArity};
use crate::invoke::{Invocation, Invoker, VerbFuture, VerbResult};
use crate::value::Value;

/// Scalar type a raw string is converted into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ValueType {
    /// Text, taken as-is (the default).
    #[default]
    String,
    /// Signed 64-bit integer.
    Integer,
    /// Unsigned 64-bit integer.
    Unsigned,
    /// 64-bit float.
    Float,
    /// `true`/`false` and common spellings.
    Bool,
    /// A single character.
    Char,
    /// Filesystem path.
    Path,
    /// One of the listed choices (matched case-insensitively).
    Choice(Vec<String>),
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Unsigned => f.write_str("unsigned integer"),
            Self::Float => f.write_str("number"),
            Self::Bool => f.write_str("boolean"),
            Self::Char => f.write_str("character"),
            Self::Path => f.write_str("path"),
            Self::Choice(choices) => write!(f, "one of {}", choices.join("|")),
        }
    }
}

/// Closed description of what a bound parameter holds.
///
/// Resolved once at declaration time; [`arity`](ParameterKind::arity) is
/// derived from it rather than stored.
///
/// # Examples
///
/// ```
/// use verb_dispatch_core::{ParameterKind, ValueArity, ValueType};
///
/// assert_eq!(ParameterKind::Switch.arity(), ValueArity::ZeroOrOne);
/// assert_eq!(ParameterKind::Counter.arity(), ValueArity::Zero);
/// assert_eq!(ParameterKind::Single(ValueType::Integer).arity(), ValueArity::One);
/// assert_eq!(ParameterKind::List(ValueType::String).arity(), ValueArity::ZeroOrMany);
/// assert_eq!(ParameterKind::Flags(vec!["read".into()]).arity(), ValueArity::OneOrMany);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    /// Boolean flag: present means `true`, an explicit value may override.
    Switch,
    /// Counts how many times the option appears (`-vvv`).
    Counter,
    /// A single converted value.
    Single(ValueType),
    /// Any number of converted values.
    List(ValueType),
    /// Bit-flag enumeration with the given flag names.
    Flags(Vec<String>),
}

impl ParameterKind {
    /// Value arity implied by this kind.
    pub fn arity(&self) -> ValueArity {
        match self {
            Self::Switch => ValueArity::ZeroOrOne,
            Self::Counter => ValueArity::Zero,
            Self::Single(_) => ValueArity::One,
            Self::List(_) => ValueArity::ZeroOrMany,
            Self::Flags(_) => ValueArity::OneOrMany,
        }
    }

    /// Short placeholder for help output (`<integer>`, `<string>...`).
    pub fn placeholder(&self) -> Option<String> {
        match self {
            Self::Switch | Self::Counter => None,
            Self::Single(ty) => Some(format!("<{ty}>")),
            Self::List(ty) => Some(format!("<{ty}>...")),
            Self::Flags(names) => Some(format!("<{}>", names.join(","))),
        }
    }
}

/// A parameter bound from the command line.
///
/// # Examples
///
/// ```
/// use verb_dispatch_core::{Parameter, ValueType};
///
/// let count = Parameter::single("count", ValueType::Integer)
///     .with_alias('c')
///     .with_description("How many times");
/// assert!(count.is_required());
///
/// let verbose = Parameter::switch("verbose").with_alias('v');
/// assert!(!verbose.is_required());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Long option name (`--name`).
    pub name: String,
    /// Short option letter (`-n`).
    pub alias: Option<char>,
    /// Description for help output.
    pub description: Option<String>,
    /// What the parameter holds.
    pub kind: ParameterKind,
    /// Whether the parameter may be left out.
    pub optional: bool,
    /// Value used when the parameter is left out.
    pub default: Option<Value>,
    /// Hidden from help output.
    pub hidden: bool,
    /// Collects every positional value not claimed by another parameter.
    pub variadic: bool,
    /// Index among the verb's bound parameters (positional matching).
    pub position: usize,
    /// Index in the final argument array (set by [`VerbBuilder`]).
    pub slot: usize,
}

impl Parameter {
    /// Creates a required parameter of the given kind.
    pub fn new(name: &str, kind: ParameterKind) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
            description: None,
            kind,
            optional: false,
            default: None,
            hidden: false,
            variadic: false,
            position: 0,
            slot: 0,
        }
    }

    /// Creates a boolean switch.
    pub fn switch(name: &str) -> Self {
        Self::new(name, ParameterKind::Switch)
    }

    /// Creates an occurrence counter.
    pub fn counter(name: &str) -> Self {
        Self::new(name, ParameterKind::Counter)
    }

    /// Creates a single-valued parameter.
    pub fn single(name: &str, value_type: ValueType) -> Self {
        Self::new(name, ParameterKind::Single(value_type))
    }

    /// Creates a list parameter.
    pub fn list(name: &str, value_type: ValueType) -> Self {
        Self::new(name, ParameterKind::List(value_type))
    }

    /// Creates a bit-flag parameter.
    pub fn flags(name: &str, flag_names: &[&str]) -> Self {
        Self::new(
            name,
            ParameterKind::Flags(flag_names.iter().map(|s| s.to_string()).collect()),
        )
    }

    /// Sets the short alias.
    pub fn with_alias(mut self, alias: char) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Sets a default value; implies [`optional`](Self::optional).
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self.optional = true;
        self
    }

    /// Marks the parameter as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Hides the parameter from help output.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Marks the parameter as the variadic collector.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Value arity of this parameter.
    pub fn arity(&self) -> ValueArity {
        self.kind.arity()
    }

    /// Returns `true` when binding fails if no source supplies a value.
    ///
    /// Switches and counters always have an implicit value.
    pub fn is_required(&self) -> bool {
        !self.optional
            && self.default.is_none()
            && !matches!(self.kind, ParameterKind::Switch | ParameterKind::Counter)
    }

    /// Checks whether this parameter answers to `name` in the given form.
    ///
    /// Long names match [`name`](Self::name); short names match the alias or
    /// a single-character name.
    pub fn matches(&self, name: &str, form: OptionForm, case: CaseMode) -> bool {
        match form {
            OptionForm::Long => case.eq(&self.name, name),
            OptionForm::Short => {
                let mut chars = name.chars();
                let (Some(letter), None) = (chars.next(), chars.next()) else {
                    return false;
                };
                let alias_matches = self.alias.is_some_and(|a| match case {
                    CaseMode::Sensitive => a == letter,
                    CaseMode::Insensitive => a.to_lowercase().eq(letter.to_lowercase()),
                });
                alias_matches || (self.name.chars().count() == 1 && case.eq(&self.name, name))
            }
        }
    }
}

/// What a service parameter asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceKind {
    /// The [`InvocationContext`](crate::InvocationContext) of the call.
    Context,
    /// The dispatcher's cancellation token.
    Cancellation,
    /// A handle for delegating the remaining arguments to a nested verb set.
    SubVerbs,
    /// A dependency looked up by key in the service provider.
    Dependency(String),
}

/// A parameter resolved from outside the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceParameter {
    /// Parameter name, for diagnostics.
    pub name: String,
    /// What to resolve.
    pub kind: ServiceKind,
    /// Whether the verb tolerates the service being unavailable.
    pub optional: bool,
    /// Index in the final argument array (set by [`VerbBuilder`]).
    pub slot: usize,
}

impl ServiceParameter {
    /// Creates a required service parameter.
    pub fn new(name: &str, kind: ServiceKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            optional: false,
            slot: 0,
        }
    }

    /// Creates a dependency keyed by the Rust type name of `T`.
    pub fn dependency<T: ?Sized + 'static>(name: &str) -> Self {
        Self::new(name, ServiceKind::Dependency(std::any::type_name::<T>().to_string()))
    }

    /// Marks the service as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Whether a verb runs as a free function or on a target instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Target {
    /// No target instance is needed.
    #[default]
    Static,
    /// A target instance is resolved from the service provider by key.
    Instance(String),
}

/// A named, invocable operation with a parameter signature.
///
/// # Examples
///
/// ```
/// use verb_dispatch_core::{Parameter, ValueType, Verb};
///
/// let add = Verb::builder("add")
///     .description("Add two numbers")
///     .parameter(Parameter::single("a", ValueType::Integer))
///     .parameter(Parameter::single("b", ValueType::Integer))
///     .handler(|call| async move {
///         let a: i64 = call.get("a")?;
///         let b: i64 = call.get("b")?;
///         println!("{}", a + b);
///         Ok(0)
///     })
///     .build();
///
/// assert_eq!(add.parameters.len(), 2);
/// assert_eq!(add.parameters[1].slot, 1);
/// assert!(!add.has_sub_verbs());
/// ```
#[derive(Clone)]
pub struct Verb {
    /// Primary name.
    pub name: String,
    /// Alternative names.
    pub aliases: Vec<String>,
    /// Description for help output.
    pub description: Option<String>,
    /// Target instance requirement.
    pub target: Target,
    /// Bound parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Service parameters in declaration order.
    pub services: Vec<ServiceParameter>,
    /// Hidden from help output.
    pub hidden: bool,
    invoker: Invoker,
}

impl fmt::Debug for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verb")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("target", &self.target)
            .field("parameters", &self.parameters)
            .field("services", &self.services)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

impl Verb {
    /// Starts declaring a verb.
    pub fn builder(name: &str) -> VerbBuilder {
        VerbBuilder::new(name)
    }

    /// Returns `true` if a service parameter requests a nested verb set.
    pub fn has_sub_verbs(&self) -> bool {
        self.services.iter().any(|s| s.kind == ServiceKind::SubVerbs)
    }

    /// Total number of argument slots (bound + service).
    pub fn slot_count(&self) -> usize {
        self.parameters.len() + self.services.len()
    }

    /// Checks the verb's name and aliases.
    pub fn is_named(&self, name: &str, case: CaseMode) -> bool {
        case.eq(&self.name, name) || self.aliases.iter().any(|a| case.eq(a, name))
    }

    /// Finds the bound parameter answering to an option name.
    pub fn find_parameter(&self, name: &str, form: OptionForm, case: CaseMode) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.matches(name, form, case))
    }

    /// Finds a bound parameter by exact declared name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// The variadic collector, if declared.
    pub fn variadic_parameter(&self) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.variadic)
    }

    /// Calls the verb body.
    pub fn invoke(&self, invocation: Invocation) -> VerbFuture {
        (self.invoker)(invocation)
    }
}

/// Fluent declaration of a [`Verb`].
///
/// Argument slots follow the order in which bound and service parameters
/// are added.
pub struct VerbBuilder {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    target: Target,
    declared: Vec<Declared>,
    hidden: bool,
    invoker: Option<Invoker>,
}

enum Declared {
    Bound(Parameter),
    Service(ServiceParameter),
}

impl VerbBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            description: None,
            target: Target::Static,
            declared: Vec::new(),
            hidden: false,
            invoker: None,
        }
    }

    /// Adds an alternative name.
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Adds a description.
    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Requires a target instance registered under `key`.
    pub fn instance(mut self, key: &str) -> Self {
        self.target = Target::Instance(key.to_string());
        self
    }

    /// Adds a bound parameter.
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.declared.push(Declared::Bound(parameter));
        self
    }

    /// Adds a service parameter.
    pub fn service(mut self, service: ServiceParameter) -> Self {
        self.declared.push(Declared::Service(service));
        self
    }

    /// Hides the verb from help output.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Sets the verb body.
    pub fn handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = VerbResult> + Send + 'static,
    {
        let invoker: Invoker =
            Arc::new(move |call: Invocation| -> VerbFuture { Box::pin(handler(call)) });
        self.invoker = Some(invoker);
        self
    }

    /// Finishes the declaration, assigning positions and slots.
    ///
    /// A verb without a handler completes with exit code `0`.
    pub fn build(self) -> Verb {
        let mut parameters = Vec::new();
        let mut services = Vec::new();
        for (slot, declared) in self.declared.into_iter().enumerate() {
            match declared {
                Declared::Bound(mut p) => {
                    p.position = parameters.len();
                    p.slot = slot;
                    parameters.push(p);
                }
                Declared::Service(mut s) => {
                    s.slot = slot;
                    services.push(s);
                }
            }
        }

        let invoker = self.invoker.unwrap_or_else(|| {
            Arc::new(|_: Invocation| -> VerbFuture { Box::pin(async { Ok(0) }) })
        });

        Verb {
            name: self.name,
            aliases: self.aliases,
            description: self.description,
            target: self.target,
            parameters,
            services,
            hidden: self.hidden,
            invoker,
        }
    }
}

/// Ordered collection of verbs.
///
/// Several verbs may share a name; they are overloads and are tried in
/// declaration order.
///
/// # Examples
///
/// ```
/// use verb_dispatch_core::{CaseMode, Verb, VerbSet};
///
/// let set = VerbSet::new([
///     Verb::builder("status").alias("st").build(),
///     Verb::builder("commit").build(),
/// ]);
/// assert_eq!(set.find("ST", CaseMode::Insensitive).len(), 1);
/// assert!(set.find("push", CaseMode::Insensitive).is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct VerbSet {
    verbs: Vec<Arc<Verb>>,
}

impl VerbSet {
    /// Creates a set from verbs in declaration order.
    pub fn new(verbs: impl IntoIterator<Item = Verb>) -> Self {
        Self {
            verbs: verbs.into_iter().map(Arc::new).collect(),
        }
    }

    /// Creates a set from already shared verbs.
    pub fn from_shared(verbs: impl IntoIterator<Item = Arc<Verb>>) -> Self {
        Self {
            verbs: verbs.into_iter().collect(),
        }
    }

    /// Appends a verb.
    pub fn push(&mut self, verb: Verb) {
        self.verbs.push(Arc::new(verb));
    }

    /// Iterates all verbs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Verb>> {
        self.verbs.iter()
    }

    /// Iterates verbs that are not hidden.
    pub fn visible(&self) -> impl Iterator<Item = &Arc<Verb>> {
        self.verbs.iter().filter(|v| !v.hidden)
    }

    /// All verbs answering to `name`, in declaration order.
    pub fn find(&self, name: &str, case: CaseMode) -> Vec<&Arc<Verb>> {
        self.verbs.iter().filter(|v| v.is_named(name, case)).collect()
    }

    /// Returns `true` if any verb answers to `name`.
    pub fn contains(&self, name: &str, case: CaseMode) -> bool {
        self.verbs.iter().any(|v| v.is_named(name, case))
    }

    /// Distinct primary names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for verb in &self.verbs {
            if !names.contains(&verb.name.as_str()) {
                names.push(&verb.name);
            }
        }
        names
    }

    /// Number of verbs, overloads included.
    pub fn len(&self) -> usize {
        self.verbs.len()
    }

    /// Returns `true` if the set has no verbs.
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_assigns_slots_across_services() {
        let verb = Verb::builder("run")
            .parameter(Parameter::single("input", ValueType::Path))
            .service(ServiceParameter::new("ctx", ServiceKind::Context))
            .parameter(Parameter::switch("force"))
            .build();

        assert_eq!(verb.parameters[0].slot, 0);
        assert_eq!(verb.services[0].slot, 1);
        assert_eq!(verb.parameters[1].slot, 2);
        assert_eq!(verb.parameters[1].position, 1);
        assert_eq!(verb.slot_count(), 3);
    }

    #[test]
    fn test_find_parameter_by_alias_and_single_letter_name() {
        let verb = Verb::builder("x")
            .parameter(Parameter::switch("verbose").with_alias('v'))
            .parameter(Parameter::single("n", ValueType::Integer))
            .build();

        assert!(verb.find_parameter("v", OptionForm::Short, CaseMode::Sensitive).is_some());
        assert!(verb.find_parameter("V", OptionForm::Short, CaseMode::Sensitive).is_none());
        assert!(verb.find_parameter("V", OptionForm::Short, CaseMode::Insensitive).is_some());
        assert!(verb.find_parameter("n", OptionForm::Short, CaseMode::Sensitive).is_some());
        assert!(verb.find_parameter("VERBOSE", OptionForm::Long, CaseMode::Insensitive).is_some());
        assert!(verb.find_parameter("vv", OptionForm::Short, CaseMode::Sensitive).is_none());
    }

    #[test]
    fn test_sub_verbs_flag() {
        let verb = Verb::builder("remote")
            .service(ServiceParameter::new("sub", ServiceKind::SubVerbs))
            .build();
        assert!(verb.has_sub_verbs());
    }

    #[test]
    fn test_verb_set_keeps_overloads_in_order() {
        let set = VerbSet::new([
            Verb::builder("find").parameter(Parameter::single("a", ValueType::String)).build(),
            Verb::builder("find")
                .parameter(Parameter::single("a", ValueType::String))
                .parameter(Parameter::single("b", ValueType::String))
                .build(),
        ]);
        let found = set.find("find", CaseMode::Sensitive);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].parameters.len(), 1);
        assert_eq!(set.names(), vec!["find"]);
    }
}
