//! Built-in verbs for `verbs run`.

use std::path::PathBuf;
use std::sync::Arc;

use verb_dispatch_core::{
    Invocation, Parameter, ServiceKind, ServiceParameter, ValueType, Verb, VerbSet,
};

/// Root verb set: `add` (two overloads), `sum`, `find` (two overloads),
/// `greet` and `remote`.
pub fn demo_verbs() -> VerbSet {
    let remote = Arc::new(remote_verbs());

    VerbSet::new([
        Verb::builder("add")
            .description("Add two integers")
            .parameter(Parameter::single("a", ValueType::Integer))
            .parameter(Parameter::single("b", ValueType::Integer))
            .handler(|call: Invocation| async move {
                let a: i64 = call.get("a")?;
                let b: i64 = call.get("b")?;
                println!("{}", a.checked_add(b).ok_or("integer overflow")?);
                Ok(0)
            })
            .build(),
        Verb::builder("add")
            .description("Add a list of integers")
            .parameter(Parameter::list("values", ValueType::Integer).variadic())
            .handler(|call: Invocation| async move {
                let values: Vec<i64> = call.get("values")?;
                let total = values
                    .into_iter()
                    .try_fold(0i64, i64::checked_add)
                    .ok_or("integer overflow")?;
                println!("{total}");
                Ok(0)
            })
            .build(),
        Verb::builder("sum")
            .description("Sum numbers")
            .parameter(Parameter::list("values", ValueType::Float).variadic().optional())
            .handler(|call: Invocation| async move {
                let values: Option<Vec<f64>> = call.get("values")?;
                println!("{}", values.unwrap_or_default().iter().sum::<f64>());
                Ok(0)
            })
            .build(),
        Verb::builder("find")
            .description("Search the current directory")
            .parameter(Parameter::single("pattern", ValueType::String))
            .handler(|call: Invocation| async move {
                let pattern: String = call.get("pattern")?;
                println!("find '{pattern}' in .");
                Ok(0)
            })
            .build(),
        Verb::builder("find")
            .description("Search a directory")
            .parameter(Parameter::single("pattern", ValueType::String))
            .parameter(Parameter::single("path", ValueType::Path))
            .handler(|call: Invocation| async move {
                let pattern: String = call.get("pattern")?;
                let path: PathBuf = call.get("path")?;
                println!("find '{pattern}' in {}", path.display());
                Ok(0)
            })
            .build(),
        Verb::builder("greet")
            .alias("hello")
            .description("Greet someone")
            .parameter(Parameter::single("name", ValueType::String).with_description("Who to greet"))
            .parameter(
                Parameter::switch("loud")
                    .with_alias('l')
                    .with_description("Shout the greeting"),
            )
            .parameter(
                Parameter::counter("excited")
                    .with_alias('e')
                    .with_description("One exclamation mark per use"),
            )
            .handler(|call: Invocation| async move {
                let name: String = call.get("name")?;
                let loud: bool = call.get("loud")?;
                let excited: usize = call.get("excited")?;
                let greeting = format!("Hello, {name}{}", "!".repeat(excited));
                if loud {
                    println!("{}", greeting.to_uppercase());
                } else {
                    println!("{greeting}");
                }
                Ok(0)
            })
            .build(),
        Verb::builder("remote")
            .description("Manage remotes")
            .parameter(
                Parameter::counter("verbose")
                    .with_alias('v')
                    .with_description("More output"),
            )
            .service(ServiceParameter::new("sub", ServiceKind::SubVerbs))
            .handler(move |call: Invocation| {
                let remote = Arc::clone(&remote);
                async move {
                    let verbose: usize = call.get("verbose")?;
                    let sub = call.sub_verbs().ok_or("nested verbs unavailable")?;
                    if verbose > 0 {
                        println!("remote: {}", sub.arguments().join(" "));
                    }
                    sub.run(remote).await
                }
            })
            .build(),
    ])
}

fn remote_verbs() -> VerbSet {
    VerbSet::new([
        Verb::builder("add")
            .description("Register a remote")
            .parameter(Parameter::single("name", ValueType::String))
            .parameter(Parameter::single("url", ValueType::String))
            .service(ServiceParameter::new("context", ServiceKind::Context))
            .handler(|call: Invocation| async move {
                let name: String = call.get("name")?;
                let url: String = call.get("url")?;
                let parent = call.context().map(|c| c.chain.path()).unwrap_or_default();
                println!("{parent}: added {name} -> {url}");
                Ok(0)
            })
            .build(),
        Verb::builder("list")
            .description("List remotes")
            .handler(|_| async {
                println!("origin");
                Ok(0)
            })
            .build(),
    ])
}
