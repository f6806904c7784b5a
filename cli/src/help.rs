//! Plain-text help for verbs and verb sets.

use std::fmt::Write;

use verb_dispatch_core::{Parameter, ParameterKind, Value, Verb, VerbSet};

/// One-line usage: `greet --name <string> [--loud] [--excited...]`.
pub fn usage(verb: &Verb) -> String {
    let mut line = verb.name.clone();
    for parameter in verb.parameters.iter().filter(|p| !p.hidden) {
        line.push(' ');
        line.push_str(&usage_fragment(parameter));
    }
    if verb.has_sub_verbs() {
        line.push_str(" <verb> [args]...");
    }
    line
}

fn usage_fragment(parameter: &Parameter) -> String {
    let fragment = match parameter.kind.placeholder() {
        Some(placeholder) if parameter.variadic => placeholder,
        Some(placeholder) => format!("--{} {placeholder}", parameter.name),
        None => format!("--{}", parameter.name),
    };
    let fragment = if matches!(parameter.kind, ParameterKind::Counter) {
        format!("{fragment}...")
    } else {
        fragment
    };
    if parameter.is_required() {
        fragment
    } else {
        format!("[{fragment}]")
    }
}

/// Usage, description and a parameter table for one verb.
///
/// `parent` is the path of delegating verbs, empty at the root.
pub fn render_verb(verb: &Verb, parent: &str) -> String {
    let mut out = if parent.is_empty() {
        format!("usage: {}\n", usage(verb))
    } else {
        format!("usage: {parent} {}\n", usage(verb))
    };
    if let Some(description) = &verb.description {
        let _ = write!(out, "\n{description}\n");
    }
    if !verb.aliases.is_empty() {
        let _ = write!(out, "\naliases: {}\n", verb.aliases.join(", "));
    }

    let rows: Vec<(String, String)> = verb
        .parameters
        .iter()
        .filter(|p| !p.hidden)
        .map(|p| (option_column(p), description_column(p)))
        .collect();
    if rows.is_empty() {
        return out;
    }

    let width = rows.iter().map(|(option, _)| option.len()).max().unwrap_or(0);
    out.push_str("\nparameters:\n");
    for (option, description) in rows {
        let _ = writeln!(out, "  {option:<width$}  {description}");
    }
    out
}

fn option_column(parameter: &Parameter) -> String {
    let mut column = match parameter.alias {
        Some(alias) => format!("-{alias}, --{}", parameter.name),
        None => format!("    --{}", parameter.name),
    };
    if let Some(placeholder) = parameter.kind.placeholder() {
        column.push(' ');
        column.push_str(&placeholder);
    }
    column
}

fn description_column(parameter: &Parameter) -> String {
    let mut column = parameter.description.clone().unwrap_or_default();
    if parameter.is_required() {
        column.push_str(" (required)");
    }
    if let Some(default) = parameter.default.as_ref().and_then(value_text) {
        let _ = write!(column, " [default: {default}]");
    }
    column.trim_start().to_string()
}

fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Bool(b) => b.to_string(),
        Value::Count(c) => c.to_string(),
        Value::String(s) | Value::Choice(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Unsigned(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Char(c) => c.to_string(),
        Value::Path(p) => p.display().to_string(),
        Value::Flags(bits) => format!("{bits:#x}"),
        Value::List(items) => items.iter().filter_map(value_text).collect::<Vec<_>>().join(" "),
        Value::Absent => return None,
    };
    Some(text)
}

/// Lists every visible verb with its usage and description.
pub fn render_overview(verbs: &VerbSet) -> String {
    let rows: Vec<(String, &str)> = verbs
        .visible()
        .map(|v| (usage(v), v.description.as_deref().unwrap_or_default()))
        .collect();
    let width = rows.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);

    let mut out = String::from("verbs:\n");
    for (usage, description) in rows {
        let _ = writeln!(out, "  {usage:<width$}  {description}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use verb_dispatch_core::ValueType;

    fn greet() -> Verb {
        Verb::builder("greet")
            .description("Say hello")
            .parameter(Parameter::single("name", ValueType::String).with_description("Who to greet"))
            .parameter(Parameter::switch("loud").with_alias('l'))
            .parameter(Parameter::counter("excited").with_alias('e'))
            .build()
    }

    #[test]
    fn test_usage_marks_optional_parameters() {
        assert_eq!(usage(&greet()), "greet --name <string> [--loud] [--excited...]");
    }

    #[test]
    fn test_usage_variadic_is_bare_placeholder() {
        let sum = Verb::builder("sum")
            .parameter(Parameter::list("values", ValueType::Float).variadic().optional())
            .build();
        assert_eq!(usage(&sum), "sum [<number>...]");
    }

    #[test]
    fn test_render_verb_lists_parameters() {
        let text = render_verb(&greet(), "");
        assert!(text.starts_with("usage: greet"));
        assert!(text.contains("Say hello"));
        assert!(text.contains("    --name <string>  Who to greet (required)"));
        assert!(text.contains("-l, --loud"));
    }

    #[test]
    fn test_default_is_shown() {
        let verb = Verb::builder("bump")
            .parameter(Parameter::single("by", ValueType::Unsigned).with_default(Value::Unsigned(1)))
            .build();
        assert!(render_verb(&verb, "").contains("[default: 1]"));
    }

    #[test]
    fn test_nested_usage_carries_parent_path() {
        let text = render_verb(&Verb::builder("list").build(), "remote");
        assert_eq!(text, "usage: remote list\n");
    }

    #[test]
    fn test_overview_skips_hidden_verbs() {
        let set = VerbSet::new([greet(), Verb::builder("secret").hidden().build()]);
        let text = render_overview(&set);
        assert!(text.contains("greet"));
        assert!(!text.contains("secret"));
    }
}
