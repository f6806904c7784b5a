//! Integration tests for the verb-dispatch-parser crate.

use verb_dispatch_core::{CaseMode, OptionForm, Parameter, ValueArity, ValueType, Verb};
use verb_dispatch_parser::{ParserOptions, TokenKind, parse, scan};

/// A verb with one parameter of every kind.
fn archive_verb() -> Verb {
    Verb::builder("archive")
        .parameter(Parameter::switch("force").with_alias('f'))
        .parameter(Parameter::counter("verbose").with_alias('v'))
        .parameter(Parameter::single("output", ValueType::Path).with_alias('o'))
        .parameter(Parameter::list("exclude", ValueType::String).with_alias('x'))
        .parameter(Parameter::flags("mode", &["read", "write", "exec"]).with_alias('m'))
        .build()
}

#[test]
fn test_verb_driven_scan() {
    let verb = archive_verb();
    let options = ParserOptions::default();
    let arity = |name: &str, form: OptionForm| {
        verb.find_parameter(name, form, CaseMode::Sensitive).map(Parameter::arity)
    };

    let parsed = parse(
        &["-vvf", "-oout.tar", "--exclude", "a", "b", "--mode=read", "write", "--", "-src"],
        &options,
        arity,
    );

    assert_eq!(parsed.short().get("v").unwrap().count, 2);
    assert_eq!(parsed.short().get("f").unwrap().count, 1);
    assert_eq!(parsed.short().get("o").unwrap().values, vec!["out.tar"]);
    assert_eq!(parsed.long().get("exclude").unwrap().values, vec!["a", "b"]);
    assert_eq!(parsed.long().get("mode").unwrap().values, vec!["read", "write"]);
    assert_eq!(parsed.positional(), &["-src".to_string()]);
}

#[test]
fn test_zero_arity_count_ignores_trailing_tokens() {
    let options = ParserOptions::default();
    let arity = |_: &str, _: OptionForm| Some(ValueArity::Zero);

    for input in [vec!["-q", "x"], vec!["-q", "-q", "1", "2"], vec!["x", "-qqq"]] {
        let parsed = parse(&input, &options, arity);
        let expected = input.iter().map(|a| a.matches('q').count()).sum::<usize>();
        let q = parsed.short().get("q").unwrap();
        assert_eq!(q.count, expected, "input {input:?}");
        assert!(q.values.is_empty(), "input {input:?}");
    }
}

#[test]
fn test_help_anywhere_stops_interpretation() {
    let options = ParserOptions::default();
    let arity = |_: &str, _: OptionForm| Some(ValueArity::ZeroOrOne);

    for input in [vec!["-?", "--x"], vec!["a", "--", "/?", "-y"], vec!["--x", "1", "--help"]] {
        let tokens = scan(&input, &options, arity);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::HelpOption), "input {input:?}");
        assert!(parse(&input, &options, arity).help_requested());
    }
}

#[test]
fn test_windows_preset_round_trip() {
    let verb = archive_verb();
    let options = ParserOptions::windows();
    let arity = |name: &str, form: OptionForm| {
        let case = match form {
            OptionForm::Short => options.short_case,
            OptionForm::Long => options.long_case,
        };
        verb.find_parameter(name, form, case).map(Parameter::arity)
    };

    let parsed = parse(&["/OUTPUT:out.tar", "/f", "/exclude:a", "b", "src"], &options, arity);
    assert_eq!(parsed.long().get("output").unwrap().values, vec!["out.tar"]);
    assert_eq!(parsed.long().get("exclude").unwrap().values, vec!["a", "b", "src"]);
    assert!(parsed.short().contains("f"));

    let rebuilt = parsed.to_arguments(&options);
    assert_eq!(parse(&rebuilt, &options, arity), parsed);
}

#[test]
fn test_options_from_json_drive_scanning() {
    let options: ParserOptions = serde_json::from_str(
        r#"{"short_prefixes":["+"],"long_prefixes":["++"],"option_breaks":[],"help_tokens":["?"]}"#,
    )
    .unwrap();
    let tokens = scan(&["++name", "+v", "--", "?"], &options, |_, _| Some(ValueArity::Zero));

    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::LongOption, TokenKind::ShortOption, TokenKind::Value, TokenKind::HelpOption]
    );
}
