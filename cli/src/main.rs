mod demo;
mod help;

use std::collections::HashMap;
use std::fmt::Write;

use clap::{ArgAction, Args, Parser, Subcommand};
use futures::executor::block_on;
use serde::Serialize;
use tracing::Level;
use verb_dispatch_binder::{DispatchOptions, Dispatcher, OutcomeReporter, RunOutcome};
use verb_dispatch_core::{CaseMode, ValueArity, VerbChain, VerbSet};
use verb_dispatch_parser::{ParsedArguments, ParserOptions, parse, scan};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "verbs")]
#[command(about = "Inspect argument scanning and run demo verbs")]
struct Cli {
    /// Log to stderr; repeat for more detail (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the tokens an argument vector scans into.
    Scan(ScanArgs),
    /// Print the option maps and positional values of an argument vector.
    Parse(ParseArgs),
    /// Dispatch an argument vector against the built-in verbs.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct ConventionArgs {
    /// Accept `/` prefixes and `:` splitters, with case-insensitive long names.
    #[arg(long)]
    windows: bool,
    /// Treat unrecognized options as positional values.
    #[arg(long)]
    unknown_as_values: bool,
}

#[derive(Debug, Args)]
struct ArityArgs {
    /// Arity of an option name, e.g. `o=one` or `files=zero-or-many`
    /// (zero, zero-or-one, one, zero-or-many, one-or-many).
    #[arg(long = "arity", value_name = "NAME=ARITY")]
    arities: Vec<String>,
    /// Only names given with --arity are known options; others are unknown.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Args)]
struct ScanArgs {
    #[command(flatten)]
    conventions: ConventionArgs,
    #[command(flatten)]
    arity: ArityArgs,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
    /// Arguments to scan, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    #[command(flatten)]
    conventions: ConventionArgs,
    #[command(flatten)]
    arity: ArityArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments to parse, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Use Windows-style option conventions.
    #[arg(long)]
    windows: bool,
    /// Verb to bind when the first argument names none.
    #[arg(long)]
    default_verb: Option<String>,
    /// Match verb names case-sensitively.
    #[arg(long)]
    case_sensitive: bool,
    /// Verb and arguments, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Scan(args) => run_scan(args).map(|()| 0),
        Command::Parse(args) => run_parse(args).map(|()| 0),
        Command::Run(args) => run_verbs(args),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run_scan(args: ScanArgs) -> Result<(), String> {
    let options = args.conventions.parser_options();
    let arities = args.arity.table()?;
    let tokens = scan(&args.args, &options, |name, _| args.arity.lookup(&arities, name));

    match args.format {
        CliOutputFormat::Text => {
            for token in &tokens {
                println!("{}\t{:?}\t{}", token.index, token.kind, token.text);
            }
        }
        format => println!("{}", serialize(&tokens, format)?),
    }
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let options = args.conventions.parser_options();
    let arities = args.arity.table()?;
    let parsed = parse(&args.args, &options, |name, _| args.arity.lookup(&arities, name));

    match args.format {
        CliOutputFormat::Text => print!("{}", summarize(&parsed, &options)),
        format => println!("{}", serialize(&parsed, format)?),
    }
    Ok(())
}

fn run_verbs(args: RunArgs) -> Result<i32, String> {
    let mut options = DispatchOptions {
        default_verb: args.default_verb,
        ..DispatchOptions::default()
    };
    if args.windows {
        options.parser = ParserOptions::windows();
    }
    if args.case_sensitive {
        options.verb_case = CaseMode::Sensitive;
    }

    let verbs = demo::demo_verbs();
    let dispatcher = Dispatcher::new(options).with_reporter(ConsoleReporter);
    let outcome = block_on(dispatcher.run(&verbs, &args.args)).map_err(|err| err.to_string())?;
    Ok(present(&outcome, &verbs))
}

/// Prints the outcome of a root run and returns its exit code.
fn present(outcome: &RunOutcome, verbs: &VerbSet) -> i32 {
    match outcome {
        RunOutcome::Completed(_) => {}
        RunOutcome::HelpRequested(Some(verb)) => print!("{}", help::render_verb(verb, "")),
        RunOutcome::HelpRequested(None) => print!("{}", help::render_overview(verbs)),
        RunOutcome::FailedToBind(failure) => eprintln!("error: {failure}"),
        RunOutcome::NoVerbSpecified => {
            eprintln!("error: no verb given");
            eprint!("{}", help::render_overview(verbs));
        }
    }
    outcome.exit_code()
}

/// Prints nested outcomes that did not complete.
struct ConsoleReporter;

impl OutcomeReporter for ConsoleReporter {
    fn report(&self, outcome: &RunOutcome, chain: &VerbChain) -> i32 {
        let parent = chain.path();
        match outcome {
            RunOutcome::Completed(_) => {}
            RunOutcome::HelpRequested(Some(verb)) => print!("{}", help::render_verb(verb, &parent)),
            RunOutcome::HelpRequested(None) => println!("usage: {parent} <verb> [args]..."),
            RunOutcome::FailedToBind(failure) => eprintln!("error: {parent}: {failure}"),
            RunOutcome::NoVerbSpecified => eprintln!("error: '{parent}' needs a verb"),
        }
        outcome.exit_code()
    }
}

impl ConventionArgs {
    fn parser_options(&self) -> ParserOptions {
        let mut options = if self.windows {
            ParserOptions::windows()
        } else {
            ParserOptions::default()
        };
        options.unknown_options_as_values = self.unknown_as_values;
        options
    }
}

impl ArityArgs {
    fn table(&self) -> Result<HashMap<String, ValueArity>, String> {
        self.arities.iter().map(|entry| parse_arity(entry)).collect()
    }

    fn lookup(&self, table: &HashMap<String, ValueArity>, name: &str) -> Option<ValueArity> {
        match table.get(name) {
            Some(arity) => Some(*arity),
            None if self.strict => None,
            None => Some(ValueArity::ZeroOrOne),
        }
    }
}

fn parse_arity(entry: &str) -> Result<(String, ValueArity), String> {
    let (name, kind) = entry
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=ARITY, got '{entry}'"))?;
    let arity = match kind.to_ascii_lowercase().as_str() {
        "zero" => ValueArity::Zero,
        "zero-or-one" => ValueArity::ZeroOrOne,
        "one" => ValueArity::One,
        "zero-or-many" => ValueArity::ZeroOrMany,
        "one-or-many" => ValueArity::OneOrMany,
        other => return Err(format!("unknown arity '{other}' for '{name}'")),
    };
    Ok((name.to_string(), arity))
}

fn summarize(parsed: &ParsedArguments, options: &ParserOptions) -> String {
    let short = options.short_prefixes.first().map_or("-", String::as_str);
    let long = options.long_prefixes.first().map_or("--", String::as_str);
    let mut out = String::new();

    for (prefix, map) in [(long, parsed.long()), (short, parsed.short())] {
        for option in map.iter() {
            let _ = writeln!(out, "{prefix}{} x{} {:?}", option.name, option.count, option.values);
        }
    }
    for value in parsed.positional() {
        let _ = writeln!(out, "{value}");
    }
    if parsed.help_requested() {
        out.push_str("help requested\n");
    }
    out
}

fn serialize<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|err| format!("failed to serialize YAML: {err}"))
        }
        _ => serde_json::to_string_pretty(value)
            .map_err(|err| format!("failed to serialize JSON: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arity_spellings() {
        assert_eq!(parse_arity("o=one").unwrap(), ("o".to_string(), ValueArity::One));
        assert_eq!(
            parse_arity("files=Zero-Or-Many").unwrap(),
            ("files".to_string(), ValueArity::ZeroOrMany)
        );
        assert!(parse_arity("o").unwrap_err().contains("NAME=ARITY"));
        assert!(parse_arity("o=lots").unwrap_err().contains("unknown arity 'lots'"));
    }

    #[test]
    fn test_strict_lookup_leaves_unlisted_names_unknown() {
        let arity = ArityArgs {
            arities: vec!["o=one".to_string()],
            strict: true,
        };
        let table = arity.table().unwrap();
        assert_eq!(arity.lookup(&table, "o"), Some(ValueArity::One));
        assert_eq!(arity.lookup(&table, "x"), None);
    }

    #[test]
    fn test_summary_lists_options_then_positionals() {
        let options = ParserOptions::default();
        let parsed = parse(&["in", "-vv", "--out=a"], &options, |_, _| Some(ValueArity::ZeroOrOne));
        assert_eq!(summarize(&parsed, &options), "--out x1 [\"a\"]\n-v x2 []\nin\n");
    }
}
