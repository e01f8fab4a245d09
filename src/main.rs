mod debug_report;

use anyhow::{Context, bail};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tokmatch::{AttrKey, Doc, Matcher, Options, PhraseMatcher, UnknownAttributePolicy};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "TOKMATCH_LOG";

/// Match token patterns and phrases against whitespace-tokenized text.
#[derive(Debug, Parser)]
#[command(name = "tokmatch", version, after_help = "Set TOKMATCH_LOG=debug (or trace) for engine traces on stderr.")]
struct Cli {
    /// JSON rule file: {"patterns": {KEY: [[token, ...], ...]}, "phrases": {KEY: ["text", ...]}}
    #[arg(short, long)]
    rules: PathBuf,

    /// Match phrases on lowercased text instead of exact text.
    #[arg(long)]
    lower: bool,

    /// Treat unknown attribute names as never matching instead of failing.
    #[arg(long)]
    ignore_unknown: bool,

    /// Disable the literal pre-scan that skips patterns which cannot match.
    #[arg(long)]
    no_trigger_scan: bool,

    /// Print matches as JSON lines instead of the report.
    #[arg(long)]
    json: bool,

    /// Force ANSI color output.
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Disable ANSI color output.
    #[arg(long)]
    no_color: bool,

    /// Input text. Reads stdin when omitted.
    input: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RuleFile {
    #[serde(default)]
    patterns: BTreeMap<String, Vec<Value>>,
    #[serde(default)]
    phrases: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Serialize)]
struct MatchRow<'a> {
    kind: &'static str,
    key: &'a str,
    start: usize,
    end: usize,
    text: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&cli.rules)
        .with_context(|| format!("failed to read rule file {}", cli.rules.display()))?;
    let rule_file: RuleFile =
        serde_json::from_str(&source).with_context(|| format!("invalid rule file {}", cli.rules.display()))?;

    let options = Options {
        unknown_attributes: if cli.ignore_unknown {
            UnknownAttributePolicy::Ignore
        } else {
            UnknownAttributePolicy::Error
        },
        trigger_scan: !cli.no_trigger_scan,
    };

    let mut matcher = Matcher::with_options(options);
    for (key, patterns) in &rule_file.patterns {
        matcher.add(key, None, patterns).with_context(|| format!("rule '{key}'"))?;
    }

    let mut phrases = if cli.lower { PhraseMatcher::with_attr(AttrKey::Lower)? } else { PhraseMatcher::new() };
    for (key, texts) in &rule_file.phrases {
        let docs: Vec<Doc> = texts.iter().map(|t| Doc::from_text(t)).collect();
        phrases.add(key, None, docs.iter()).with_context(|| format!("phrase '{key}'"))?;
    }

    let input = if cli.input.is_empty() { read_stdin_input()? } else { cli.input.join(" ") };
    if input.trim().is_empty() {
        bail!("no input provided");
    }

    let mut doc = Doc::from_text(&input);
    let run = matcher.run_with_metrics(&mut doc)?;
    let phrase_matches = phrases.run(&mut doc)?;

    if cli.json {
        let pattern_rows = run.matches.iter().map(|m| ("pattern", matcher.key_name(m.key), m));
        let phrase_rows = phrase_matches.iter().map(|m| ("phrase", phrases.key_name(m.key), m));
        for (kind, key, m) in pattern_rows.chain(phrase_rows) {
            let row =
                MatchRow { kind, key: key.unwrap_or("?"), start: m.start, end: m.end, text: doc.span_text(m.start, m.end) };
            println!("{}", serde_json::to_string(&row)?);
        }
        return Ok(());
    }

    let color = if cli.color {
        true
    } else if cli.no_color {
        false
    } else {
        io::stdout().is_terminal()
    };
    let report = debug_report::Report {
        doc: &doc,
        matcher: &matcher,
        phrases: &phrases,
        matches: &run.matches,
        phrase_matches: &phrase_matches,
        metrics: &run.metrics,
    };
    debug_report::print_run(&report, color);
    Ok(())
}

fn read_stdin_input() -> anyhow::Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).context("failed to read stdin")?;
    Ok(buffer)
}
