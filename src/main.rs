use std::io::{self, BufWriter, Read, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use linext::{Engine, Poset, Step};
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "linext", version)]
#[command(about = "Enumerate the linear extensions of a partial order read from stdin")]
struct Args {
    /// Read NDJSON rows; each row's key order is a chain
    #[arg(long)]
    rows: bool,

    /// Stop after this many extensions (or walk steps)
    #[arg(long)]
    limit: Option<usize>,

    /// Print only the number of extensions generated
    #[arg(long, conflicts_with = "walk")]
    count: bool,

    /// Print every state of the signed walk instead of the extensions
    #[arg(long)]
    walk: bool,

    /// Print the Hasse diagram and the incomparable pairs, then exit
    #[arg(long, conflicts_with_all = ["walk", "count"])]
    hasse: bool,
}

#[derive(Serialize)]
struct WalkRecord<'a> {
    step: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    slot: Option<usize>,
    positive: bool,
    extension: Vec<&'a str>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn label(v: Value) -> String {
    match v {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// A chain: either an array of labels or an object whose key order matters.
fn chain(v: Value) -> Result<Vec<String>> {
    match v {
        Value::Array(items) => Ok(items.into_iter().map(label).collect()),
        Value::Object(map) => Ok(map.keys().cloned().collect()),
        other => bail!("row must be a JSON array or object, got {other}"),
    }
}

fn read_poset(input: &str, rows: bool) -> Result<Poset<String>> {
    let s = input.trim();
    if rows {
        let chains = s
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str::<Value>(l).context("invalid JSON line").and_then(chain))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Poset::from_chains(&chains)?);
    }

    match serde_json::from_str::<Value>(s).context("input is not a JSON document")? {
        Value::Object(map) => {
            let adjacency = map.into_iter().map(|(k, v)| {
                let succs = match v {
                    Value::Array(items) => items.into_iter().map(label).collect(),
                    Value::Null => Vec::new(),
                    other => vec![label(other)],
                };
                (k, succs)
            });
            Ok(Poset::from_adjacency(adjacency)?)
        }
        Value::Array(items) => {
            let chains = items.into_iter().map(chain).collect::<Result<Vec<_>>>()?;
            Ok(Poset::from_chains(&chains)?)
        }
        other => bail!("expected a JSON object or array, got {other}"),
    }
}

fn print_hasse(poset: &Poset<String>, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{poset}")?;
    writeln!(out, "Hasse edges:")?;
    for u in 0..poset.len() {
        let vs = poset.upper_covers(u);
        if !vs.is_empty() {
            let tos: Vec<_> = vs.iter().map(|&v| poset.label(v)).collect();
            writeln!(out, "  {} -> {:?}", poset.label(u), tos)?;
        }
    }
    writeln!(out, "Incomparable:")?;
    for (i, j) in poset.incomparable_pairs() {
        writeln!(out, "  {} ? {}", poset.label(i), poset.label(j))?;
    }
    Ok(())
}

fn print_walk(poset: &Poset<String>, limit: usize, out: &mut impl Write) -> Result<()> {
    let mut engine = Engine::new(poset);
    let record = |step: &'static str, slot: Option<usize>, engine: &Engine<'_, String>| WalkRecord {
        step,
        slot,
        positive: engine.is_positive(),
        extension: engine.permutation().iter().map(|&e| poset.label(e).as_str()).collect(),
    };

    writeln!(out, "{}", serde_json::to_string(&record("start", None, &engine))?)?;
    for _ in 0..limit {
        let Some(step) = engine.advance() else { break };
        let rec = match step {
            Step::Swap { slot } => record("swap", Some(slot), &engine),
            Step::Flip => record("flip", None, &engine),
        };
        writeln!(out, "{}", serde_json::to_string(&rec)?)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
    let poset = read_poset(&buf, args.rows)?;
    info!(elements = poset.len(), "read order");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let limit = args.limit.unwrap_or(usize::MAX);

    if args.hasse {
        print_hasse(&poset, &mut out)?;
    } else if args.walk {
        print_walk(&poset, limit, &mut out)?;
    } else if args.count {
        writeln!(out, "{}", poset.linear_extensions().take(limit).count())?;
    } else {
        for ext in poset.linear_extensions().take(limit) {
            writeln!(out, "{}", serde_json::to_string(&ext)?)?;
        }
    }
    out.flush()?;
    Ok(())
}
