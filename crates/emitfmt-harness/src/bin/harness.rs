//! CLI entrypoint for the emitfmt conformance harness.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use emitfmt_core::{
    Arg, ArgCursor, BufferSink, StringSink, check_signature, extract_signature, render,
};
use emitfmt_harness::fixtures::parse_tags;
use emitfmt_harness::structured_log::LogEmitter;
use emitfmt_harness::{FixtureArg, FixtureSet, Mismatch, TestRunner, VerificationSummary};

/// Conformance tooling for emitfmt.
#[derive(Debug, Parser)]
#[command(name = "emitfmt-harness")]
#[command(about = "Render, inspect and verify printf-style format strings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a format string and print the output and reported length.
    Render {
        /// Format string.
        #[arg(long)]
        format: String,
        /// Argument as `<kind>:<value>` (int, half, long, ll, double, L, str, ptr).
        #[arg(long = "arg")]
        args: Vec<FixtureArg>,
        /// Render into a fixed buffer of this many bytes.
        #[arg(long)]
        capacity: Option<usize>,
    },
    /// Print the argument type tags a format string implies, or check them.
    Signature {
        /// Format string.
        #[arg(long)]
        format: String,
        /// Maximum number of tags to extract.
        #[arg(long, default_value_t = 64)]
        max: usize,
        /// Comma-separated tag names to check against (e.g. `int,string`).
        #[arg(long)]
        check: Option<String>,
    },
    /// Verify the engine against a fixture file or a directory of fixtures.
    Verify {
        /// Fixture JSON file or directory.
        #[arg(long, default_value = "tests/fixtures/format_core.v1.json")]
        fixture: PathBuf,
        /// Structured JSONL log output path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Campaign name used in trace ids.
        #[arg(long, default_value = "emitfmt")]
        campaign: String,
        /// Run identifier used in trace ids.
        #[arg(long, default_value = "local")]
        run_id: String,
    },
}

fn load_fixture_sets(path: &Path) -> Result<Vec<FixtureSet>, Box<dyn std::error::Error>> {
    if path.is_file() {
        return Ok(vec![FixtureSet::from_file(path)?]);
    }
    let mut fixture_paths: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    fixture_paths.sort();

    let mut sets = Vec::new();
    for path in fixture_paths {
        match FixtureSet::from_file(&path) {
            Ok(set) => sets.push(set),
            Err(err) => eprintln!("Skipping {}: {}", path.display(), err),
        }
    }
    if sets.is_empty() {
        return Err(format!("No fixture JSON files found in {}", path.display()).into());
    }
    Ok(sets)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            format,
            args,
            capacity,
        } => {
            let engine_args: Vec<Arg<'_>> = args.iter().map(FixtureArg::to_arg).collect();
            let mut cursor = ArgCursor::new(&engine_args);
            let (bytes, len) = match capacity {
                Some(capacity) => {
                    let mut storage = vec![0u8; capacity];
                    let mut sink = BufferSink::new(&mut storage);
                    let len = render(&mut sink, &format, &mut cursor)?;
                    (sink.written().to_vec(), len)
                }
                None => {
                    let mut sink = StringSink::new();
                    let len = render(&mut sink, &format, &mut cursor)?;
                    (sink.into_bytes(), len)
                }
            };
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            writeln!(stdout)?;
            eprintln!("length={len}");
        }
        Command::Signature { format, max, check } => match check {
            Some(list) => {
                let names: Vec<&str> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect();
                let expected = parse_tags(names.as_slice())?;
                check_signature(&format, &expected)?;
                println!("ok ({} arguments)", expected.len());
            }
            None => {
                for (i, tag) in extract_signature(&format, max)?.iter().enumerate() {
                    println!("{i}: {tag}");
                }
            }
        },
        Command::Verify {
            fixture,
            log,
            campaign,
            run_id,
        } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let sets = load_fixture_sets(&fixture)?;
            let mut emitter = match &log {
                Some(path) => LogEmitter::to_file(path, &campaign, &run_id)?,
                None => LogEmitter::to_buffer(&campaign, &run_id),
            };

            let runner = TestRunner::new(&campaign);
            let mut results = Vec::new();
            for set in &sets {
                results.extend(runner.run_logged(set, &mut emitter)?.results);
            }
            let summary = VerificationSummary::from_results(results);

            for failure in summary.failures() {
                eprintln!("FAIL {} ({:?})", failure.case_name, failure.format);
                if let Some(diff) = &failure.diff {
                    eprintln!("{diff}");
                }
            }
            eprintln!(
                "Verification complete: total={}, passed={}, failed={} (output={}, length={}, signature={})",
                summary.total,
                summary.passed,
                summary.failed,
                summary.count_mismatch(Mismatch::Output),
                summary.count_mismatch(Mismatch::Length),
                summary.count_mismatch(Mismatch::Signature),
            );
            if let Some(path) = &log {
                eprintln!("Wrote structured log to {}", path.display());
            }

            if !summary.all_passed() {
                return Err("Fixture verification failed".into());
            }
        }
    }

    Ok(())
}
