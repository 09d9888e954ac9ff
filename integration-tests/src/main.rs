//! Test runner for the launcher
//!
//! Runs every scenario against a built `probe-launcher` binary and prints a
//! PASS/FAILED line per scenario.
//!
//! Usage: test-runner --probe <path> [--only <scenario>]...

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::Parser;

use launcher_harness::{Harness, Scenario, SCENARIOS};

#[derive(Parser, Debug)]
#[command(name = "test-runner")]
#[command(about = "Run the launcher scenarios against a probe binary")]
struct Args {
    /// Path to the probe-launcher binary
    #[arg(long)]
    probe: PathBuf,

    /// Run only these scenarios (can be repeated)
    #[arg(long = "only", value_name = "SCENARIO")]
    only: Vec<String>,
}

fn selected(args: &Args) -> Result<Vec<(&'static str, Scenario)>> {
    if args.only.is_empty() {
        return Ok(SCENARIOS.to_vec());
    }
    args.only
        .iter()
        .map(|name| {
            SCENARIOS
                .iter()
                .find(|(known, _)| known == name)
                .copied()
                .ok_or_else(|| anyhow!("unknown scenario: {}", name))
        })
        .collect()
}

fn main() -> ExitCode {
    println!("=== Launcher Test Suite ===");
    println!();

    let args = Args::parse();

    let harness = match Harness::new(&args.probe) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(1);
        }
    };
    let tests = match selected(&args) {
        Ok(tests) => tests,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(1);
        }
    };

    println!("Probe: {}", harness.probe().display());
    println!();
    println!("Running {} tests...", tests.len());
    println!();

    let mut passed = 0;
    let mut failed = 0;

    for (name, test_fn) in &tests {
        println!("  Running test: {}", name);
        match test_fn(&harness) {
            Ok(()) => {
                println!("    PASS");
                passed += 1;
            }
            Err(e) => {
                println!("  FAILED: {:#}", e);
                failed += 1;
            }
        }
    }

    println!();
    println!("=== Results ===");
    println!("Passed: {}", passed);
    println!("Failed: {}", failed);
    println!();

    if failed > 0 {
        ExitCode::from(1)
    } else {
        println!("All tests passed!");
        ExitCode::SUCCESS
    }
}
