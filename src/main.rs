//! olg-equilibrium CLI
//!
//! Solve overlapping-generations economies from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Write the baseline model config
//! olg-equilibrium init --output baseline.json
//!
//! # Find the equilibrium interest rate
//! olg-equilibrium solve --config baseline.json
//!
//! # Inspect the credit market at a given gross rate
//! olg-equilibrium imbalance --config baseline.json --rate 1.05 --format json
//!
//! # Sweep the discount factor
//! olg-equilibrium sweep --config baseline.json --param beta --from 0.9 --to 0.99 --steps 10
//! ```
//!
//! Set `RUST_LOG=debug` to trace every agent solve.

use olg_equilibrium::config::ModelConfig;
use olg_equilibrium::market::aggregation::{market_snapshot, MarketSnapshot};
use olg_equilibrium::market::equilibrium::{Equilibrium, EquilibriumSolver};
use olg_equilibrium::simulation::comparative_statics::{linspace, ComparativeStatics, Parameter};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"olg-equilibrium — general-equilibrium interest rates in an OLG economy

USAGE:
    olg-equilibrium <COMMAND> [OPTIONS]

COMMANDS:
    init        Write the baseline model config
    solve       Find the market-clearing interest rate
    imbalance   Evaluate the credit market at one interest rate
    sweep       Re-solve the model over a range of one parameter
    help        Show this message

OPTIONS (solve, imbalance, sweep):
    --config <FILE>     Path to JSON model config (default: baseline)
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (solve):
    --r-min <R>         Lower end of the gross-rate bracket
    --r-max <R>         Upper end of the gross-rate bracket

OPTIONS (imbalance):
    --rate <R>          Gross interest rate R = 1 + r

OPTIONS (sweep):
    --param <NAME>      beta, sigma, phi, g, tax_rate_young, tax_rate_old,
                        government_consumption, transfer_payment, tfp,
                        capital_share, depreciation
    --from <X>          First value
    --to <X>            Last value
    --steps <N>         Number of values (default: 10)
    --output <FILE>     Write to file instead of stdout

OPTIONS (init):
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    olg-equilibrium init --output baseline.json
    olg-equilibrium solve --config baseline.json --r-min 0.9 --r-max 1.3
    olg-equilibrium imbalance --config baseline.json --rate 1.05
    olg-equilibrium sweep --config baseline.json --param tax_rate_young --from 0 --to 0.2 --steps 5"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Value following flag `args[i]`.
fn value<'a>(args: &'a [String], i: usize, what: &str) -> &'a str {
    args.get(i + 1)
        .map(String::as_str)
        .unwrap_or_else(|| fail(format!("{} requires {}", args[i], what)))
}

fn number<T: std::str::FromStr>(args: &[String], i: usize, what: &str) -> T {
    value(args, i, what)
        .parse()
        .unwrap_or_else(|_| fail(format!("{} requires {}", args[i], what)))
}

fn load_config(path: Option<&str>) -> ModelConfig {
    match path {
        Some(path) => ModelConfig::from_path(path).unwrap_or_else(|e| fail(e)),
        None => ModelConfig::default(),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(e))
}

fn write_output(output_path: Option<&str>, contents: &str) {
    match output_path {
        Some(path) => {
            fs::write(path, contents)
                .unwrap_or_else(|e| fail(format!("writing to '{}': {}", path, e)));
            eprintln!("Wrote {}", path);
        }
        None => println!("{}", contents),
    }
}

fn check_format(format: &str) {
    if format != "text" && format != "json" {
        fail(format!("unknown format '{}', expected text or json", format));
    }
}

fn cmd_init(args: &[String]) {
    let mut output_path = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--output" => output_path = Some(value(args, i, "a file path")),
            other => fail(format!("unknown option: {}", other)),
        }
        i += 2;
    }

    let config = ModelConfig::default();
    let json = config.to_json_pretty().unwrap_or_else(|e| fail(e));
    write_output(output_path, &json);
}

fn cmd_solve(args: &[String]) {
    let mut config_path = None;
    let mut format = "text";
    let mut r_min = None;
    let mut r_max = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => config_path = Some(value(args, i, "a file path")),
            "--format" => format = value(args, i, "'text' or 'json'"),
            "--r-min" => r_min = Some(number::<f64>(args, i, "a number")),
            "--r-max" => r_max = Some(number::<f64>(args, i, "a number")),
            other => fail(format!("unknown option: {}", other)),
        }
        i += 2;
    }
    check_format(format);

    let config = load_config(config_path);
    let economy = config.build_economy().unwrap_or_else(|e| fail(e));
    let (default_min, default_max) = config.bracket();
    let bracket = (r_min.unwrap_or(default_min), r_max.unwrap_or(default_max));

    let equilibrium = EquilibriumSolver::default()
        .find_equilibrium(&economy, bracket.0, bracket.1)
        .unwrap_or_else(|e| fail(e));
    let snapshot = market_snapshot(&economy, equilibrium.gross_rate).unwrap_or_else(|e| fail(e));

    if format == "json" {
        #[derive(serde::Serialize)]
        struct SolveOutput<'a> {
            equilibrium: &'a Equilibrium,
            market: &'a MarketSnapshot,
        }
        println!(
            "{}",
            to_json(&SolveOutput {
                equilibrium: &equilibrium,
                market: &snapshot,
            })
        );
    } else {
        println!("{}", equilibrium);
        println!();
        print!("{}", snapshot);
    }
}

fn cmd_imbalance(args: &[String]) {
    let mut config_path = None;
    let mut format = "text";
    let mut rate = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => config_path = Some(value(args, i, "a file path")),
            "--format" => format = value(args, i, "'text' or 'json'"),
            "--rate" => rate = Some(number::<f64>(args, i, "a gross interest rate")),
            other => fail(format!("unknown option: {}", other)),
        }
        i += 2;
    }
    check_format(format);

    let rate = rate.unwrap_or_else(|| fail("--rate <R> is required"));
    let economy = load_config(config_path)
        .build_economy()
        .unwrap_or_else(|e| fail(e));
    let snapshot = market_snapshot(&economy, rate).unwrap_or_else(|e| fail(e));

    if format == "json" {
        println!("{}", to_json(&snapshot));
    } else {
        print!("{}", snapshot);
    }
}

fn cmd_sweep(args: &[String]) {
    let mut config_path = None;
    let mut format = "text";
    let mut parameter = None;
    let mut from = None;
    let mut to = None;
    let mut steps = 10usize;
    let mut output_path = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => config_path = Some(value(args, i, "a file path")),
            "--format" => format = value(args, i, "'text' or 'json'"),
            "--param" => {
                parameter = Some(
                    value(args, i, "a parameter name")
                        .parse::<Parameter>()
                        .unwrap_or_else(|e| fail(e)),
                )
            }
            "--from" => from = Some(number::<f64>(args, i, "a number")),
            "--to" => to = Some(number::<f64>(args, i, "a number")),
            "--steps" => steps = number(args, i, "a count"),
            "--output" => output_path = Some(value(args, i, "a file path")),
            other => fail(format!("unknown option: {}", other)),
        }
        i += 2;
    }
    check_format(format);

    let parameter = parameter.unwrap_or_else(|| fail("--param <NAME> is required"));
    let from = from.unwrap_or_else(|| fail("--from <X> is required"));
    let to = to.unwrap_or_else(|| fail("--to <X> is required"));

    let statics = ComparativeStatics::new(load_config(config_path));
    let report = statics.run(parameter, &linspace(from, to, steps));

    let rendered = if format == "json" {
        to_json(&report)
    } else {
        report.to_string()
    };
    write_output(output_path, &rendered);
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "init" => cmd_init(rest),
        "solve" => cmd_solve(rest),
        "imbalance" => cmd_imbalance(rest),
        "sweep" => cmd_sweep(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
