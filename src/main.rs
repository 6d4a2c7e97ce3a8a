//! `ferrite-gates`: run the bundled quantized gate models.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- test                       # golden-vector check of every gate
//! cargo run -- test --gate xor
//! cargo run -- run --gate and --cycles 40 --seed 7
//! cargo run -- inspect --gate xnor
//! ```

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

use ferrite_gates::engine::{Interpreter, Workspace};
use ferrite_gates::harness::{run_gate_test, test_gates, Gate, GateOutcome};
use ferrite_gates::io_loop::{run_io_loop, LoopConfig, SimulatedBoard, StdDelay};
use ferrite_gates::{Model, OpRegistry, TENSOR_ARENA_SIZE};

#[derive(Parser, Debug)]
#[command(name = "ferrite-gates", version, about = "8-bit quantized logic gates", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check gate models against their truth tables.
    Test {
        /// Only test this gate.
        #[arg(long)]
        gate: Option<Gate>,
    },
    /// Drive the actuation loop on a simulated board with random button presses.
    Run {
        #[arg(long, default_value = "and")]
        gate: Gate,
        /// Stop after this many cycles; runs until interrupted if omitted.
        #[arg(long)]
        cycles: Option<u64>,
        #[arg(long, default_value_t = 50)]
        period_ms: u64,
        /// Seed for the simulated button presses.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Probability that a button changes state between two reads.
        #[arg(long, default_value_t = 0.2)]
        toggle_probability: f64,
    },
    /// Print a model's tensors, operators and workspace usage.
    Inspect {
        #[arg(long, conflicts_with = "model")]
        gate: Option<Gate>,
        /// Path to a model JSON file.
        #[arg(long)]
        model: Option<String>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level_filter = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(log_level_filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    match args.command {
        Command::Test { gate } => run_tests(gate),
        Command::Run { gate, cycles, period_ms, seed, toggle_probability } => {
            let mut config = LoopConfig::new().with_period(Duration::from_millis(period_ms));
            if let Some(n) = cycles {
                config = config.with_max_cycles(n);
            }
            let mut board = SimulatedBoard::with_button_presses(seed, toggle_probability);
            info!("driving {gate} gate on a simulated board");
            let summary = run_io_loop(&mut board, &mut StdDelay, gate.model_blob(), &config);
            println!(
                "{} cycles, {} actuations, {} failures",
                summary.cycles, summary.actuations, summary.failures
            );
            if summary.failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }
        Command::Inspect { gate, model } => inspect(gate, model),
    }
}

fn run_tests(gate: Option<Gate>) -> ExitCode {
    let outcomes = match gate {
        Some(gate) => vec![GateOutcome {
            gate,
            result: run_gate_test(gate.model_blob(), &gate.golden_vectors()),
        }],
        None => test_gates(),
    };

    let mut all_ok = true;
    for outcome in &outcomes {
        println!("test_{}_gate_8bit", outcome.gate);
        match &outcome.result {
            Ok(report) => println!("{report}"),
            Err(e) => println!("error: {e}"),
        }
        all_ok &= outcome.passed();
    }
    if all_ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn inspect(gate: Option<Gate>, path: Option<String>) -> ExitCode {
    let loaded = match (gate, path) {
        (_, Some(path)) => Model::load_json(&path),
        (gate, None) => Model::from_bytes(gate.unwrap_or(Gate::And).model_blob()),
    };
    let model = match loaded {
        Ok(model) => model,
        Err(e) => {
            error!("Failed to load model: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!("{}", model.summary());

    let registry = match OpRegistry::for_gates() {
        Ok(registry) => registry,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let mut arena = [0u8; TENSOR_ARENA_SIZE];
    let mut interpreter = Interpreter::new(&model, &registry, Workspace::new(&mut arena));
    match interpreter.allocate_tensors() {
        Ok(()) => {
            println!("workspace: {} of {} bytes", interpreter.arena_used_bytes(), TENSOR_ARENA_SIZE);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Allocate tensor failed: {e}");
            ExitCode::FAILURE
        }
    }
}
