//! `desflow`: drives the bisimulation engine and the pushdown synthesis
//! pipeline from the command line (`spec.md` §6).

mod console;
mod dot;
mod model_io;
mod tokens;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::Verbosity;
use desflow_core::bisim::{delayed_weak_bisimulation, strong_bisimulation, Variant};
use desflow_core::cancel::Never;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "desflow", version, about = "Change-tracking bisimulation and pushdown supervisor synthesis")]
struct Cli {
    /// Repeat for more detail (`-v`, `-vv`); the default matches §6.6 "normal".
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum BisimKind {
    Strong,
    Delayed,
    Weak,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a bisimulation partition of an automaton loaded from a
    /// token-stream file and print the resulting classes.
    Bisim {
        /// Token-stream file holding a `<Generator>` section.
        input: PathBuf,
        #[arg(long, value_enum, default_value = "strong")]
        kind: BisimKind,
        /// Name of the silent event, required for `delayed`/`weak`.
        #[arg(long)]
        silent_event: Option<String>,
    },
    /// Export an automaton's DOT rendering (`spec.md` §6.3, export only).
    Dot {
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Pushdown supervisor synthesis (`spec.md` §4.12/§4.13).
    Synth {
        #[command(subcommand)]
        op: SynthOp,
    },
}

#[derive(Subcommand)]
enum SynthOp {
    /// `PushdownBlockfree`: make a DPDA's marked language nonblocking.
    Blockfree {
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// `PushdownConstructController`: synthesize a maximally permissive,
    /// nonblocking, controllable supervisor for `plant`/`spec`.
    Controller {
        plant: PathBuf,
        spec: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    console::init_logging(Verbosity::from_count(cli.verbose));

    if let Err(e) = run(cli.command) {
        match e.downcast_ref::<desflow_core::error::Error>() {
            Some(core_err) => std::process::exit(console::report_and_exit_code(core_err)),
            None => {
                eprintln!("desflow: error: {e:#}");
                std::process::exit(1);
            }
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Bisim {
            input,
            kind,
            silent_event,
        } => run_bisim(&input, kind, silent_event.as_deref()),
        Command::Dot { input, output } => run_dot(&input, output.as_deref()),
        Command::Synth { op } => match op {
            SynthOp::Blockfree { input, output } => run_blockfree(&input, output.as_deref()),
            SynthOp::Controller { plant, spec, output } => run_controller(&plant, &spec, output.as_deref()),
        },
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text).with_context(|| format!("writing {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn run_bisim(input: &Path, kind: BisimKind, silent_event: Option<&str>) -> Result<()> {
    let text = read_to_string(input)?;
    let g = model_io::read_automaton(&text).map_err(|e| anyhow::anyhow!("{e}"))?;

    let classes = match kind {
        BisimKind::Strong => strong_bisimulation(&g, None, &Never)?,
        BisimKind::Delayed | BisimKind::Weak => {
            let name = silent_event
                .context("--silent-event is required for delayed/weak bisimulation")?;
            let silent = g
                .symbols()
                .event_named(name)
                .with_context(|| format!("unknown event `{name}`"))?;
            let variant = if matches!(kind, BisimKind::Delayed) {
                Variant::Delayed
            } else {
                Variant::Weak
            };
            delayed_weak_bisimulation(&g, silent, variant, None, &Never)?
        }
    };

    for (i, class) in classes.iter().enumerate() {
        let members: Vec<String> = class.iter().map(|q| q.to_string()).collect();
        println!("class {i}: {}", members.join(" "));
    }
    Ok(())
}

fn run_dot(input: &Path, output: Option<&Path>) -> Result<()> {
    let text = read_to_string(input)?;
    let g = model_io::read_automaton(&text).map_err(|e| anyhow::anyhow!("{e}"))?;
    write_output(output, &dot::export(&g))
}

fn run_blockfree(input: &Path, output: Option<&Path>) -> Result<()> {
    let text = read_to_string(input)?;
    let pda = model_io::read_pda(&text).map_err(|e| anyhow::anyhow!("{e}"))?;
    let result = desflow_core::synth::pushdown_blockfree(&pda, &Never)?;
    write_output(output, &model_io::write_pda(&result))
}

fn run_controller(plant_path: &Path, spec_path: &Path, output: Option<&Path>) -> Result<()> {
    let plant_text = read_to_string(plant_path)?;
    let spec_text = read_to_string(spec_path)?;
    let plant = model_io::read_automaton(&plant_text).map_err(|e| anyhow::anyhow!("{e}"))?;
    let spec = model_io::read_pda(&spec_text).map_err(|e| anyhow::anyhow!("{e}"))?;
    let controller = desflow_core::synth::construct_controller(&plant, &spec, &Never)?;
    write_output(output, &model_io::write_pda(&controller))
}
