//! Command-line front end: benchmark, run, inspect and convert networks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ndarray::Array1;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustyffn::harness::{run_benchmark, HarnessConfig};
use rustyffn::nn::PropagationEngine;
use rustyffn::serialization::{load_topology, save_topology};
use rustyffn::topology::TopologyDescriptor;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "rustyffn", author, version, about = "RustyFFN: feedforward network runner and benchmark", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Measure construction time and throughput of a random network
    Bench {
        /// Layer sizes, input first (e.g. 8,32,32,4)
        #[arg(long, value_delimiter = ',')]
        layers: Option<Vec<usize>>,

        /// Number of timed executions
        #[arg(short = 'n', long)]
        executions: Option<usize>,

        /// Seed for parameters and inputs
        #[arg(long)]
        seed: Option<u64>,

        /// JSON harness configuration; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Log every input and output vector
        #[arg(long)]
        print_vectors: bool,

        /// Save the generated topology (.xml or .json)
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Execute a network stored in a file
    Run {
        /// Topology file (.xml or .json)
        network: PathBuf,

        /// Input vector; random values in [0, 1) when omitted
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
        input: Option<Vec<f64>>,

        /// Seed for the random input
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the shape of a stored network
    Inspect {
        /// Topology file (.xml or .json)
        network: PathBuf,
    },

    /// Convert a topology between formats, chosen by file extension
    Convert { input: PathBuf, output: PathBuf },
}

fn init_tracing(log_level: &str) -> Result<()> {
    let level: Level = log_level
        .parse()
        .with_context(|| format!("invalid log level '{log_level}'"))?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install log subscriber")?;
    Ok(())
}

fn print_vector(title: &str, values: &[f64]) {
    println!("{title}");
    for value in values {
        println!("{value}");
    }
    println!();
}

fn bench(
    layers: Option<Vec<usize>>,
    executions: Option<usize>,
    seed: Option<u64>,
    config: Option<PathBuf>,
    print_vectors: bool,
    save: Option<PathBuf>,
) -> Result<()> {
    let mut harness = match config {
        Some(path) => HarnessConfig::from_json_file(&path)
            .with_context(|| format!("failed to load harness configuration {}", path.display()))?,
        None => HarnessConfig::new(),
    };
    if let Some(layers) = layers {
        harness = harness.with_layer_sizes(layers);
    }
    if let Some(executions) = executions {
        harness = harness.with_executions(executions);
    }
    if let Some(seed) = seed {
        harness = harness.with_seed(seed);
    }
    if print_vectors {
        harness = harness.with_print_vectors(true);
    }

    let report = run_benchmark(&harness)?;
    println!("{report}");

    if let Some(path) = save {
        save_topology(&path, &report.topology)
            .with_context(|| format!("failed to save topology to {}", path.display()))?;
        info!(path = %path.display(), "Saved benchmark topology");
    }
    Ok(())
}

fn run(network: PathBuf, input: Option<Vec<f64>>, seed: Option<u64>) -> Result<()> {
    let topology = load_topology(&network)
        .with_context(|| format!("failed to load network {}", network.display()))?;
    let mut engine = PropagationEngine::from(topology);

    let input = match input {
        Some(values) => Array1::from(values),
        None => {
            let size = engine.input_size().unwrap_or_default();
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            Array1::random_using(size, Uniform::new(0.0, 1.0), &mut rng)
        }
    };

    let output = engine.execute(&input)?;
    print_vector("Input:", &input.to_vec());
    print_vector("Output:", &output.to_vec());
    Ok(())
}

fn inspect(network: PathBuf) -> Result<()> {
    let topology: TopologyDescriptor = load_topology(&network)
        .with_context(|| format!("failed to load network {}", network.display()))?;

    println!("{}: {} layer(s)", network.display(), topology.len());
    for (index, layer) in topology.layers().iter().enumerate() {
        let role = match index {
            0 => "input",
            i if i + 1 == topology.len() => "output",
            _ => "hidden",
        };
        println!("  layer {index} ({role}): {} neuron(s), {}", layer.size(), layer.activation());
    }
    for (index, connection) in topology.connections().iter().enumerate() {
        let (rows, cols) = connection.dim();
        println!("  connection {index} -> {}: {rows} x {cols}", index + 1);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Bench {
            layers,
            executions,
            seed,
            config,
            print_vectors,
            save,
        } => bench(layers, executions, seed, config, print_vectors, save),
        Commands::Run { network, input, seed } => run(network, input, seed),
        Commands::Inspect { network } => inspect(network),
        Commands::Convert { input, output } => {
            let topology = load_topology(&input)
                .with_context(|| format!("failed to load network {}", input.display()))?;
            save_topology(&output, &topology)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Converted {} -> {}", input.display(), output.display());
            Ok(())
        }
    }
}
