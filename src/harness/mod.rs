//! # Performance Harness
//!
//! Synthesizes a network with random parameters, then measures how long it
//! takes to build and how many forward passes per second it sustains.
//!
//! ```rust,ignore
//! use rustyffn::harness::{run_benchmark, HarnessConfig};
//!
//! let config = HarnessConfig::new()
//!     .with_layer_sizes(vec![16, 64, 4])
//!     .with_executions(1_000)
//!     .with_seed(42);
//! let report = run_benchmark(&config)?;
//! println!("{report}");
//! ```

pub mod config;
pub mod stats;

pub use config::HarnessConfig;
pub use stats::ExecutionStats;

use crate::nn::{ActivationKind, NetworkError, PropagationEngine};
use crate::topology::{TopologyDescriptor, TopologyError, TopologyResult};
use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Invalid harness configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read harness configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse harness configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

/// Builds a topology of the given layer sizes with biases and weights drawn
/// uniformly from `[0, 1)`.
///
/// The first layer uses `input_activation`, every other layer
/// `hidden_activation`.
pub fn random_topology<R: Rng + ?Sized>(
    layer_sizes: &[usize],
    input_activation: ActivationKind,
    hidden_activation: ActivationKind,
    rng: &mut R,
) -> TopologyResult<TopologyDescriptor> {
    let unit = Uniform::new(0.0, 1.0);
    let mut topology = TopologyDescriptor::new();

    for (index, &size) in layer_sizes.iter().enumerate() {
        let biases = Array1::random_using(size, unit, rng);
        if index == 0 {
            topology.append_layer(biases, input_activation, None)?;
        } else {
            let connections = Array2::random_using((layer_sizes[index - 1], size), unit, rng);
            topology.append_layer(biases, hidden_activation, Some(connections))?;
        }
    }
    Ok(topology)
}

/// Result of one harness run.
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    /// The synthesized topology, e.g. for saving it.
    pub topology: TopologyDescriptor,
    /// Time to generate the topology and build the engine.
    pub construction: Duration,
    pub stats: ExecutionStats,
    /// Output of the final execution.
    pub last_output: Vec<f64>,
}

impl BenchmarkReport {
    /// Executions per second, `None` when the runs were too fast to time.
    pub fn throughput(&self) -> Option<f64> {
        self.stats.throughput()
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Layers:        {:?}", self.topology.layer_sizes())?;
        writeln!(f, "Create:        {:?}", self.construction)?;
        writeln!(f, "Executions:    {}", self.stats.count())?;
        writeln!(
            f,
            "Latency:       mean {:?}, std {:?}, min {:?}, max {:?}",
            self.stats.mean(),
            self.stats.std_dev(),
            self.stats.min().unwrap_or_default(),
            self.stats.max().unwrap_or_default()
        )?;
        match self.throughput() {
            Some(throughput) => write!(f, "Avg. throughput: {throughput:.1} executions per second"),
            None => write!(f, "Avg. throughput: n/a (executions below timer resolution)"),
        }
    }
}

/// Runs the benchmark described by `config`.
pub fn run_benchmark(config: &HarnessConfig) -> HarnessResult<BenchmarkReport> {
    config.validate()?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!(sizes = ?config.layer_sizes, executions = config.executions, "Starting benchmark");

    let started = Instant::now();
    let topology = random_topology(
        &config.layer_sizes,
        config.input_activation,
        config.hidden_activation,
        &mut rng,
    )?;
    let mut engine = PropagationEngine::from_descriptor(&topology);
    let construction = started.elapsed();
    info!(?construction, "Network created");

    let unit = Uniform::new(0.0, 1.0);
    let input_size = config.layer_sizes[0];
    let mut stats = ExecutionStats::new();
    let mut last_output = Vec::new();

    for run in 0..config.executions {
        let input = Array1::random_using(input_size, unit, &mut rng);

        let started = Instant::now();
        let output = engine.execute(&input)?;
        stats.record(started.elapsed());

        if config.print_vectors {
            info!(run, input = ?input.to_vec(), output = ?output.to_vec(), "Executed network");
        }
        if run + 1 == config.executions {
            last_output = output.to_vec();
        }
    }

    info!(throughput = ?stats.throughput(), "Benchmark finished");
    Ok(BenchmarkReport {
        topology,
        construction,
        stats,
        last_output,
    })
}
