//! # RustyFFN: layered feedforward networks in Rust
//!
//! **RustyFFN** models a fully-connected, layered feedforward network: a fixed
//! topology of layers joined by dense weight matrices, each layer subtracting a
//! per-neuron bias and applying an activation function.
//!
//! The crate is split along the lifetime of a network:
//!
//! - [`topology`]: a validated, purely descriptive [`TopologyDescriptor`](topology::TopologyDescriptor)
//! - [`nn`]: the [`PropagationEngine`](nn::PropagationEngine) that executes forward passes
//! - [`serialization`]: XML and JSON documents for topologies
//! - [`harness`]: a throughput benchmark over random networks
//!
//! ## Usage Example
//!
//! ```
//! use ndarray::array;
//! use rustyffn::nn::{ActivationKind, PropagationEngine};
//! use rustyffn::topology::TopologyDescriptor;
//!
//! // 1. Describe the network
//! let mut topology = TopologyDescriptor::new();
//! topology.append_layer(array![0.0, 0.0], ActivationKind::Identity, None)?;
//! topology.append_layer(array![0.5], ActivationKind::Logistic, Some(array![[1.0], [1.0]]))?;
//!
//! // 2. Build the engine (it takes ownership of the parameters)
//! let mut engine = PropagationEngine::from(topology);
//!
//! // 3. Execute forward passes
//! let output = engine.execute(&[0.25, 0.25])?;
//! assert_eq!(output[0], 0.5);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod harness;
pub mod nn;
pub mod serialization;
pub mod topology;
