//! # Neural Network Module
//!
//! Live, executable networks.
//!
//! ## Components
//!
//! - [`Activation`] / [`ActivationKind`]: elementwise nonlinearities and their
//!   serializable tags (identity, logistic)
//! - [`Layer`]: biases, activation and the output buffer of one layer
//! - [`PropagationEngine`]: ordered layers plus connection matrices, executes
//!   forward passes
//!
//! ## Example
//!
//! ```
//! use ndarray::array;
//! use rustyffn::nn::{ActivationKind, PropagationEngine};
//! use rustyffn::topology::TopologyDescriptor;
//!
//! let mut topology = TopologyDescriptor::new();
//! topology.append_layer(array![0.0, 0.0], ActivationKind::Identity, None)?;
//! topology.append_layer(
//!     array![0.0, 0.0, 0.0],
//!     ActivationKind::Logistic,
//!     Some(array![[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]]),
//! )?;
//! topology.append_layer(array![0.0], ActivationKind::Logistic, Some(array![[1.0], [1.0], [1.0]]))?;
//!
//! let mut engine = PropagationEngine::from(topology);
//! let output = engine.execute(&[1.0, -1.0])?;
//! assert!((output[0] - 0.8176).abs() < 1e-4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod activations;
pub mod layer;
pub mod network;

pub use activations::{Activation, ActivationKind, DEFAULT_LOGISTIC_SLOPE};
pub use layer::Layer;
pub use network::{NetworkError, NetworkResult, PropagationEngine};
