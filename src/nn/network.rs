//! The propagation engine: executes forward passes through a validated topology.

use crate::nn::activations::Activation;
use crate::nn::layer::Layer;
use crate::topology::{check_layer, TopologyDescriptor, TopologyError, TopologyResult};
use ndarray::{Array1, Array2, ArrayView1};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

pub type NetworkResult<T> = std::result::Result<T, NetworkError>;

/// Errors raised by [`PropagationEngine`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Input vector has {actual} element(s) but the input layer has {expected} neuron(s).")]
    InputSizeMismatch { expected: usize, actual: usize },

    #[error("The network has no layers. Append an input layer before executing it.")]
    EmptyNetwork,
}

/// Fully-connected feedforward network with live per-layer state.
///
/// Layer `0` is the input layer; `connections[k - 1]` feeds layer `k`. Every call
/// to [`execute`](Self::execute) overwrites the output buffer of every layer and
/// keeps no other history.
///
/// An engine is not meant to be shared between threads while executing. Use
/// [`fork`](Self::fork) to get one engine per worker: forks share biases and
/// connection matrices but own their buffers.
///
/// ```
/// use ndarray::array;
/// use rustyffn::nn::{Activation, PropagationEngine};
///
/// let mut engine = PropagationEngine::new();
/// engine.append_layer(array![0.0, 0.0], Activation::Identity, None)?;
/// engine.append_layer(array![0.0], Activation::logistic(), Some(array![[1.0], [1.0]]))?;
///
/// let output = engine.execute(&[1.0, -1.0])?;
/// assert_eq!(output[0], 0.5);
/// # Ok::<(), rustyffn::nn::NetworkError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropagationEngine {
    layers: Vec<Layer>,
    connections: Vec<Arc<Array2<f64>>>,
}

impl PropagationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an engine from a copy of `topology`, leaving it usable afterwards.
    ///
    /// Use `PropagationEngine::from(topology)` to hand the descriptor over
    /// without copying.
    pub fn from_descriptor(topology: &TopologyDescriptor) -> Self {
        Self::from(topology.clone())
    }

    /// Appends a layer, validated exactly like
    /// [`TopologyDescriptor::append_layer`].
    pub fn append_layer(
        &mut self,
        biases: Array1<f64>,
        activation: Activation,
        connections: Option<Array2<f64>>,
    ) -> TopologyResult<()> {
        let position = self.layers.len();
        let previous_size = self.layers.last().map(Layer::size);
        check_layer(position, previous_size, biases.len(), connections.as_ref())?;

        self.layers.push(Layer::new(Arc::new(biases), activation));
        if previous_size.is_some() {
            if let Some(connections) = connections {
                self.connections.push(Arc::new(connections));
            }
        }
        debug!(layer = position, size = self.layers[position].size(), "Appended layer to engine");
        Ok(())
    }

    /// Drops the output layer and the matrix feeding it. No-op when empty.
    pub fn remove_last_layer(&mut self) {
        if self.layers.pop().is_some() {
            self.connections.truncate(self.layers.len().saturating_sub(1));
        }
    }

    /// Runs one forward pass and returns the output layer's activations.
    ///
    /// The input layer activates `input[n] - bias[n]`; every following layer
    /// activates the weighted sum of its predecessor's output minus its own
    /// bias. Layers are evaluated strictly in index order.
    ///
    /// # Errors
    ///
    /// [`NetworkError::EmptyNetwork`] if no layer was appended and
    /// [`NetworkError::InputSizeMismatch`] if `input` does not match the input
    /// layer. No buffer is touched on error.
    pub fn execute<'a>(&mut self, input: impl Into<ArrayView1<'a, f64>>) -> NetworkResult<ArrayView1<'_, f64>> {
        let input = input.into();
        let input_layer = self.layers.first_mut().ok_or(NetworkError::EmptyNetwork)?;
        if input.len() != input_layer.size() {
            return Err(NetworkError::InputSizeMismatch {
                expected: input_layer.size(),
                actual: input.len(),
            });
        }

        input_layer.propagate(input);
        for k in 1..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(k);
            rest[0].propagate_weighted(done[k - 1].output(), &self.connections[k - 1]);
        }
        trace!(layers = self.layers.len(), "Executed forward pass");

        self.output().ok_or(NetworkError::EmptyNetwork)
    }

    /// Output of the most recent [`execute`](Self::execute), if any layer exists.
    pub fn output(&self) -> Option<ArrayView1<'_, f64>> {
        self.layers.last().map(Layer::output)
    }

    /// An engine over the same parameters with its own output buffers.
    pub fn fork(&self) -> Self {
        Self {
            layers: self.layers.iter().map(Layer::fork).collect(),
            connections: self.connections.clone(),
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Connection matrices; entry `k - 1` feeds layer `k`.
    pub fn connections(&self) -> impl Iterator<Item = &Array2<f64>> + '_ {
        self.connections.iter().map(|matrix| matrix.as_ref())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn input_size(&self) -> Option<usize> {
        self.layers.first().map(Layer::size)
    }

    pub fn output_size(&self) -> Option<usize> {
        self.layers.last().map(Layer::size)
    }
}

impl From<TopologyDescriptor> for PropagationEngine {
    /// Takes ownership of the descriptor's biases and matrices.
    fn from(topology: TopologyDescriptor) -> Self {
        let (layers, connections) = topology.into_parts();
        let layers: Vec<Layer> = layers
            .into_iter()
            .map(|layer| {
                let (biases, kind) = layer.into_parts();
                Layer::new(Arc::new(biases), kind.into())
            })
            .collect();

        debug!(
            sizes = ?layers.iter().map(Layer::size).collect::<Vec<_>>(),
            "Built propagation engine from topology"
        );

        Self {
            layers,
            connections: connections.into_iter().map(Arc::new).collect(),
        }
    }
}
