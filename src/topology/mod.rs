//! Topology descriptors: the validated shape of a feedforward network.
//!
//! A [`TopologyDescriptor`] holds the ordered layers of a network (index 0 is the
//! input layer) and one connection matrix per non-input layer. It performs no
//! numeric work; it only guarantees that every matrix links its two adjacent
//! layers:
//!
//! ```text
//! layers:       [L0] ---- [L1] ---- [L2]
//! connections:       C0        C1          C[i] has shape (size(L[i]), size(L[i+1]))
//! ```
//!
//! ## Example
//!
//! ```
//! use ndarray::{array, Array2};
//! use rustyffn::nn::ActivationKind;
//! use rustyffn::topology::TopologyDescriptor;
//!
//! let mut topology = TopologyDescriptor::new();
//! topology.append_layer(array![0.0, 0.0], ActivationKind::Identity, None)?;
//! topology.append_layer(array![0.0], ActivationKind::Logistic, Some(Array2::ones((2, 1))))?;
//! assert_eq!(topology.layer_sizes(), vec![2, 1]);
//! # Ok::<(), rustyffn::topology::TopologyError>(())
//! ```

use crate::nn::activations::ActivationKind;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub type TopologyResult<T> = std::result::Result<T, TopologyError>;

/// Structural errors raised while building a topology.
///
/// Every operation that returns one of these leaves the topology untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Required argument '{0}' is missing. Every layer needs a bias vector and an activation.")]
    NullArgument(&'static str),

    #[error("Layer {0} is empty: its bias vector has no elements.")]
    EmptyLayer(usize),

    #[error("Layer {0} has no connection matrix. Every layer after the input layer must be connected to its predecessor.")]
    MissingConnections(usize),

    #[error("Connection matrix of layer {layer} does not match the topology: \
             expected (previous, current) = {expected:?}, got (rows, cols) = {actual:?}.")]
    DimensionMismatch {
        layer: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Connection {connection} is not a rectangular matrix: \
             node {node} has {actual} weights while node 0 has {expected}.")]
    RaggedMatrix {
        connection: usize,
        node: usize,
        expected: usize,
        actual: usize,
    },

    #[error("A network with {layers} layer(s) needs one connection matrix per layer after the input layer, \
             but {connections} were given.")]
    CountMismatch { layers: usize, connections: usize },
}

/// Immutable description of one layer: its biases and activation kind.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    biases: Array1<f64>,
    activation: ActivationKind,
}

impl LayerDescriptor {
    pub fn biases(&self) -> &Array1<f64> {
        &self.biases
    }

    pub fn activation(&self) -> ActivationKind {
        self.activation
    }

    /// Number of neurons in the layer.
    pub fn size(&self) -> usize {
        self.biases.len()
    }

    pub fn into_parts(self) -> (Array1<f64>, ActivationKind) {
        (self.biases, self.activation)
    }
}

/// A layer as it arrives from an untrusted source, with every field optional.
///
/// Missing fields are reported as [`TopologyError::NullArgument`] when the
/// layer is appended to a topology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    #[serde(default)]
    pub biases: Option<Vec<f64>>,
    #[serde(default)]
    pub activation: Option<ActivationKind>,
}

impl LayerSpec {
    pub fn new(biases: Vec<f64>, activation: ActivationKind) -> Self {
        Self {
            biases: Some(biases),
            activation: Some(activation),
        }
    }
}

impl From<&LayerDescriptor> for LayerSpec {
    fn from(layer: &LayerDescriptor) -> Self {
        LayerSpec::new(layer.biases.to_vec(), layer.activation)
    }
}

/// Checks that a layer of `size` neurons can follow a layer of `previous_size`
/// neurons through `connections`.
///
/// `position` is the index the new layer would take. `previous_size` is `None`
/// for the input layer, whose connections are ignored.
pub(crate) fn check_layer(
    position: usize,
    previous_size: Option<usize>,
    size: usize,
    connections: Option<&Array2<f64>>,
) -> TopologyResult<()> {
    if size == 0 {
        return Err(TopologyError::EmptyLayer(position));
    }

    let Some(previous_size) = previous_size else {
        return Ok(());
    };

    let connections = connections.ok_or(TopologyError::MissingConnections(position))?;
    let expected = (previous_size, size);
    let actual = connections.dim();
    if actual != expected {
        return Err(TopologyError::DimensionMismatch {
            layer: position,
            expected,
            actual,
        });
    }

    Ok(())
}

/// Builds a dense matrix from a list of rows ("nodes").
///
/// `connection` is the index of the block in its document and is only used
/// for error reporting. An empty row list yields a `0 x 0` matrix.
pub fn matrix_from_rows(connection: usize, rows: &[Vec<f64>]) -> TopologyResult<Array2<f64>> {
    let cols = rows.first().map_or(0, Vec::len);

    if let Some((node, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != cols) {
        return Err(TopologyError::RaggedMatrix {
            connection,
            node,
            expected: cols,
            actual: row.len(),
        });
    }

    Ok(Array2::from_shape_fn((rows.len(), cols), |(r, c)| rows[r][c]))
}

/// Ordered, validated description of a feedforward network.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologyDescriptor {
    layers: Vec<LayerDescriptor>,
    /// `connections[i]` links `layers[i]` to `layers[i + 1]`.
    connections: Vec<Array2<f64>>,
}

impl TopologyDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer to the output end of the topology.
    ///
    /// # Arguments
    ///
    /// * `biases` - One bias per neuron. Must not be empty.
    /// * `activation` - Activation applied after bias subtraction.
    /// * `connections` - Matrix of shape `(previous layer size, biases.len())`.
    ///   Ignored (and may be `None`) for the first layer, which becomes the
    ///   input layer.
    ///
    /// # Errors
    ///
    /// [`TopologyError::EmptyLayer`], [`TopologyError::MissingConnections`] or
    /// [`TopologyError::DimensionMismatch`]. The topology is unchanged on error.
    pub fn append_layer(
        &mut self,
        biases: Array1<f64>,
        activation: ActivationKind,
        connections: Option<Array2<f64>>,
    ) -> TopologyResult<()> {
        let position = self.layers.len();
        let previous_size = self.layers.last().map(LayerDescriptor::size);
        check_layer(position, previous_size, biases.len(), connections.as_ref())?;

        debug!(
            layer = position,
            size = biases.len(),
            activation = %activation,
            "Appending layer to topology"
        );

        self.layers.push(LayerDescriptor { biases, activation });
        if previous_size.is_some() {
            if let Some(connections) = connections {
                self.connections.push(connections);
            }
        }
        Ok(())
    }

    /// Appends a possibly incomplete layer.
    ///
    /// Fails with [`TopologyError::NullArgument`] when the bias vector or the
    /// activation is absent, and otherwise behaves like
    /// [`append_layer`](Self::append_layer).
    pub fn append_spec(
        &mut self,
        spec: LayerSpec,
        connections: Option<Array2<f64>>,
    ) -> TopologyResult<()> {
        let biases = spec.biases.ok_or(TopologyError::NullArgument("biases"))?;
        let activation = spec.activation.ok_or(TopologyError::NullArgument("activation"))?;
        self.append_layer(Array1::from(biases), activation, connections)
    }

    /// Drops the output layer and the matrix feeding it. No-op when empty.
    pub fn remove_last_layer(&mut self) {
        if let Some(removed) = self.layers.pop() {
            self.connections.truncate(self.layers.len().saturating_sub(1));
            debug!(layer = self.layers.len(), size = removed.size(), "Removed layer from topology");
        }
    }

    /// Builds a topology from raw layer specs and row lists.
    ///
    /// Checks run in a fixed order: every connection block must be rectangular,
    /// then there must be exactly one block per non-input layer, then each
    /// layer is appended with the usual validation.
    pub fn from_rows(layers: Vec<LayerSpec>, connections: Vec<Vec<Vec<f64>>>) -> TopologyResult<Self> {
        let matrices = connections
            .iter()
            .enumerate()
            .map(|(index, rows)| matrix_from_rows(index, rows))
            .collect::<TopologyResult<Vec<_>>>()?;

        if layers.len() != matrices.len() + 1 {
            return Err(TopologyError::CountMismatch {
                layers: layers.len(),
                connections: matrices.len(),
            });
        }

        let mut topology = Self::new();
        let mut matrices = matrices.into_iter();
        for (index, spec) in layers.into_iter().enumerate() {
            let connections = if index == 0 { None } else { matrices.next() };
            topology.append_spec(spec, connections)?;
        }
        Ok(topology)
    }

    /// Layers in topological order, input first.
    pub fn layers(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    /// Connection matrices; entry `i` feeds layer `i + 1`.
    pub fn connections(&self) -> &[Array2<f64>] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        self.layers.iter().map(LayerDescriptor::size).collect()
    }

    pub fn input_size(&self) -> Option<usize> {
        self.layers.first().map(LayerDescriptor::size)
    }

    pub fn output_size(&self) -> Option<usize> {
        self.layers.last().map(LayerDescriptor::size)
    }

    /// Splits the topology into its layers and connection matrices.
    pub fn into_parts(self) -> (Vec<LayerDescriptor>, Vec<Array2<f64>>) {
        (self.layers, self.connections)
    }
}
