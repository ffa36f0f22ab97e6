//! Engine-side layer: parameters plus the buffers a forward pass writes into.

use crate::nn::activations::Activation;
use ndarray::linalg::general_mat_vec_mul;
use ndarray::{Array1, Array2, ArrayView1, Zip};
use std::sync::Arc;

/// A group of neurons sharing one activation, equidistant from the input.
///
/// Biases are shared read-only between [forks](crate::nn::PropagationEngine::fork)
/// of the same engine. The output and scratch buffers are private to this layer
/// and overwritten on every propagation.
#[derive(Debug, Clone)]
pub struct Layer {
    biases: Arc<Array1<f64>>,
    activation: Activation,
    /// Weighted sum of the previous layer's output, before bias and activation.
    pre_activation: Array1<f64>,
    output: Array1<f64>,
}

impl Layer {
    pub(crate) fn new(biases: Arc<Array1<f64>>, activation: Activation) -> Self {
        let size = biases.len();
        Self {
            biases,
            activation,
            pre_activation: Array1::zeros(size),
            output: Array1::zeros(size),
        }
    }

    /// Number of neurons.
    pub fn size(&self) -> usize {
        self.biases.len()
    }

    pub fn biases(&self) -> ArrayView1<'_, f64> {
        self.biases.view()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Output of the most recent propagation (zeros before the first one).
    pub fn output(&self) -> ArrayView1<'_, f64> {
        self.output.view()
    }

    /// A layer with the same parameters and fresh buffers.
    pub(crate) fn fork(&self) -> Self {
        Self::new(Arc::clone(&self.biases), self.activation)
    }

    /// Activates every neuron on `input[n] - bias[n]`. Used by the input layer.
    ///
    /// `input` must have exactly [`size`](Self::size) elements.
    pub(crate) fn propagate(&mut self, input: ArrayView1<'_, f64>) {
        let activation = self.activation;
        Zip::from(&mut self.output)
            .and(&input)
            .and(&*self.biases)
            .for_each(|out, &x, &bias| *out = activation.activate(x - bias));
    }

    /// Propagates the previous layer's output through `connection`.
    ///
    /// `pre_activation[k] = Σ_h connection[h][k] * previous[h]`, then every
    /// neuron is activated on `pre_activation[k] - bias[k]`. The shapes were
    /// validated when the layer was appended.
    pub(crate) fn propagate_weighted(&mut self, previous: ArrayView1<'_, f64>, connection: &Array2<f64>) {
        general_mat_vec_mul(1.0, &connection.t(), &previous, 0.0, &mut self.pre_activation);

        let activation = self.activation;
        Zip::from(&mut self.output)
            .and(&self.pre_activation)
            .and(&*self.biases)
            .for_each(|out, &x, &bias| *out = activation.activate(x - bias));
    }
}
