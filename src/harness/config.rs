//! Harness configuration.

use super::{HarnessError, HarnessResult};
use crate::nn::ActivationKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters of a benchmark run.
///
/// Fields missing from a JSON file keep their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Neuron count of every layer, input first.
    pub layer_sizes: Vec<usize>,
    /// Number of timed `execute` calls.
    pub executions: usize,
    /// Seed for biases, weights and inputs. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Log every input/output pair.
    pub print_vectors: bool,
    pub input_activation: ActivationKind,
    /// Activation of every layer after the input layer.
    pub hidden_activation: ActivationKind,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            layer_sizes: vec![8, 32, 32, 4],
            executions: 10_000,
            seed: None,
            print_vectors: false,
            input_activation: ActivationKind::Identity,
            hidden_activation: ActivationKind::Logistic,
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> HarnessResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn with_layer_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.layer_sizes = sizes;
        self
    }

    pub fn with_executions(mut self, executions: usize) -> Self {
        self.executions = executions;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_print_vectors(mut self, print_vectors: bool) -> Self {
        self.print_vectors = print_vectors;
        self
    }

    pub fn with_activations(mut self, input: ActivationKind, hidden: ActivationKind) -> Self {
        self.input_activation = input;
        self.hidden_activation = hidden;
        self
    }

    /// Rejects configurations that cannot produce a measurement.
    pub fn validate(&self) -> HarnessResult<()> {
        if self.layer_sizes.is_empty() {
            return Err(HarnessError::InvalidConfig("at least one layer size is required".to_string()));
        }
        if let Some(index) = self.layer_sizes.iter().position(|&size| size == 0) {
            return Err(HarnessError::InvalidConfig(format!("layer {index} has zero neurons")));
        }
        if self.executions == 0 {
            return Err(HarnessError::InvalidConfig("executions must be greater than zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = HarnessConfig::new()
            .with_layer_sizes(vec![3, 5])
            .with_executions(12)
            .with_seed(7)
            .with_print_vectors(true)
            .with_activations(ActivationKind::Logistic, ActivationKind::Identity);

        assert_eq!(config.layer_sizes, vec![3, 5]);
        assert_eq!(config.executions, 12);
        assert_eq!(config.seed, Some(7));
        assert!(config.print_vectors);
        assert_eq!(config.input_activation, ActivationKind::Logistic);
        assert_eq!(config.hidden_activation, ActivationKind::Identity);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let no_layers = HarnessConfig::new().with_layer_sizes(vec![]);
        assert!(matches!(no_layers.validate(), Err(HarnessError::InvalidConfig(_))));

        let zero_layer = HarnessConfig::new().with_layer_sizes(vec![2, 0, 1]);
        match zero_layer.validate() {
            Err(HarnessError::InvalidConfig(message)) => assert!(message.contains("layer 1")),
            other => panic!("unexpected result: {other:?}"),
        }

        let no_runs = HarnessConfig::new().with_executions(0);
        assert!(matches!(no_runs.validate(), Err(HarnessError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: HarnessConfig =
            serde_json::from_str(r#"{ "layer_sizes": [2, 2], "hidden_activation": "identity" }"#).unwrap();

        assert_eq!(config.layer_sizes, vec![2, 2]);
        assert_eq!(config.hidden_activation, ActivationKind::Identity);
        assert_eq!(config.executions, HarnessConfig::default().executions);
        assert_eq!(config.seed, None);
    }
}
