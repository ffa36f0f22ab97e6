//! JSON topology documents.
//!
//! ```json
//! {
//!   "layers": [
//!     { "biases": [0.0, 0.0], "activation": "identity" },
//!     { "biases": [0.0], "activation": "logistic" }
//!   ],
//!   "connections": [ [[1.0], [1.0]] ]
//! }
//! ```

use super::{InterchangeError, InterchangeResult};
use crate::topology::{LayerSpec, TopologyDescriptor, TopologyError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Serde view of a topology. Connection matrices are stored row by row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyDocument {
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub connections: Vec<Vec<Vec<f64>>>,
}

impl From<&TopologyDescriptor> for TopologyDocument {
    fn from(topology: &TopologyDescriptor) -> Self {
        Self {
            layers: topology.layers().iter().map(LayerSpec::from).collect(),
            connections: topology
                .connections()
                .iter()
                .map(|matrix| matrix.outer_iter().map(|row| row.to_vec()).collect())
                .collect(),
        }
    }
}

impl TryFrom<TopologyDocument> for TopologyDescriptor {
    type Error = TopologyError;

    fn try_from(document: TopologyDocument) -> Result<Self, Self::Error> {
        TopologyDescriptor::from_rows(document.layers, document.connections)
    }
}

/// Fails on the first infinite or NaN parameter. serde_json would write it as
/// `null`, which does not load back.
fn check_finite(topology: &TopologyDescriptor) -> InterchangeResult<()> {
    for (index, layer) in topology.layers().iter().enumerate() {
        if let Some((neuron, &value)) = layer.biases().iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(InterchangeError::NonFiniteValue {
                location: format!("layer {index}, neuron {neuron}"),
                value,
            });
        }
    }
    for (index, matrix) in topology.connections().iter().enumerate() {
        if let Some(((node, weight), &value)) = matrix.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(InterchangeError::NonFiniteValue {
                location: format!("connection {index}, node {node}, weight {weight}"),
                value,
            });
        }
    }
    Ok(())
}

/// Serializes a topology as pretty-printed JSON.
///
/// Infinite and NaN parameters are rejected with
/// [`InterchangeError::NonFiniteValue`]; the XML format stores them.
pub fn to_json_string(topology: &TopologyDescriptor) -> InterchangeResult<String> {
    check_finite(topology)?;
    Ok(serde_json::to_string_pretty(&TopologyDocument::from(topology))?)
}

pub fn from_json_str(json: &str) -> InterchangeResult<TopologyDescriptor> {
    let document: TopologyDocument = serde_json::from_str(json)?;
    Ok(TopologyDescriptor::try_from(document)?)
}

pub fn read_json<P: AsRef<Path>>(path: P) -> InterchangeResult<TopologyDescriptor> {
    from_json_str(&fs::read_to_string(path)?)
}

pub fn write_json<P: AsRef<Path>>(path: P, topology: &TopologyDescriptor) -> InterchangeResult<()> {
    fs::write(path, to_json_string(topology)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::ActivationKind;
    use crate::serialization::{from_xml_str, to_xml_string};
    use ndarray::{arr2, array};

    #[test]
    fn test_round_trip() {
        let mut topology = TopologyDescriptor::new();
        topology
            .append_layer(array![0.125, -3.0], ActivationKind::Identity, None)
            .unwrap();
        topology
            .append_layer(array![0.1], ActivationKind::Logistic, Some(arr2(&[[0.7], [-1.0 / 7.0]])))
            .unwrap();

        let json = to_json_string(&topology).unwrap();
        assert!(json.contains("\"identity\""));
        assert_eq!(from_json_str(&json).unwrap(), topology);
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let mut topology = TopologyDescriptor::new();
        topology
            .append_layer(array![0.0], ActivationKind::Identity, None)
            .unwrap();
        topology
            .append_layer(array![0.0], ActivationKind::Logistic, Some(arr2(&[[f64::INFINITY]])))
            .unwrap();

        match to_json_string(&topology) {
            Err(InterchangeError::NonFiniteValue { location, value }) => {
                assert_eq!(location, "connection 0, node 0, weight 0");
                assert_eq!(value, f64::INFINITY);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let mut nan_bias = TopologyDescriptor::new();
        nan_bias
            .append_layer(array![0.5, f64::NAN], ActivationKind::Identity, None)
            .unwrap();
        let err = to_json_string(&nan_bias).unwrap_err();
        assert!(err.to_string().contains("layer 0, neuron 1"));

        // XML keeps them.
        let parsed = from_xml_str(&to_xml_string(&topology).unwrap()).unwrap();
        assert_eq!(parsed, topology);
    }

    #[test]
    fn test_missing_fields_are_null_arguments() {
        let json = r#"{ "layers": [ { "biases": [1.0] } ] }"#;
        let err = from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            InterchangeError::Topology(TopologyError::NullArgument("activation"))
        ));

        let json = r#"{ "layers": [ { "biases": null, "activation": "identity" } ] }"#;
        let err = from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            InterchangeError::Topology(TopologyError::NullArgument("biases"))
        ));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(from_json_str("{ not json"), Err(InterchangeError::Json(_))));
        assert!(matches!(
            from_json_str(r#"{ "layers": [ { "biases": [1.0], "activation": "tanh" } ] }"#),
            Err(InterchangeError::Json(_))
        ));
    }

    #[test]
    fn test_ragged_rows() {
        let json = r#"{
            "layers": [
                { "biases": [0.0, 0.0], "activation": "identity" },
                { "biases": [0.0, 0.0], "activation": "logistic" }
            ],
            "connections": [ [[1.0, 2.0], [3.0]] ]
        }"#;
        let err = from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            InterchangeError::Topology(TopologyError::RaggedMatrix { connection: 0, node: 1, expected: 2, actual: 1 })
        ));
    }
}
