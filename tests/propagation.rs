//! Integration tests for topology construction and forward propagation.

use ndarray::{arr2, array, Array1, Array2};
use proptest::prelude::*;
use rustyffn::nn::{Activation, ActivationKind, NetworkError, PropagationEngine};
use rustyffn::topology::{TopologyDescriptor, TopologyError};
use std::thread;

const TOLERANCE: f64 = 1e-12;

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Deterministic topology for the given layer sizes. Weights and biases are
/// small values derived from their position.
fn patterned_topology(sizes: &[usize]) -> TopologyDescriptor {
    let mut topology = TopologyDescriptor::new();
    for (index, &size) in sizes.iter().enumerate() {
        let biases = Array1::from_shape_fn(size, |n| ((index + n) as f64 * 0.37).sin() * 0.5);
        if index == 0 {
            topology
                .append_layer(biases, ActivationKind::Identity, None)
                .unwrap();
        } else {
            let connections = Array2::from_shape_fn((sizes[index - 1], size), |(h, k)| {
                ((h * 7 + k * 3 + index) as f64 * 0.21).cos()
            });
            topology
                .append_layer(biases, ActivationKind::Logistic, Some(connections))
                .unwrap();
        }
    }
    topology
}

#[test]
fn reference_network_propagates_layer_by_layer() {
    let mut topology = TopologyDescriptor::new();
    topology
        .append_layer(array![0.0, 0.0], ActivationKind::Identity, None)
        .unwrap();
    topology
        .append_layer(
            array![0.0, 0.0, 0.0],
            ActivationKind::Logistic,
            Some(arr2(&[[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]])),
        )
        .unwrap();
    topology
        .append_layer(array![0.0], ActivationKind::Logistic, Some(arr2(&[[1.0], [1.0], [1.0]])))
        .unwrap();

    let mut engine = PropagationEngine::from(topology);
    let output = engine.execute(&[1.0, -1.0]).unwrap().to_vec();

    let hidden = engine.layers()[1].output().to_vec();
    assert_eq!(hidden, vec![0.5, 0.5, 0.5]);
    assert!((output[0] - logistic(1.5)).abs() < TOLERANCE);
    assert!((output[0] - 0.8176).abs() < 1e-4);
}

#[test]
fn hand_computed_network_with_biases() {
    let mut engine = PropagationEngine::new();
    engine
        .append_layer(array![1.0, 0.5], Activation::Identity, None)
        .unwrap();
    engine
        .append_layer(array![0.25, -1.0], Activation::Identity, Some(arr2(&[[2.0, 0.0], [1.0, -3.0]])))
        .unwrap();
    engine
        .append_layer(array![0.0], Activation::logistic_with_slope(2.0), Some(arr2(&[[1.0], [0.5]])))
        .unwrap();

    // input layer: [3 - 1, 1.5 - 0.5] = [2, 1]
    // hidden: [2*2 + 1*1, 0*2 - 3*1] - [0.25, -1] = [4.75, -2]
    // output: 4.75 - 1 = 3.75 -> logistic with slope 2
    let output = engine.execute(&[3.0, 1.5]).unwrap().to_vec();
    assert_eq!(engine.layers()[1].output().to_vec(), vec![4.75, -2.0]);
    assert!((output[0] - logistic(7.5)).abs() < TOLERANCE);
}

#[test]
fn execute_rejects_wrong_input_length() {
    let mut engine = PropagationEngine::from(patterned_topology(&[3, 2]));
    let err = engine.execute(&[0.0; 4]).unwrap_err();
    assert_eq!(err, NetworkError::InputSizeMismatch { expected: 3, actual: 4 });
    assert!(err.to_string().contains("3 neuron"));
}

#[test]
fn forks_run_concurrently_with_identical_results() {
    let engine = PropagationEngine::from(patterned_topology(&[6, 10, 10, 3]));
    let inputs: Vec<Vec<f64>> = (0..4)
        .map(|t| (0..6).map(|i| (t * 6 + i) as f64 / 24.0).collect())
        .collect();

    let mut sequential = engine.fork();
    let expected: Vec<Vec<f64>> = inputs
        .iter()
        .map(|input| sequential.execute(input).unwrap().to_vec())
        .collect();

    let results: Vec<Vec<f64>> = thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| {
                let mut worker = engine.fork();
                scope.spawn(move || worker.execute(input).unwrap().to_vec())
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(results, expected);
}

#[test]
fn dimension_mismatch_example() {
    let mut topology = TopologyDescriptor::new();
    topology
        .append_layer(array![0.0, 0.0], ActivationKind::Identity, None)
        .unwrap();
    let err = topology
        .append_layer(array![0.0, 0.0, 0.0], ActivationKind::Logistic, Some(Array2::zeros((2, 4))))
        .unwrap_err();
    assert_eq!(
        err,
        TopologyError::DimensionMismatch {
            layer: 1,
            expected: (2, 3),
            actual: (2, 4),
        }
    );
}

fn layer_sizes() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..6, 1..5)
}

proptest! {
    #[test]
    fn failed_append_leaves_topology_unchanged(
        sizes in layer_sizes(),
        new_size in 1usize..6,
        rows in 0usize..7,
        cols in 0usize..7,
    ) {
        let mut topology = patterned_topology(&sizes);
        let previous = *sizes.last().unwrap();
        prop_assume!((rows, cols) != (previous, new_size));

        let before = topology.clone();
        let result = topology.append_layer(
            Array1::zeros(new_size),
            ActivationKind::Logistic,
            Some(Array2::zeros((rows, cols))),
        );

        prop_assert_eq!(
            result,
            Err(TopologyError::DimensionMismatch {
                layer: sizes.len(),
                expected: (previous, new_size),
                actual: (rows, cols),
            })
        );
        prop_assert_eq!(&topology, &before);

        prop_assert!(topology.append_layer(Array1::zeros(new_size), ActivationKind::Logistic, None).is_err());
        prop_assert!(topology.append_layer(Array1::zeros(0), ActivationKind::Logistic, None).is_err());
        prop_assert_eq!(&topology, &before);
    }

    #[test]
    fn remove_last_layer_inverts_append(sizes in layer_sizes(), new_size in 1usize..6, bias in -2.0f64..2.0) {
        let mut topology = patterned_topology(&sizes);
        let before = topology.clone();
        let previous = *sizes.last().unwrap();

        topology
            .append_layer(
                Array1::from_elem(new_size, bias),
                ActivationKind::Identity,
                Some(Array2::from_elem((previous, new_size), 0.5)),
            )
            .unwrap();
        prop_assert_eq!(topology.len(), before.len() + 1);

        topology.remove_last_layer();
        prop_assert_eq!(topology, before);
    }

    #[test]
    fn identity_input_layer_subtracts_bias(values in prop::collection::vec((-1.0e6f64..1.0e6, -1.0e6f64..1.0e6), 1..8)) {
        let (input, biases): (Vec<f64>, Vec<f64>) = values.into_iter().unzip();
        let mut engine = PropagationEngine::new();
        engine.append_layer(Array1::from(biases.clone()), Activation::Identity, None).unwrap();

        let output = engine.execute(&input).unwrap().to_vec();
        let expected: Vec<f64> = input.iter().zip(&biases).map(|(x, b)| x - b).collect();
        prop_assert_eq!(output, expected);
    }

    #[test]
    fn logistic_stays_in_open_unit_interval(x in -30.0f64..30.0, slope in 0.01f64..1.0, bias in -5.0f64..5.0) {
        let activation = Activation::logistic_with_slope(slope);
        let y = activation.activate(x);
        prop_assert!(y > 0.0 && y < 1.0);

        let mut engine = PropagationEngine::new();
        engine.append_layer(array![bias], activation, None).unwrap();
        prop_assert_eq!(engine.execute(&[bias]).unwrap()[0], 0.5);
    }

    #[test]
    fn execute_is_bit_deterministic(sizes in layer_sizes(), seed in 0u32..1000) {
        let mut engine = PropagationEngine::from(patterned_topology(&sizes));
        let input: Vec<f64> = (0..sizes[0]).map(|i| ((seed as usize + i) as f64).sqrt()).collect();
        let noise: Vec<f64> = input.iter().map(|x| -x * 3.0).collect();

        let first: Vec<u64> = engine.execute(&input).unwrap().iter().map(|y| y.to_bits()).collect();
        engine.execute(&noise).unwrap();
        let second: Vec<u64> = engine.execute(&input).unwrap().iter().map(|y| y.to_bits()).collect();
        prop_assert_eq!(first, second);
    }
}
