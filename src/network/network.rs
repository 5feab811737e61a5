use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NetworkError, PersistError};
use crate::layers::{dense::Layer, neuron::Neuron};
use crate::loss::squared_error::SquaredErrorLoss;
use crate::network::spec::{LayerSpec, NetworkSpec, NeuronSpec};

/// Range of the uniform distribution fresh weights are drawn from.
const INIT_WEIGHT_RANGE: f64 = 0.05;

/// A feedforward network of sigmoid-by-default neurons.
///
/// Layer 0 is the input layer and carries no weights; every neuron of layer
/// `i > 0` has one weight per neuron of layer `i - 1`. Constructors enforce
/// this, and nothing afterwards can change a layer's size or a neuron's
/// weight count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkSpec", into = "NetworkSpec")]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Builds a network with random weights in [-0.05, 0.05] and zero biases.
    pub fn new(topology: &[usize]) -> Result<Network, NetworkError> {
        Network::with_rng(topology, &mut rand::thread_rng())
    }

    /// Like [`Network::new`], drawing weights from `rng`.
    pub fn with_rng<R>(topology: &[usize], rng: &mut R) -> Result<Network, NetworkError>
    where
        R: Rng + ?Sized,
    {
        validate_topology(topology)?;
        let layers = topology.windows(2)
            .map(|pair| {
                let (fan_in, size) = (pair[0], pair[1]);
                let neurons = (0..size)
                    .map(|_| {
                        let weights = (0..fan_in)
                            .map(|_| rng.gen_range(-INIT_WEIGHT_RANGE..=INIT_WEIGHT_RANGE))
                            .collect();
                        Neuron::new(0.0, weights, ActivationFunction::default())
                    })
                    .collect();
                Layer::new(neurons)
            });
        Ok(Network {
            layers: std::iter::once(Layer::input(topology[0])).chain(layers).collect(),
        })
    }

    /// Builds a network from explicit parameters.
    ///
    /// `weights[i][j]` and `biases[i][j]` belong to neuron `j` of layer
    /// `i + 1`; the input layer has no entry.
    pub fn from_parameters(
        topology: &[usize],
        weights: &[Vec<Vec<f64>>],
        biases: &[Vec<f64>],
    ) -> Result<Network, NetworkError> {
        validate_topology(topology)?;
        let computing_layers = topology.len() - 1;
        for found in [weights.len(), biases.len()] {
            if found != computing_layers {
                return Err(NetworkError::LayerCount { expected: computing_layers, found });
            }
        }

        let mut layers = Vec::with_capacity(computing_layers);
        for (i, ((&size, layer_weights), layer_biases)) in
            topology[1..].iter().zip(weights).zip(biases).enumerate()
        {
            for found in [layer_weights.len(), layer_biases.len()] {
                if found != size {
                    return Err(NetworkError::NeuronCount { layer: i + 1, expected: size, found });
                }
            }
            let neurons = layer_weights.iter().zip(layer_biases)
                .map(|(w, &bias)| NeuronSpec {
                    bias,
                    weights: w.clone(),
                    activation: ActivationFunction::default(),
                })
                .collect();
            layers.push(LayerSpec { neurons });
        }

        Network::from_spec(NetworkSpec { input_size: topology[0], layers })
    }

    /// Builds a network from a stored description, checking every shape.
    pub fn from_spec(spec: NetworkSpec) -> Result<Network, NetworkError> {
        validate_topology(&spec.topology())?;

        let mut fan_in = spec.input_size;
        let mut layers = Vec::with_capacity(spec.layers.len() + 1);
        layers.push(Layer::input(spec.input_size));

        for (i, layer) in spec.layers.into_iter().enumerate() {
            let size = layer.neurons.len();
            let neurons = layer.neurons.into_iter().enumerate()
                .map(|(j, n)| {
                    if n.weights.len() != fan_in {
                        return Err(NetworkError::WeightCount {
                            layer: i + 1,
                            neuron: j,
                            expected: fan_in,
                            found: n.weights.len(),
                        });
                    }
                    Ok(Neuron::new(n.bias, n.weights, n.activation))
                })
                .collect::<Result<Vec<_>, _>>()?;
            layers.push(Layer::new(neurons));
            fan_in = size;
        }

        Ok(Network { layers })
    }

    /// Parameters of every non-input layer, without training state.
    pub fn to_spec(&self) -> NetworkSpec {
        NetworkSpec {
            input_size: self.input_size(),
            layers: self.layers[1..].iter()
                .map(|layer| LayerSpec {
                    neurons: layer.neurons().iter()
                        .map(|n| NeuronSpec {
                            bias: n.bias(),
                            weights: n.weights().to_vec(),
                            activation: n.activation(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Serializes the network's parameters to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    /// Shapes are checked exactly as in [`Network::from_spec`].
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Network, PersistError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Neuron count of every layer, input layer first.
    pub fn topology(&self) -> Vec<usize> {
        self.layers.iter().map(Layer::size).collect()
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].size()
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].size()
    }

    /// Total number of trainable values: every weight and bias after the
    /// input layer.
    pub fn parameter_count(&self) -> usize {
        self.layers[1..].iter()
            .flat_map(Layer::neurons)
            .map(|n| n.weights().len() + 1)
            .sum()
    }

    /// Every weight and bias as one flat vector, layer by layer and neuron
    /// by neuron, each neuron's weights followed by its bias.
    pub fn parameters(&self) -> Vec<f64> {
        let mut params = Vec::with_capacity(self.parameter_count());
        for neuron in self.layers[1..].iter().flat_map(Layer::neurons) {
            params.extend_from_slice(neuron.weights());
            params.push(neuron.bias());
        }
        params
    }

    /// Overwrites every weight and bias from a vector laid out like
    /// [`Network::parameters`].
    pub fn set_parameters(&mut self, params: &[f64]) -> Result<(), NetworkError> {
        let expected = self.parameter_count();
        if params.len() != expected {
            return Err(NetworkError::ParameterCount { expected, found: params.len() });
        }
        let mut rest = params;
        for neuron in self.layers[1..].iter_mut().flat_map(|l| l.neurons_mut().iter_mut()) {
            let (weights, tail) = rest.split_at(neuron.weights().len());
            neuron.weights_mut().copy_from_slice(weights);
            neuron.set_bias(tail[0]);
            rest = &tail[1..];
        }
        Ok(())
    }

    /// Overrides the activation of one neuron.
    pub fn set_activation(
        &mut self,
        layer: usize,
        neuron: usize,
        activation: ActivationFunction,
    ) -> Result<(), NetworkError> {
        let target = self.computing_layer_mut(layer)?
            .neurons_mut()
            .get_mut(neuron)
            .ok_or(NetworkError::NeuronOutOfRange { layer, neuron })?;
        target.set_activation(activation);
        Ok(())
    }

    /// Overrides the activation of every neuron in a layer.
    pub fn set_layer_activation(
        &mut self,
        layer: usize,
        activation: ActivationFunction,
    ) -> Result<(), NetworkError> {
        self.computing_layer_mut(layer)?.set_activation(activation);
        Ok(())
    }

    fn computing_layer_mut(&mut self, layer: usize) -> Result<&mut Layer, NetworkError> {
        if layer == 0 {
            return Err(NetworkError::InputLayerParameters);
        }
        self.layers.get_mut(layer).ok_or(NetworkError::LayerOutOfRange { layer })
    }

    /// Forward pass; caches each neuron's input and output for backprop.
    pub fn forward_pass(&mut self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        let expected = self.input_size();
        if input.len() != expected {
            return Err(NetworkError::InputSize { expected, found: input.len() });
        }

        self.layers[0].load_input(input);
        let mut current = input.to_vec();
        for layer in &mut self.layers[1..] {
            current = layer.feed_from(&current);
        }
        Ok(current)
    }

    /// Runs a forward pass, then backpropagates the squared-error gradient
    /// and folds it into every neuron's running-mean accumulators.
    ///
    /// Weights and biases are left untouched; call [`Network::update_weights`]
    /// to apply the accumulated step. Returns the example's squared error.
    pub fn train_on_example(&mut self, input: &[f64], expected: &[f64]) -> Result<f64, NetworkError> {
        let output_size = self.output_size();
        if expected.len() != output_size {
            return Err(NetworkError::OutputSize { expected: output_size, found: expected.len() });
        }
        let output = self.forward_pass(input)?;

        let last = self.layers.len() - 1;
        let d_loss_d_output = SquaredErrorLoss::derivative(&output, expected);
        let previous = self.layers[last - 1].outputs();
        for (neuron, d) in self.layers[last].neurons_mut().iter_mut().zip(d_loss_d_output) {
            neuron.backpropagate(d, &previous)?;
        }

        // Hidden layers, walking back towards layer 1.
        for l in (1..last).rev() {
            let (lower, upper) = self.layers.split_at_mut(l + 1);
            let next = &upper[0];
            let previous = lower[l - 1].outputs();
            for (k, neuron) in lower[l].neurons_mut().iter_mut().enumerate() {
                let d_loss_d_activation: f64 = next.neurons().iter()
                    .map(|n| n.weights()[k] * n.d_activation_d_input() * n.d_loss_d_activation())
                    .sum();
                neuron.backpropagate(d_loss_d_activation, &previous)?;
            }
        }

        Ok(SquaredErrorLoss::loss(&output, expected))
    }

    /// Applies one gradient-descent step to every neuron using the averaged
    /// gradients; with `reset`, clears the accumulators afterwards.
    pub fn update_weights(&mut self, learning_rate: f64, reset: bool) {
        for layer in &mut self.layers {
            layer.apply_update(learning_rate, reset);
        }
    }

    /// Discards accumulated gradients without touching the parameters.
    pub fn reset_gradients(&mut self) {
        for layer in &mut self.layers {
            layer.reset_gradients();
        }
    }
}

impl TryFrom<NetworkSpec> for Network {
    type Error = NetworkError;

    fn try_from(spec: NetworkSpec) -> Result<Self, Self::Error> {
        Network::from_spec(spec)
    }
}

impl From<Network> for NetworkSpec {
    fn from(network: Network) -> Self {
        network.to_spec()
    }
}

fn validate_topology(topology: &[usize]) -> Result<(), NetworkError> {
    if topology.len() < 2 {
        return Err(NetworkError::TooFewLayers { layers: topology.len() });
    }
    match topology.iter().position(|&size| size == 0) {
        Some(layer) => Err(NetworkError::EmptyLayer { layer }),
        None => Ok(()),
    }
}
