use serde::{Serialize, Deserialize};
use crate::activation::activation::ActivationFunction;

/// Stored parameters of one non-input neuron.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronSpec {
    pub bias: f64,
    pub weights: Vec<f64>,
    /// Omitted from JSON when it is the default sigmoid.
    #[serde(default, skip_serializing_if = "ActivationFunction::is_default")]
    pub activation: ActivationFunction,
}

/// Stored parameters of one non-input layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub neurons: Vec<NeuronSpec>,
}

/// A plain, fully serializable description of a network's structure and
/// parameters, without any training state.
///
/// The input layer carries no parameters, so it is described by its size
/// alone; `layers` holds every layer after it, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub input_size: usize,
    pub layers: Vec<LayerSpec>,
}

impl NetworkSpec {
    /// Neuron count of every layer, input layer first.
    pub fn topology(&self) -> Vec<usize> {
        std::iter::once(self.input_size)
            .chain(self.layers.iter().map(|l| l.neurons.len()))
            .collect()
    }
}
