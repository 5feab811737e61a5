use crate::activation::activation::ActivationFunction;
use crate::layers::neuron::Neuron;

/// One fully-connected layer: every neuron sees every output of the
/// previous layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    neurons: Vec<Neuron>,
}

impl Layer {
    pub fn new(neurons: Vec<Neuron>) -> Layer {
        Layer { neurons }
    }

    /// An input layer of `size` weightless neurons.
    pub fn input(size: usize) -> Layer {
        Layer { neurons: (0..size).map(|_| Neuron::input()).collect() }
    }

    pub fn size(&self) -> usize {
        self.neurons.len()
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Mutable view of the neurons; the count cannot change.
    pub(crate) fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    pub fn outputs(&self) -> Vec<f64> {
        self.neurons.iter().map(Neuron::output).collect()
    }

    /// Stores raw input values as this layer's outputs, no activation.
    pub(crate) fn load_input(&mut self, input: &[f64]) {
        for (neuron, &value) in self.neurons.iter_mut().zip(input) {
            neuron.set_output(value);
        }
    }

    /// Runs every neuron on the previous layer's outputs and returns this
    /// layer's outputs.
    pub fn feed_from(&mut self, previous_outputs: &[f64]) -> Vec<f64> {
        self.neurons.iter_mut()
            .map(|neuron| neuron.compute_input(previous_outputs))
            .collect()
    }

    pub fn set_activation(&mut self, activation: ActivationFunction) {
        for neuron in &mut self.neurons {
            neuron.set_activation(activation);
        }
    }

    pub fn apply_update(&mut self, learning_rate: f64, reset: bool) {
        for neuron in &mut self.neurons {
            neuron.apply_update(learning_rate, reset);
        }
    }

    pub fn reset_gradients(&mut self) {
        for neuron in &mut self.neurons {
            neuron.reset_gradients();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_from_collects_outputs() {
        let mut layer = Layer::new(vec![
            Neuron::new(0.0, vec![1.0, 1.0], ActivationFunction::Identity),
            Neuron::new(1.0, vec![2.0, 0.0], ActivationFunction::Identity),
        ]);
        assert_eq!(layer.feed_from(&[3.0, 4.0]), vec![7.0, 7.0]);
        assert_eq!(layer.outputs(), vec![7.0, 7.0]);
    }

    #[test]
    fn input_layer_holds_raw_values() {
        let mut layer = Layer::input(3);
        layer.load_input(&[-5.0, 0.0, 5.0]);
        assert_eq!(layer.outputs(), vec![-5.0, 0.0, 5.0]);
    }
}
