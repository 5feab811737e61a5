use crate::activation::activation::ActivationFunction;
use crate::error::NetworkError;

/// A single unit: bias, incoming weights, activation, and the per-pass
/// state needed for backpropagation.
///
/// Input-layer neurons have no weights; their output is written directly
/// by the forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    bias: f64,
    weights: Vec<f64>,
    activation: ActivationFunction,

    // forward-pass cache
    input: f64,
    output: f64,

    // backprop scratch
    d_loss_d_activation: f64,
    d_activation_d_input: f64,

    // running means over the current batch
    average_bias_gradient: f64,
    bias_examples: usize,
    average_weight_gradients: Vec<f64>,
    weight_examples: usize,
}

impl Neuron {
    pub fn new(bias: f64, weights: Vec<f64>, activation: ActivationFunction) -> Neuron {
        let average_weight_gradients = vec![0.0; weights.len()];
        Neuron {
            bias,
            weights,
            activation,
            input: 0.0,
            output: 0.0,
            d_loss_d_activation: 0.0,
            d_activation_d_input: 0.0,
            average_bias_gradient: 0.0,
            bias_examples: 0,
            average_weight_gradients,
            weight_examples: 0,
        }
    }

    /// A weightless neuron for the input layer.
    pub fn input() -> Neuron {
        Neuron::new(0.0, Vec::new(), ActivationFunction::default())
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Mutable view of the weights; the count cannot change.
    pub(crate) fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn set_activation(&mut self, activation: ActivationFunction) {
        self.activation = activation;
    }

    /// Weighted input from the last forward pass.
    pub fn input_value(&self) -> f64 {
        self.input
    }

    /// Post-activation output from the last forward pass.
    pub fn output(&self) -> f64 {
        self.output
    }

    pub(crate) fn set_output(&mut self, output: f64) {
        self.output = output;
    }

    pub fn d_loss_d_activation(&self) -> f64 {
        self.d_loss_d_activation
    }

    pub fn d_activation_d_input(&self) -> f64 {
        self.d_activation_d_input
    }

    pub fn average_bias_gradient(&self) -> f64 {
        self.average_bias_gradient
    }

    pub fn average_weight_gradients(&self) -> &[f64] {
        &self.average_weight_gradients
    }

    /// Examples folded into the bias accumulator since the last reset.
    pub fn bias_examples(&self) -> usize {
        self.bias_examples
    }

    /// Examples folded into the weight accumulators since the last reset.
    pub fn weight_examples(&self) -> usize {
        self.weight_examples
    }

    /// z = Σ wₖ·aₖ + b, a = f(z). Returns a.
    pub fn compute_input(&mut self, previous_outputs: &[f64]) -> f64 {
        debug_assert_eq!(previous_outputs.len(), self.weights.len());
        let sum: f64 = self.weights.iter().zip(previous_outputs)
            .map(|(w, a)| w * a)
            .sum();
        self.input = sum + self.bias;
        self.output = self.activation.compute(self.input);
        self.output
    }

    /// Records ∂L/∂a for this neuron, derives ∂a/∂z from the cached input and
    /// folds the resulting bias and weight gradients into the accumulators.
    pub(crate) fn backpropagate(
        &mut self,
        d_loss_d_activation: f64,
        previous_outputs: &[f64],
    ) -> Result<(), NetworkError> {
        self.d_loss_d_activation = d_loss_d_activation;
        self.d_activation_d_input = self.activation.derivative(self.input);

        let d_loss_d_bias = self.d_loss_d_activation * self.d_activation_d_input;
        let d_loss_d_weights: Vec<f64> = previous_outputs.iter()
            .map(|a| d_loss_d_bias * a)
            .collect();

        self.accumulate_gradient(d_loss_d_bias, &d_loss_d_weights)
    }

    /// Folds one example's gradients into the running means.
    ///
    /// Bias and weights keep separate counters. The update is
    /// `avg = (avg * n + new) / (n + 1)`. A gradient slice of the wrong
    /// length is rejected before any accumulator changes.
    pub fn accumulate_gradient(
        &mut self,
        bias_gradient: f64,
        weight_gradients: &[f64],
    ) -> Result<(), NetworkError> {
        let expected = self.average_weight_gradients.len();
        if weight_gradients.len() != expected {
            return Err(NetworkError::ParameterCount { expected, found: weight_gradients.len() });
        }

        self.average_bias_gradient *= self.bias_examples as f64;
        self.bias_examples += 1;
        self.average_bias_gradient += bias_gradient;
        self.average_bias_gradient /= self.bias_examples as f64;

        let n = self.weight_examples as f64;
        for (avg, g) in self.average_weight_gradients.iter_mut().zip(weight_gradients) {
            *avg *= n;
            *avg += g;
        }
        self.weight_examples += 1;
        let n = self.weight_examples as f64;
        for avg in &mut self.average_weight_gradients {
            *avg /= n;
        }
        Ok(())
    }

    /// One gradient-descent step with the averaged gradients.
    pub fn apply_update(&mut self, learning_rate: f64, reset: bool) {
        self.bias -= learning_rate * self.average_bias_gradient;
        for (w, g) in self.weights.iter_mut().zip(&self.average_weight_gradients) {
            *w -= learning_rate * g;
        }
        if reset {
            self.reset_gradients();
        }
    }

    pub fn reset_gradients(&mut self) {
        self.average_bias_gradient = 0.0;
        self.bias_examples = 0;
        self.average_weight_gradients.iter_mut().for_each(|g| *g = 0.0);
        self.weight_examples = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn compute_input_caches_both_values() {
        let mut n = Neuron::new(1.0, vec![0.5, -1.0], ActivationFunction::Identity);
        let out = n.compute_input(&[2.0, 3.0]);
        assert_eq!(n.input_value(), -1.0);
        assert_eq!(out, -1.0);
        assert_eq!(n.output(), -1.0);
    }

    #[test]
    fn running_mean_matches_plain_mean() {
        let mut n = Neuron::new(0.0, vec![0.0, 0.0], ActivationFunction::Sigmoid);
        n.accumulate_gradient(1.0, &[2.0, -2.0]).unwrap();
        n.accumulate_gradient(2.0, &[4.0, 0.0]).unwrap();
        n.accumulate_gradient(6.0, &[0.0, 5.0]).unwrap();

        assert_eq!(n.bias_examples(), 3);
        assert_eq!(n.weight_examples(), 3);
        assert_abs_diff_eq!(n.average_bias_gradient(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(n.average_weight_gradients()[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(n.average_weight_gradients()[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn wrong_gradient_width_leaves_accumulators_alone() {
        let mut n = Neuron::new(0.0, vec![0.0, 0.0], ActivationFunction::Sigmoid);
        n.accumulate_gradient(1.0, &[2.0, 4.0]).unwrap();

        assert_eq!(
            n.accumulate_gradient(3.0, &[8.0]),
            Err(NetworkError::ParameterCount { expected: 2, found: 1 })
        );
        assert_eq!(
            n.accumulate_gradient(3.0, &[8.0, 8.0, 8.0]),
            Err(NetworkError::ParameterCount { expected: 2, found: 3 })
        );
        assert_eq!(n.bias_examples(), 1);
        assert_eq!(n.weight_examples(), 1);
        assert_eq!(n.average_bias_gradient(), 1.0);
        assert_eq!(n.average_weight_gradients(), &[2.0, 4.0]);
    }

    #[test]
    fn apply_update_steps_against_the_gradient() {
        let mut n = Neuron::new(1.0, vec![1.0, 1.0], ActivationFunction::Sigmoid);
        n.accumulate_gradient(0.5, &[1.0, -1.0]).unwrap();

        n.apply_update(0.1, false);
        assert_abs_diff_eq!(n.bias(), 0.95, epsilon = 1e-12);
        assert_abs_diff_eq!(n.weights()[0], 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(n.weights()[1], 1.1, epsilon = 1e-12);
        assert_eq!(n.bias_examples(), 1);

        n.apply_update(0.1, true);
        assert_abs_diff_eq!(n.bias(), 0.9, epsilon = 1e-12);
        assert_eq!(n.bias_examples(), 0);
        assert_eq!(n.weight_examples(), 0);
        assert_eq!(n.average_bias_gradient(), 0.0);
        assert!(n.average_weight_gradients().iter().all(|g| *g == 0.0));
    }

    #[test]
    fn input_neuron_update_is_a_no_op() {
        let mut n = Neuron::input();
        n.apply_update(10.0, true);
        assert_eq!(n.bias(), 0.0);
        assert!(n.weights().is_empty());
    }
}
