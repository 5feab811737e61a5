use std::time::Instant;

use crate::error::NetworkError;
use crate::network::network::Network;
use crate::optim::learning_rate::{ConstantLearningRate, LearningRate};
use crate::train::report::{TestResults, TrainReport};
use crate::train::train_config::{TestConfig, TrainConfig};

/// Trains `network` on `(input, expected)` pairs pulled from `examples`.
///
/// Every example goes through [`Network::train_on_example`]; after each
/// `config.batch_size` examples the accumulated gradients are applied with
/// the next rate from the configured supplier and the accumulators reset.
/// The run ends when the source is exhausted or `config.max_examples` is
/// reached, whichever comes first, so infinite sources are fine as long as
/// a cap is set.
///
/// A trailing partial batch is left accumulated and reported in
/// [`TrainReport::pending`].
///
/// # Errors
/// `ZeroBatchSize` before any work, or the first shape error raised by an
/// example. Examples before a failing one have already been applied.
pub fn train<S, I, E>(
    network: &mut Network,
    examples: S,
    config: &mut TrainConfig,
) -> Result<TrainReport, NetworkError>
where
    S: IntoIterator<Item = (I, E)>,
    I: AsRef<[f64]>,
    E: AsRef<[f64]>,
{
    if config.batch_size == 0 {
        return Err(NetworkError::ZeroBatchSize);
    }

    let t_start = Instant::now();
    let limit = config.max_examples.unwrap_or(usize::MAX);
    let mut default_rate = ConstantLearningRate::default();

    let mut seen = 0;
    let mut updates = 0;
    let mut pending = 0;
    let mut total_loss = 0.0;
    let mut window_loss = 0.0;

    for (input, expected) in examples.into_iter().take(limit) {
        let loss = network.train_on_example(input.as_ref(), expected.as_ref())?;
        total_loss += loss;
        window_loss += loss;
        seen += 1;
        pending += 1;

        if pending == config.batch_size {
            let rate = match config.learning_rate.as_mut() {
                Some(supplier) => supplier.next_rate(),
                None => default_rate.next_rate(),
            };
            network.update_weights(rate, true);
            updates += 1;
            pending = 0;
            log::debug!("update {} applied at learning rate {}", updates, rate);
        }

        if let Some(every) = config.verbose_count.filter(|&n| n > 0) {
            if seen % every == 0 {
                log::info!(
                    "{} examples, mean squared error {:.6} over the last {}",
                    seen,
                    window_loss / every as f64,
                    every
                );
                window_loss = 0.0;
            }
        }
    }

    let mean_loss = if seen == 0 { 0.0 } else { total_loss / seen as f64 };
    Ok(TrainReport {
        examples: seen,
        updates,
        pending,
        mean_loss,
        elapsed_ms: t_start.elapsed().as_millis() as u64,
    })
}

/// Runs a forward pass on each `(input, expected)` pair and tallies how many
/// outputs `comparator(actual, expected)` accepts.
///
/// Stops at source exhaustion or `config.max_examples`. With zero examples
/// the result has `total == 0` and [`TestResults::rate`] is `None`.
pub fn test<S, I, E, C>(
    network: &mut Network,
    examples: S,
    mut comparator: C,
    config: &TestConfig,
) -> Result<TestResults, NetworkError>
where
    S: IntoIterator<Item = (I, E)>,
    I: AsRef<[f64]>,
    E: AsRef<[f64]>,
    C: FnMut(&[f64], &[f64]) -> bool,
{
    let limit = config.max_examples.unwrap_or(usize::MAX);
    let mut results = TestResults::default();

    for (input, expected) in examples.into_iter().take(limit) {
        let expected = expected.as_ref();
        let output_size = network.output_size();
        if expected.len() != output_size {
            return Err(NetworkError::OutputSize { expected: output_size, found: expected.len() });
        }
        let output = network.forward_pass(input.as_ref())?;
        results.record(comparator(&output, expected));
    }

    log::debug!("tested {} examples, {} correct", results.total, results.correct);
    Ok(results)
}

impl Network {
    /// Method form of [`train`].
    pub fn train<S, I, E>(&mut self, examples: S, config: &mut TrainConfig) -> Result<TrainReport, NetworkError>
    where
        S: IntoIterator<Item = (I, E)>,
        I: AsRef<[f64]>,
        E: AsRef<[f64]>,
    {
        train(self, examples, config)
    }

    /// Method form of [`test`].
    pub fn test<S, I, E, C>(
        &mut self,
        examples: S,
        comparator: C,
        config: &TestConfig,
    ) -> Result<TestResults, NetworkError>
    where
        S: IntoIterator<Item = (I, E)>,
        I: AsRef<[f64]>,
        E: AsRef<[f64]>,
        C: FnMut(&[f64], &[f64]) -> bool,
    {
        test(self, examples, comparator, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use crate::optim::learning_rate::ExponentialDecay;
    use crate::train::compare::{rounded_match, within_tolerance};
    use rand::{rngs::StdRng, SeedableRng};

    fn xor_cases() -> Vec<(Vec<f64>, Vec<f64>)> {
        vec![
            (vec![0.0, 0.0], vec![0.0]),
            (vec![0.0, 1.0], vec![1.0]),
            (vec![1.0, 0.0], vec![1.0]),
            (vec![1.0, 1.0], vec![0.0]),
        ]
    }

    fn net() -> Network {
        Network::with_rng(&[2, 3, 1], &mut StdRng::seed_from_u64(3)).unwrap()
    }

    #[test]
    fn max_examples_caps_an_endless_source() {
        let mut network = net();
        let mut config = TrainConfig::new(4).with_max_examples(10);
        let report = train(&mut network, xor_cases().into_iter().cycle(), &mut config).unwrap();

        assert_eq!(report.examples, 10);
        assert_eq!(report.updates, 2);
        assert_eq!(report.pending, 2);
        let output = &network.layers()[2].neurons()[0];
        assert_eq!(output.bias_examples(), 2);
        assert_eq!(output.weight_examples(), 2);
    }

    #[test]
    fn exhausted_source_ends_the_run() {
        let mut network = net();
        let report = network.train(xor_cases(), &mut TrainConfig::default()).unwrap();
        assert_eq!(report.examples, 4);
        assert_eq!(report.updates, 4);
        assert_eq!(report.pending, 0);
        assert!(report.mean_loss > 0.0);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut network = net();
        let before = network.clone();
        let err = train(&mut network, xor_cases(), &mut TrainConfig::new(0)).unwrap_err();
        assert_eq!(err, NetworkError::ZeroBatchSize);
        assert_eq!(network, before);
    }

    #[test]
    fn learning_rate_supplier_is_queried_per_update() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut config = TrainConfig::new(2)
            .with_max_examples(9)
            .with_learning_rate(move || {
                counter.set(counter.get() + 1);
                0.5
            });
        let report = train(&mut net(), xor_cases().into_iter().cycle(), &mut config).unwrap();
        assert_eq!(report.updates, 4);
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn training_reduces_error() {
        let or_cases = vec![
            (vec![0.0, 0.0], vec![0.0]),
            (vec![0.0, 1.0], vec![1.0]),
            (vec![1.0, 0.0], vec![1.0]),
            (vec![1.0, 1.0], vec![1.0]),
        ];
        let total_error = |network: &mut Network| -> f64 {
            or_cases.iter()
                .map(|(input, expected)| {
                    let output = network.forward_pass(input).unwrap();
                    (output[0] - expected[0]).powi(2)
                })
                .sum()
        };

        let mut network = net();
        let before = total_error(&mut network);
        let mut config = TrainConfig::new(4)
            .with_max_examples(8_000)
            .with_learning_rate(ExponentialDecay::new(2.0, 0.999, 0.5));
        train(&mut network, or_cases.iter().cloned().cycle(), &mut config).unwrap();
        let after = total_error(&mut network);

        assert!(after < before * 0.5, "error went from {} to {}", before, after);
    }

    #[test]
    fn test_tallies_comparator_verdicts() {
        let mut network = Network::from_parameters(&[1, 1], &[vec![vec![1.0]]], &[vec![0.0]]).unwrap();
        network.set_layer_activation(1, crate::activation::ActivationFunction::Identity).unwrap();

        let cases = vec![([1.0], [1.0]), ([2.0], [2.0]), ([3.0], [0.0])];
        let results = test(&mut network, cases.clone(), rounded_match, &TestConfig::default()).unwrap();
        assert_eq!(results, TestResults { correct: 2, incorrect: 1, total: 3 });

        let results = network.test(cases, within_tolerance(0.1), &TestConfig::with_max_examples(1)).unwrap();
        assert_eq!(results.total, 1);
        assert_eq!(results.rate(), Some(1.0));
    }

    #[test]
    fn empty_source_gives_no_rate() {
        let mut network = net();
        let none: Vec<(Vec<f64>, Vec<f64>)> = Vec::new();
        let results = test(&mut network, none, rounded_match, &TestConfig::default()).unwrap();
        assert_eq!(results.total, 0);
        assert_eq!(results.rate(), None);
    }

    #[test]
    fn test_rejects_wrong_expected_width() {
        let mut network = net();
        let err = test(&mut network, vec![([0.0, 0.0], [0.0, 1.0])], rounded_match, &TestConfig::default())
            .unwrap_err();
        assert_eq!(err, NetworkError::OutputSize { expected: 1, found: 2 });
    }
}
