use serde::{Serialize, Deserialize};

use crate::optim::learning_rate::LearningRate;

/// Configuration for a `train` run.
///
/// # Fields
/// - `batch_size`: examples folded into the gradient running means before
///   each weight update; use `1` for online SGD
/// - `max_examples`: optional cap on examples drawn from the source; the run
///   also ends when the source runs dry
/// - `verbose_count`: when set, a progress line is logged at `info` level
///   every `verbose_count` examples
/// - `learning_rate`: supplier queried once per weight update; a constant
///   0.1 is used when absent
pub struct TrainConfig {
    pub batch_size: usize,
    pub max_examples: Option<usize>,
    pub verbose_count: Option<usize>,
    pub learning_rate: Option<Box<dyn LearningRate>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` with no example cap, no progress logging and
    /// the default learning rate.
    pub fn new(batch_size: usize) -> Self {
        TrainConfig {
            batch_size,
            max_examples: None,
            verbose_count: None,
            learning_rate: None,
        }
    }

    pub fn with_max_examples(mut self, max_examples: usize) -> Self {
        self.max_examples = Some(max_examples);
        self
    }

    pub fn with_verbose_count(mut self, verbose_count: usize) -> Self {
        self.verbose_count = Some(verbose_count);
        self
    }

    pub fn with_learning_rate<L: LearningRate + 'static>(mut self, learning_rate: L) -> Self {
        self.learning_rate = Some(Box::new(learning_rate));
        self
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig::new(1)
    }
}

/// Configuration for a `test` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConfig {
    /// Optional cap on examples drawn from the source.
    #[serde(default)]
    pub max_examples: Option<usize>,
}

impl TestConfig {
    pub fn with_max_examples(max_examples: usize) -> Self {
        TestConfig { max_examples: Some(max_examples) }
    }
}
