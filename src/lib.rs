pub mod activation;
pub mod error;
pub mod genetic;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use activation::activation::ActivationFunction;
pub use error::{GeneticError, NetworkError, ParseError, ParseErrorKind, PersistError};
pub use genetic::{AveragingCrossover, Fitness, GenerationResult, GeneticConfig, GeneticTrainer, MutationConfig, OffspringGenerator};
pub use layers::{dense::Layer, neuron::Neuron};
pub use network::{network::Network, spec::NetworkSpec};
pub use optim::learning_rate::{ConstantLearningRate, ExponentialDecay, LearningRate};
pub use train::{TestConfig, TestResults, TrainConfig, TrainReport};
