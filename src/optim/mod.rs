pub mod learning_rate;

pub use learning_rate::{ConstantLearningRate, ExponentialDecay, LearningRate};
