pub mod fitness;
pub mod offspring;
pub mod trainer;

pub use fitness::Fitness;
pub use offspring::{AveragingCrossover, MutationConfig, OffspringGenerator};
pub use trainer::{GenerationResult, GeneticConfig, GeneticTrainer};
