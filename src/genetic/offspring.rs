use rand::{Rng, RngCore};
use serde::{Serialize, Deserialize};

use crate::error::NetworkError;
use crate::network::network::Network;

/// How offspring parameters are perturbed after crossover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Probability in [0, 1] that any single weight or bias is perturbed.
    pub rate: f64,
    /// Perturbations are drawn uniformly from `[-magnitude, magnitude]`.
    pub magnitude: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        MutationConfig { rate: 0.2, magnitude: 0.2 }
    }
}

/// Produces one child from two parents of the same topology.
pub trait OffspringGenerator {
    fn generate(
        &mut self,
        parent1: &Network,
        parent2: &Network,
        mutation: &MutationConfig,
        rng: &mut dyn RngCore,
    ) -> Result<Network, NetworkError>;
}

impl<F> OffspringGenerator for F
where
    F: FnMut(&Network, &Network, &MutationConfig, &mut dyn RngCore) -> Result<Network, NetworkError>,
{
    fn generate(
        &mut self,
        parent1: &Network,
        parent2: &Network,
        mutation: &MutationConfig,
        rng: &mut dyn RngCore,
    ) -> Result<Network, NetworkError> {
        self(parent1, parent2, mutation, rng)
    }
}

/// Child parameters are the mean of the parents' parameters, each then
/// perturbed with probability `mutation.rate`. The child keeps parent 1's
/// activations.
#[derive(Debug, Clone, Copy, Default)]
pub struct AveragingCrossover;

impl OffspringGenerator for AveragingCrossover {
    fn generate(
        &mut self,
        parent1: &Network,
        parent2: &Network,
        mutation: &MutationConfig,
        rng: &mut dyn RngCore,
    ) -> Result<Network, NetworkError> {
        let (left, right) = (parent1.topology(), parent2.topology());
        if left != right {
            return Err(NetworkError::TopologyMismatch { left, right });
        }

        let mut child = parent1.clone();
        child.reset_gradients();

        let genome: Vec<f64> = parent1.parameters().iter()
            .zip(parent2.parameters())
            .map(|(a, b)| {
                let mut gene = (a + b) / 2.0;
                if mutation.magnitude > 0.0 && rng.gen::<f64>() < mutation.rate {
                    gene += rng.gen_range(-mutation.magnitude..=mutation.magnitude);
                }
                gene
            })
            .collect();
        child.set_parameters(&genome)?;
        Ok(child)
    }
}
