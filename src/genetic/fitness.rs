use crate::network::network::Network;

/// Scores a whole network; higher is better.
///
/// The network is borrowed mutably because evaluating it usually means
/// running forward passes, which refresh its neuron caches.
pub trait Fitness {
    fn evaluate(&mut self, network: &mut Network) -> f64;
}

impl<F> Fitness for F
where
    F: FnMut(&mut Network) -> f64,
{
    fn evaluate(&mut self, network: &mut Network) -> f64 {
        self(network)
    }
}
