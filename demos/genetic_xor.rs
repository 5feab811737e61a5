use crank_nn::{GeneticConfig, GeneticTrainer, MutationConfig, Network};

const CASES: [([f64; 2], f64); 4] = [
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([0.0, 0.0], 0.0),
];

/// Negative total squared error over the XOR table.
fn xor_fitness(network: &mut Network) -> f64 {
    -CASES.iter()
        .map(|(input, expected)| match network.forward_pass(input) {
            Ok(output) => (output[0] - expected).powi(2),
            Err(_) => f64::INFINITY,
        })
        .sum::<f64>()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GeneticConfig {
        population_size: 100,
        top_k: 20,
        mutation: MutationConfig { rate: 0.2, magnitude: 0.5 },
    };
    let mut trainer = GeneticTrainer::new(&[2, 3, 1], config, xor_fitness)?;
    let mut result = trainer.train(300)?;

    println!("generation {}: best fitness {:.6}", result.generation, result.best_fitness);
    for (input, _) in &CASES {
        println!("Input: {:?} -> Output: {:.4}", input, result.best.forward_pass(input)?[0]);
    }
    Ok(())
}
