use crank_nn::train::rounded_match;
use crank_nn::{ConstantLearningRate, Network, TestConfig, TrainConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cases = vec![
        (vec![1.0, 0.0], vec![1.0]),
        (vec![1.0, 1.0], vec![0.0]),
        (vec![0.0, 1.0], vec![1.0]),
        (vec![0.0, 0.0], vec![0.0]),
    ];

    let mut network = Network::new(&[2, 3, 1])?;
    let mut config = TrainConfig::new(4)
        .with_max_examples(400_000)
        .with_verbose_count(40_000)
        .with_learning_rate(ConstantLearningRate::new(2.0));

    let report = network.train(cases.iter().cloned().cycle(), &mut config)?;
    println!(
        "trained on {} examples ({} updates) in {} ms",
        report.examples, report.updates, report.elapsed_ms
    );

    let results = network.test(cases.iter().cloned(), rounded_match, &TestConfig::default())?;
    println!("{}", results);

    let path = std::env::temp_dir().join("crank_nn_xor.txt");
    network.save(&path)?;
    let mut restored = Network::load(&path)?;
    std::fs::remove_file(&path)?;
    for (input, _) in &cases {
        println!(
            "Input: {:?} -> Output: {:.4} (reloaded: {:.4})",
            input,
            network.forward_pass(input)?[0],
            restored.forward_pass(input)?[0]
        );
    }
    Ok(())
}
