use std::mem;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::error::GeneticError;
use crate::genetic::fitness::Fitness;
use crate::genetic::offspring::{AveragingCrossover, MutationConfig, OffspringGenerator};
use crate::network::network::Network;

/// Population settings for a [`GeneticTrainer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    /// Networks per generation; constant across the whole run.
    pub population_size: usize,
    /// Organisms kept as parents after each scoring round.
    pub top_k: usize,
    pub mutation: MutationConfig,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        GeneticConfig {
            population_size: 100,
            top_k: 20,
            mutation: MutationConfig::default(),
        }
    }
}

impl GeneticConfig {
    pub fn validate(&self) -> Result<(), GeneticError> {
        if self.population_size == 0 {
            return Err(GeneticError::EmptyPopulation);
        }
        if self.top_k == 0 || self.top_k > self.population_size {
            return Err(GeneticError::InvalidTopK {
                top_k: self.top_k,
                population: self.population_size,
            });
        }
        let rate = self.mutation.rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(GeneticError::InvalidMutationRate { rate });
        }
        let magnitude = self.mutation.magnitude;
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(GeneticError::InvalidMutationMagnitude { magnitude });
        }
        Ok(())
    }
}

/// Outcome of one generation.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// 1-based index of the generation that produced this result.
    pub generation: usize,
    /// Highest-scoring network of the generation.
    pub best: Network,
    pub best_fitness: f64,
    pub mean_fitness: f64,
}

/// Evolves a fixed-size population of networks.
///
/// Each generation scores every organism, keeps the `top_k` best as
/// parents and replaces the population with offspring of randomly drawn
/// parent pairs. The old population is dropped as a whole once the new one
/// is complete.
pub struct GeneticTrainer<F, G = AveragingCrossover> {
    config: GeneticConfig,
    fitness: F,
    offspring: G,
    population: Vec<Network>,
    generation: usize,
    rng: StdRng,
}

impl<F: Fitness> GeneticTrainer<F> {
    /// A trainer with freshly randomized networks of `topology` and the
    /// default averaging crossover.
    pub fn new(topology: &[usize], config: GeneticConfig, fitness: F) -> Result<Self, GeneticError> {
        GeneticTrainer::with_rng(topology, config, fitness, AveragingCrossover, StdRng::from_entropy())
    }
}

impl<F: Fitness, G: OffspringGenerator> GeneticTrainer<F, G> {
    /// Like [`GeneticTrainer::new`] with a custom offspring generator and a
    /// caller-provided RNG, used both for the initial population and for
    /// parent selection and mutation.
    pub fn with_rng(
        topology: &[usize],
        config: GeneticConfig,
        fitness: F,
        offspring: G,
        mut rng: StdRng,
    ) -> Result<Self, GeneticError> {
        config.validate()?;
        let population = (0..config.population_size)
            .map(|_| Network::with_rng(topology, &mut rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GeneticTrainer {
            config,
            fitness,
            offspring,
            population,
            generation: 0,
            rng,
        })
    }

    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    /// The current, not yet scored, population.
    pub fn population(&self) -> &[Network] {
        &self.population
    }

    /// Generations completed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Scores, selects and repopulates once.
    ///
    /// The old population is kept whole until every child has been built and
    /// is then dropped in a single swap, so a generation holds up to twice
    /// `population_size` networks at its peak. In exchange, an error from
    /// the offspring generator leaves the current population in place.
    pub fn iterate_generation(&mut self) -> Result<GenerationResult, GeneticError> {
        let scores: Vec<f64> = self.population.iter_mut()
            .enumerate()
            .map(|(i, network)| {
                let score = self.fitness.evaluate(network);
                if score.is_nan() {
                    log::warn!("organism {} scored NaN, ranking it last", i);
                    f64::NEG_INFINITY
                } else {
                    score
                }
            })
            .collect();

        // Stable, so ties keep population order.
        let mut ranking: Vec<usize> = (0..scores.len()).collect();
        ranking.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        ranking.truncate(self.config.top_k);

        let parents: Vec<&Network> = ranking.iter().map(|&i| &self.population[i]).collect();
        let mut next = Vec::with_capacity(self.config.population_size);
        while next.len() < self.config.population_size {
            let a = parents[self.rng.gen_range(0..parents.len())];
            let b = parents[self.rng.gen_range(0..parents.len())];
            next.push(self.offspring.generate(a, b, &self.config.mutation, &mut self.rng)?);
        }

        let best_index = ranking[0];
        let best_fitness = scores[best_index];
        let mean_fitness = scores.iter().sum::<f64>() / scores.len() as f64;
        let best = mem::replace(&mut self.population, next).swap_remove(best_index);
        self.generation += 1;

        Ok(GenerationResult {
            generation: self.generation,
            best,
            best_fitness,
            mean_fitness,
        })
    }

    /// Runs `generations` generations and returns the last one's result.
    pub fn train(&mut self, generations: usize) -> Result<GenerationResult, GeneticError> {
        if generations == 0 {
            return Err(GeneticError::NoGenerations);
        }
        let mut last = None;
        for _ in 0..generations {
            let result = self.iterate_generation()?;
            log::info!(
                "generation {}: best fitness {:.6}, mean fitness {:.6}",
                result.generation,
                result.best_fitness,
                result.mean_fitness
            );
            last = Some(result);
        }
        last.ok_or(GeneticError::NoGenerations)
    }
}
