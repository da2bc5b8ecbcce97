//! Generation state machine and genetic operators.

use rand::Rng;

use crate::{genotype::Genotype, params};

/// Where the algorithm currently is in its generation cycle.
///
/// `Idle → Evaluating` on [`GeneticAlgorithm::take_population`];
/// `Evaluating → Evaluated → Selecting → Recombining → Mutating → Idle`
/// inside [`GeneticAlgorithm::complete_generation`]. There is no terminal
/// state; the loop runs until externally stopped. On a fatal operator error
/// the state is left at the failing stage so the last-known population and
/// generation count stay inspectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmState {
    Idle,
    Evaluating,
    Evaluated,
    Selecting,
    Recombining,
    Mutating,
}

/// Selection operator choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::FromStr)]
pub enum Selection {
    /// Pass the sorted population through unchanged; no stochastic step.
    #[default]
    Elitist,
    /// Remainder stochastic sampling: each genotype is copied into the
    /// intermediate pool `floor(fitness)` times, then once more with
    /// probability equal to the fractional remainder of its fitness.
    RemainderStochastic,
}

/// Mutation operator choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mutation {
    /// Mutate every genotype except the two protected elites.
    #[default]
    AllButBestTwo,
    /// Mutate every genotype including the elites.
    All,
}

/// How per-generation fitness is derived from the raw evaluation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitnessScaling {
    /// `fitness = evaluation / mean(evaluation)`, so an above-average
    /// genotype has fitness above 1 and remainder stochastic sampling gets a
    /// meaningful integer part. Falls back to raw scores when the mean is 0.
    #[default]
    MeanNormalized,
    /// `fitness = evaluation`.
    Raw,
}

/// Operator choices and numeric knobs, fixed at construction for a whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionParams {
    pub selection: Selection,
    pub mutation: Mutation,
    pub fitness_scaling: FitnessScaling,
    /// Per-position probability that crossover swaps the parents' values.
    pub crossover_swap_probability: f32,
    /// Per-genotype probability that a mutation pass is applied at all.
    pub mutation_probability: f32,
    /// Per-gene perturbation probability within a mutation pass.
    pub gene_mutation_probability: f32,
    /// Perturbations are drawn uniformly from `[-mutation_amount, mutation_amount]`.
    pub mutation_amount: f32,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            mutation: Mutation::default(),
            fitness_scaling: FitnessScaling::default(),
            crossover_swap_probability: 0.6,
            mutation_probability: 1.0,
            gene_mutation_probability: 0.3,
            mutation_amount: 2.0,
        }
    }
}

/// Per-generation report emitted after fitness calculation, before the
/// operators run. Consumed externally for logging and checkpointing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSummary {
    /// Generation number that was just evaluated (0-based).
    pub generation: u32,
    pub best_evaluation: f32,
    pub average_evaluation: f32,
}

/// Fatal conditions that halt generation progress.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EvolutionError {
    #[display("operation not allowed in state {state:?}")]
    InvalidState { state: AlgorithmState },
    #[display("scored population has {actual} genotypes, expected {expected}")]
    PopulationSizeMismatch { expected: usize, actual: usize },
    #[display(
        "intermediate population has {len} genotypes, need at least 2 for recombination"
    )]
    DegenerateIntermediatePopulation { len: usize },
    #[display("seed genotype has {actual} parameters, run requires {expected}")]
    SeedParameterCountMismatch { expected: usize, actual: usize },
}

/// The generational genetic algorithm.
///
/// Owns the population between generations. Evaluation is external and
/// asynchronous: the population is moved out with [`take_population`], scored
/// by the simulation over many ticks, and moved back with
/// [`complete_generation`], which runs the operator pipeline synchronously.
///
/// [`take_population`]: Self::take_population
/// [`complete_generation`]: Self::complete_generation
#[derive(Debug)]
pub struct GeneticAlgorithm {
    params: EvolutionParams,
    parameter_count: usize,
    population_size: usize,
    population: Vec<Genotype>,
    generation: u32,
    state: AlgorithmState,
    best_evaluation: f32,
}

impl GeneticAlgorithm {
    /// Creates an algorithm with a randomly initialized population, each
    /// parameter drawn uniformly from `[-1, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `population_size < 2` (recombination protects two elites).
    pub fn new<R>(
        parameter_count: usize,
        population_size: usize,
        params: EvolutionParams,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(population_size >= 2, "population must hold the two elites");
        let population = (0..population_size)
            .map(|_| Genotype::new(params::random(rng, parameter_count)))
            .collect();
        Self {
            params,
            parameter_count,
            population_size,
            population,
            generation: 0,
            state: AlgorithmState::Idle,
            best_evaluation: 0.0,
        }
    }

    /// Creates an algorithm seeded from a previously saved genotype: the seed
    /// itself enters the population once, unmodified, followed by
    /// `population_size - 1` copies. Mutation diversifies them from the
    /// second generation on.
    pub fn from_seed(
        parameter_count: usize,
        population_size: usize,
        params: EvolutionParams,
        seed: &Genotype,
    ) -> Result<Self, EvolutionError> {
        assert!(population_size >= 2, "population must hold the two elites");
        if seed.parameter_count() != parameter_count {
            return Err(EvolutionError::SeedParameterCountMismatch {
                expected: parameter_count,
                actual: seed.parameter_count(),
            });
        }
        let population = (0..population_size).map(|_| seed.copy()).collect();
        Ok(Self {
            params,
            parameter_count,
            population_size,
            population,
            generation: 0,
            state: AlgorithmState::Idle,
            best_evaluation: 0.0,
        })
    }

    #[must_use]
    pub fn state(&self) -> AlgorithmState {
        self.state
    }

    /// The age of the current generation (0 before the first cycle finishes).
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    #[must_use]
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// The current population. Empty while a generation is being evaluated.
    #[must_use]
    pub fn population(&self) -> &[Genotype] {
        &self.population
    }

    /// Best evaluation score seen across the entire run.
    #[must_use]
    pub fn best_evaluation(&self) -> f32 {
        self.best_evaluation
    }

    /// Moves the population out for evaluation, entering the `Evaluating`
    /// state. The evaluator must score every genotype and hand the population
    /// back via [`complete_generation`](Self::complete_generation).
    pub fn take_population(&mut self) -> Result<Vec<Genotype>, EvolutionError> {
        if self.state != AlgorithmState::Idle {
            return Err(EvolutionError::InvalidState { state: self.state });
        }
        self.state = AlgorithmState::Evaluating;
        Ok(std::mem::take(&mut self.population))
    }

    /// The "all agents died" signal: accepts the scored population, derives
    /// fitness, sorts descending (stable on ties), then runs
    /// Selection → Recombination → Mutation in that fixed order, replaces the
    /// population, and increments the generation counter.
    ///
    /// Returns the pre-operator summary of the evaluated generation.
    pub fn complete_generation<R>(
        &mut self,
        mut scored: Vec<Genotype>,
        rng: &mut R,
    ) -> Result<GenerationSummary, EvolutionError>
    where
        R: Rng + ?Sized,
    {
        if self.state != AlgorithmState::Evaluating {
            return Err(EvolutionError::InvalidState { state: self.state });
        }
        if scored.len() != self.population_size {
            return Err(EvolutionError::PopulationSizeMismatch {
                expected: self.population_size,
                actual: scored.len(),
            });
        }
        self.state = AlgorithmState::Evaluated;

        self.apply_fitness_scaling(&mut scored);
        // stable sort keeps elite selection deterministic on fitness ties
        scored.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));

        let summary = GenerationSummary {
            generation: self.generation,
            best_evaluation: scored.first().map_or(0.0, Genotype::evaluation),
            average_evaluation: mean_evaluation(&scored),
        };
        self.best_evaluation = self.best_evaluation.max(summary.best_evaluation);

        self.state = AlgorithmState::Selecting;
        let intermediate = self.select(&scored, rng);

        self.state = AlgorithmState::Recombining;
        let mut next = self.recombine(&scored, &intermediate, rng)?;

        self.state = AlgorithmState::Mutating;
        self.mutate_population(&mut next, rng);

        self.population = next;
        self.generation += 1;
        self.state = AlgorithmState::Idle;
        Ok(summary)
    }

    fn apply_fitness_scaling(&self, population: &mut [Genotype]) {
        let mean = mean_evaluation(population);
        for genotype in population {
            let fitness = match self.params.fitness_scaling {
                FitnessScaling::MeanNormalized if mean > 0.0 => genotype.evaluation() / mean,
                FitnessScaling::MeanNormalized | FitnessScaling::Raw => genotype.evaluation(),
            };
            genotype.set_fitness(fitness);
        }
    }

    /// Builds the intermediate population the recombination operator draws
    /// parents from. Assumes `sorted` is sorted descending by fitness.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn select<R>(&self, sorted: &[Genotype], rng: &mut R) -> Vec<Genotype>
    where
        R: Rng + ?Sized,
    {
        match self.params.selection {
            Selection::Elitist => sorted.iter().map(Genotype::copy).collect(),
            Selection::RemainderStochastic => {
                let mut pool = Vec::new();
                // integer portion; the population is sorted, so stop at the
                // first genotype below fitness 1
                for genotype in sorted {
                    if genotype.fitness() < 1.0 {
                        break;
                    }
                    for _ in 0..genotype.fitness() as usize {
                        pool.push(genotype.copy());
                    }
                }
                // fractional remainder portion, independent draws over all
                for genotype in sorted {
                    let remainder = genotype.fitness() - genotype.fitness().floor();
                    if rng.random_bool(f64::from(remainder)) {
                        pool.push(genotype.copy());
                    }
                }
                pool
            }
        }
    }

    /// Fills the next population: the top two of the sorted source are
    /// carried over unmodified, the rest come from crossover of random
    /// distinct parents out of the intermediate pool.
    fn recombine<R>(
        &self,
        sorted: &[Genotype],
        intermediate: &[Genotype],
        rng: &mut R,
    ) -> Result<Vec<Genotype>, EvolutionError>
    where
        R: Rng + ?Sized,
    {
        if intermediate.len() < 2 {
            return Err(EvolutionError::DegenerateIntermediatePopulation {
                len: intermediate.len(),
            });
        }

        let mut next = Vec::with_capacity(self.population_size);
        next.push(sorted[0].copy());
        next.push(sorted[1].copy());

        while next.len() < self.population_size {
            let index1 = rng.random_range(0..intermediate.len());
            let index2 = loop {
                let index = rng.random_range(0..intermediate.len());
                if index != index1 {
                    break index;
                }
            };

            let (child1, child2) = params::complete_crossover(
                intermediate[index1].parameters(),
                intermediate[index2].parameters(),
                self.params.crossover_swap_probability,
                rng,
            );
            next.push(Genotype::new(child1));
            if next.len() < self.population_size {
                next.push(Genotype::new(child2));
            }
        }
        Ok(next)
    }

    fn mutate_population<R>(&self, population: &mut [Genotype], rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let protected = match self.params.mutation {
            Mutation::AllButBestTwo => 2,
            Mutation::All => 0,
        };
        for genotype in &mut population[protected..] {
            if rng.random_bool(f64::from(self.params.mutation_probability)) {
                params::mutate(
                    genotype.parameters_mut(),
                    self.params.gene_mutation_probability,
                    self.params.mutation_amount,
                    rng,
                );
            }
        }
    }
}

fn mean_evaluation(population: &[Genotype]) -> f32 {
    if population.is_empty() {
        return 0.0;
    }
    #[expect(clippy::cast_precision_loss)]
    let n = population.len() as f32;
    population.iter().map(Genotype::evaluation).sum::<f32>() / n
}
