//! Generational genetic algorithm for evolving track-navigation controllers.
//!
//! This crate owns the offline half of the training loop: the genotype data
//! model, the parameter-vector operators (crossover, mutation), and the
//! generation state machine that turns one scored population into the next.
//!
//! # How a generation works
//!
//! 1. **Hand out** - [`GeneticAlgorithm::take_population`] moves the current
//!    population to the evaluator (the real-time simulation in `dronevo-sim`)
//! 2. **Evaluate** - the evaluator runs until every agent has died and writes
//!    each genotype's evaluation score
//! 3. **Hand back** - [`GeneticAlgorithm::complete_generation`] recomputes
//!    fitness, sorts the population, and runs
//!    Selection → Recombination → Mutation to produce the next generation
//!
//! The algorithm never blocks on evaluation: between `take_population` and
//! `complete_generation` it simply sits in the `Evaluating` state, and at most
//! one generation is in flight at any time.
//!
//! # Operators
//!
//! Operators are strategy enums fixed at construction:
//!
//! - [`Selection`] - `Elitist` (pass-through of the sorted population) or
//!   `RemainderStochastic` (floor-count copies plus fractional-remainder draws)
//! - Recombination - random distinct parent pairs with complete crossover,
//!   always carrying the top two sorted genotypes over unmodified
//! - [`Mutation`] - uniform per-gene perturbation, skipping the two protected
//!   elites (or mutating everyone with `All`)

pub mod algorithm;
pub mod genotype;
pub mod params;

pub use self::{
    algorithm::{
        AlgorithmState, EvolutionError, EvolutionParams, FitnessScaling, GenerationSummary,
        GeneticAlgorithm, Mutation, Selection,
    },
    genotype::Genotype,
};
