//! Evolutionary loop execution.
//!
//! [`GaEngine`] runs the complete search: initialization → evaluation →
//! elitism → tournament selection → crossover → mutation → repeat, until a
//! termination condition fires.

use std::time::Instant;

use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, trace};

use super::config::GaConfig;
use super::operators::{mutate, random_individual, tournament, uniform_crossover};
use super::types::Individual;
use crate::domain::Problem;
use crate::error::Result;
use crate::random::rng_from_seed;

/// Result of an evolutionary run.
///
/// The engine never fails on infeasibility: if no feasible allocation
/// exists, `best.feasible` is `false` and the caller decides what that
/// means (the orchestrator treats it as fatal).
#[derive(Debug, Clone, PartialEq)]
pub struct GaOutcome {
    /// The best individual found during the entire run.
    pub best: Individual,

    /// Generations executed.
    pub generations: usize,

    /// Fitness evaluations performed (one per individual per evaluation).
    pub evaluations: usize,

    /// Best fitness at the end of each generation, starting with the
    /// initial population.
    pub fitness_history: Vec<f64>,

    /// Whether the run stopped due to the stagnation window.
    pub stagnated: bool,

    /// Whether the run stopped due to the wall-clock limit.
    pub time_limited: bool,
}

/// Executes the evolutionary search.
///
/// # Usage
///
/// ```ignore
/// let problem = Problem::new(resources, constraints, objectives)?;
/// let config = GaConfig::default().with_seed(42);
/// let outcome = GaEngine::evolve(&problem, &config)?;
/// println!("best fitness: {}", outcome.best.fitness);
/// ```
pub struct GaEngine;

impl GaEngine {
    /// Runs the evolutionary search to completion.
    ///
    /// # Errors
    /// [`crate::error::OptimError::InvalidConfiguration`] if the config is
    /// invalid; the problem itself is validated at construction.
    pub fn evolve(problem: &Problem, config: &GaConfig) -> Result<GaOutcome> {
        config.validate()?;

        let mut rng = rng_from_seed(config.seed);
        let started = Instant::now();
        let time_limit = config.time_limit_ms.map(std::time::Duration::from_millis);

        // 1. Initialize and evaluate the population
        let mut population: Vec<Individual> = (0..config.population_size)
            .map(|_| random_individual(problem.resources(), &mut rng))
            .collect();
        let mut evaluations = evaluate_all(problem, &mut population, config.parallel);

        // 2. Track best
        let mut best = find_best(&population).clone();
        let mut fitness_history = Vec::with_capacity(config.max_generations + 1);
        fitness_history.push(best.fitness);

        let elite_count = (config.population_size as f64 * config.elite_ratio) as usize;
        let mut stagnation_counter = 0usize;
        let mut stagnated = false;
        let mut time_limited = false;
        let mut generations = 0usize;

        // 3. Evolutionary loop
        for gen in 0..config.max_generations {
            if let Some(limit) = time_limit {
                if started.elapsed() >= limit {
                    time_limited = true;
                    break;
                }
            }
            if let Some(target) = config.target_fitness {
                if best.fitness >= target {
                    break;
                }
            }

            // Sort descending by fitness (best first) for elitism
            population.sort_by(|a, b| {
                b.fitness
                    .partial_cmp(&a.fitness)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut next_gen: Vec<Individual> = population[..elite_count].to_vec();

            // Reproduction fills the remainder
            while next_gen.len() < config.population_size {
                let offspring = if rng.random_range(0.0..1.0) < config.crossover_rate {
                    let p1 = tournament(&population, config.tournament_size, &mut rng);
                    let p2 = tournament(&population, config.tournament_size, &mut rng);
                    let (c1, c2) = uniform_crossover(&population[p1], &population[p2], &mut rng);
                    vec![c1, c2]
                } else {
                    let winner = tournament(&population, config.tournament_size, &mut rng);
                    vec![population[winner].clone()]
                };

                for mut child in offspring {
                    if next_gen.len() >= config.population_size {
                        break;
                    }
                    if rng.random_range(0.0..1.0) < config.mutation_rate {
                        mutate(&mut child, problem.resources(), &mut rng);
                    }
                    next_gen.push(child);
                }
            }

            // Elites keep their fitness; only the newly bred tail is evaluated
            evaluations += evaluate_all(problem, &mut next_gen[elite_count..], config.parallel);

            debug_assert_eq!(next_gen.len(), config.population_size);
            population = next_gen;
            generations = gen + 1;

            let gen_best = find_best(&population);
            if gen_best.fitness > best.fitness {
                trace!(
                    generation = generations,
                    fitness = gen_best.fitness,
                    feasible = gen_best.feasible,
                    "new best individual"
                );
                best = gen_best.clone();
                stagnation_counter = 0;
            } else {
                stagnation_counter += 1;
            }
            fitness_history.push(best.fitness);

            if config.stagnation_limit > 0 && stagnation_counter >= config.stagnation_limit {
                stagnated = true;
                break;
            }
        }

        debug!(
            generations,
            evaluations,
            best_fitness = best.fitness,
            feasible = best.feasible,
            stagnated,
            time_limited,
            "evolutionary search finished"
        );

        Ok(GaOutcome {
            best,
            generations,
            evaluations,
            fitness_history,
            stagnated,
            time_limited,
        })
    }
}

/// Evaluates every individual in the slice; returns the evaluation count.
fn evaluate_all(problem: &Problem, individuals: &mut [Individual], parallel: bool) -> usize {
    if parallel {
        individuals
            .par_iter_mut()
            .for_each(|ind| ind.evaluate(problem));
    } else {
        for ind in individuals.iter_mut() {
            ind.evaluate(problem);
        }
    }
    individuals.len()
}

/// The individual with the highest fitness.
fn find_best(population: &[Individual]) -> &Individual {
    population
        .iter()
        .max_by(|a, b| {
            a.fitness
                .partial_cmp(&b.fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .expect("population must not be empty")
}

// ============================================================================
// Tests
// ============================================================================
