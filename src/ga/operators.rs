//! Genetic operators over real-valued allocation chromosomes.
//!
//! All operators keep genes inside their resource bounds: initialization
//! samples uniformly within `[min, max]`, and mutation clamps perturbed
//! genes back into bounds. A degenerate resource (`min == max`) yields a
//! fixed gene no operator can move.

use rand::Rng;

use super::types::Individual;
use crate::domain::Resource;

/// Per-gene probability of perturbation once an individual is selected for
/// mutation.
pub const GENE_MUTATION_CHANCE: f64 = 0.1;

/// Maximum perturbation magnitude as a fraction of the resource range.
pub const MUTATION_SPAN: f64 = 0.1;

/// Samples a random individual with each gene uniform within its resource
/// bounds. Fitness is left unevaluated.
pub fn random_individual<R: Rng>(resources: &[Resource], rng: &mut R) -> Individual {
    let genes = resources
        .iter()
        .map(|r| {
            if r.range() > 0.0 {
                rng.random_range(r.min..r.max)
            } else {
                r.min
            }
        })
        .collect();
    Individual::from_genes(genes)
}

/// Tournament selection with replacement: sample `k` competitors uniformly,
/// return the index of the highest-fitness one.
///
/// # Panics
/// Panics if `population` is empty.
pub fn tournament<R: Rng>(population: &[Individual], k: usize, rng: &mut R) -> usize {
    assert!(!population.is_empty(), "cannot select from empty population");
    let k = k.max(1);
    let n = population.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if population[idx].fitness > population[best_idx].fitness {
            best_idx = idx;
        }
    }
    best_idx
}

/// Uniform crossover: each gene is taken from either parent with 50%
/// probability, producing two complementary offspring.
pub fn uniform_crossover<R: Rng>(
    parent1: &Individual,
    parent2: &Individual,
    rng: &mut R,
) -> (Individual, Individual) {
    debug_assert_eq!(parent1.genes.len(), parent2.genes.len());
    let n = parent1.genes.len();
    let mut c1 = Vec::with_capacity(n);
    let mut c2 = Vec::with_capacity(n);
    for i in 0..n {
        if rng.random_bool(0.5) {
            c1.push(parent1.genes[i]);
            c2.push(parent2.genes[i]);
        } else {
            c1.push(parent2.genes[i]);
            c2.push(parent1.genes[i]);
        }
    }
    (Individual::from_genes(c1), Individual::from_genes(c2))
}

/// Perturbs each gene with probability [`GENE_MUTATION_CHANCE`] by up to
/// ±[`MUTATION_SPAN`] of the resource range, then clamps into bounds.
pub fn mutate<R: Rng>(individual: &mut Individual, resources: &[Resource], rng: &mut R) {
    for (gene, resource) in individual.genes.iter_mut().zip(resources) {
        let span = MUTATION_SPAN * resource.range();
        if span > 0.0 && rng.random_range(0.0..1.0) < GENE_MUTATION_CHANCE {
            *gene = resource.clamp(*gene + rng.random_range(-span..span));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn resources(bounds: &[(f64, f64)]) -> Vec<Resource> {
        bounds
            .iter()
            .enumerate()
            .map(|(i, &(min, max))| Resource {
                name: format!("r{i}"),
                min,
                max,
                cost: 1.0,
                emissions_factor: 1.0,
                efficiency: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_random_individual_within_bounds() {
        let rs = resources(&[(0.0, 10.0), (-5.0, 5.0), (3.0, 3.0)]);
        let mut rng = create_rng(42);
        for _ in 0..100 {
            let ind = random_individual(&rs, &mut rng);
            for (gene, r) in ind.genes.iter().zip(&rs) {
                assert!(*gene >= r.min && *gene <= r.max);
            }
            // Degenerate resource pinned to its fixed value
            assert_eq!(ind.genes[2], 3.0);
        }
    }

    #[test]
    fn test_tournament_favors_best() {
        let mut population: Vec<Individual> = (0..4)
            .map(|i| {
                let mut ind = Individual::from_genes(vec![0.0]);
                ind.fitness = i as f64;
                ind
            })
            .collect();
        population[2].fitness = 100.0;
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        let n = 10_000;
        for _ in 0..n {
            counts[tournament(&population, 3, &mut rng)] += 1;
        }
        // With k=3 drawn with replacement from 4, the best wins whenever it
        // is sampled at least once: 1 - (3/4)^3 ~ 57.8%.
        assert!(
            counts[2] > 5_000,
            "expected best selected in a majority of tournaments, got {}/{n}",
            counts[2]
        );
        for (i, count) in counts.iter().enumerate() {
            if i != 2 {
                assert!(
                    counts[2] > *count,
                    "index {i} selected {count} times, beating the best's {}",
                    counts[2]
                );
            }
        }
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_tournament_empty_population_panics() {
        let mut rng = create_rng(42);
        tournament(&[], 3, &mut rng);
    }

    #[test]
    fn test_uniform_crossover_genes_come_from_parents() {
        let p1 = Individual::from_genes(vec![1.0, 1.0, 1.0, 1.0]);
        let p2 = Individual::from_genes(vec![2.0, 2.0, 2.0, 2.0]);
        let mut rng = create_rng(7);
        let (c1, c2) = uniform_crossover(&p1, &p2, &mut rng);
        for i in 0..4 {
            assert!(c1.genes[i] == 1.0 || c1.genes[i] == 2.0);
            // Offspring are complementary at every locus
            assert!((c1.genes[i] + c2.genes[i] - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_mutation_respects_bounds() {
        let rs = resources(&[(0.0, 1.0)]);
        let mut rng = create_rng(9);
        for _ in 0..1_000 {
            let mut ind = Individual::from_genes(vec![0.95]);
            mutate(&mut ind, &rs, &mut rng);
            assert!(ind.genes[0] >= 0.0 && ind.genes[0] <= 1.0);
        }
    }

    #[test]
    fn test_mutation_leaves_degenerate_gene_fixed() {
        let rs = resources(&[(4.0, 4.0)]);
        let mut rng = create_rng(11);
        let mut ind = Individual::from_genes(vec![4.0]);
        for _ in 0..1_000 {
            mutate(&mut ind, &rs, &mut rng);
            assert_eq!(ind.genes[0], 4.0);
        }
    }

    #[test]
    fn test_mutation_perturbation_bounded_by_span() {
        let rs = resources(&[(0.0, 100.0)]);
        let mut rng = create_rng(13);
        for _ in 0..1_000 {
            let mut ind = Individual::from_genes(vec![50.0]);
            mutate(&mut ind, &rs, &mut rng);
            assert!((ind.genes[0] - 50.0).abs() <= MUTATION_SPAN * 100.0);
        }
    }
}
