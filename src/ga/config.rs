//! Evolutionary search configuration.

use crate::error::{OptimError, Result};

/// Configuration for the evolutionary search engine.
///
/// # Defaults
///
/// ```
/// use resalloc_optim::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 200);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use resalloc_optim::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_elite_ratio(0.1)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone)]
pub struct GaConfig {
    /// Number of individuals in the population. Held constant across every
    /// generation.
    pub population_size: usize,

    /// Maximum number of generations before termination.
    pub max_generations: usize,

    /// Tournament size for parent selection. k=3 is the standard setting;
    /// larger values increase selection pressure.
    pub tournament_size: usize,

    /// Fraction of the population copied unchanged into the next generation
    /// (0.0–1.0). Any positive value makes best fitness non-decreasing.
    pub elite_ratio: f64,

    /// Probability of recombining two tournament winners (0.0–1.0). When
    /// crossover is not applied, a single winner is cloned instead.
    pub crossover_rate: f64,

    /// Probability of mutating an offspring (0.0–1.0).
    pub mutation_rate: f64,

    /// Generations without improvement before stopping. 0 disables
    /// stagnation-based termination.
    pub stagnation_limit: usize,

    /// Stop early once best fitness reaches this value.
    pub target_fitness: Option<f64>,

    /// Optional wall-clock budget in milliseconds, checked once per
    /// generation; the run may overshoot by one generation's worth of work.
    pub time_limit_ms: Option<u64>,

    /// Whether to evaluate offspring in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` draws a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 200,
            tournament_size: 3,
            elite_ratio: 0.1,
            crossover_rate: 0.9,
            mutation_rate: 0.2,
            stagnation_limit: 50,
            target_fitness: None,
            time_limit_ms: None,
            parallel: false,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the elite ratio.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the early-exit fitness target.
    pub fn with_target_fitness(mut self, target: f64) -> Self {
        self.target_fitness = Some(target);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Enables or disables parallel offspring evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(OptimError::InvalidConfiguration(
                "population_size must be at least 2".into(),
            ));
        }
        if self.max_generations == 0 {
            return Err(OptimError::InvalidConfiguration(
                "max_generations must be at least 1".into(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(OptimError::InvalidConfiguration(
                "tournament_size must be at least 1".into(),
            ));
        }
        let elite_count = (self.population_size as f64 * self.elite_ratio) as usize;
        if elite_count >= self.population_size {
            return Err(OptimError::InvalidConfiguration(
                "elite_ratio too high: elites fill entire population".into(),
            ));
        }
        if self.time_limit_ms == Some(0) {
            return Err(OptimError::InvalidConfiguration(
                "time_limit_ms must be positive or None".into(),
            ));
        }
        if let Some(target) = self.target_fitness {
            if !target.is_finite() {
                return Err(OptimError::InvalidConfiguration(
                    "target_fitness must be finite".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tournament_size, 3);
        assert_eq!(config.stagnation_limit, 50);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GaConfig::default()
            .with_population_size(50)
            .with_max_generations(1000)
            .with_tournament_size(5)
            .with_elite_ratio(0.2)
            .with_crossover_rate(0.8)
            .with_mutation_rate(0.05)
            .with_stagnation_limit(30)
            .with_target_fitness(12.5)
            .with_time_limit_ms(500)
            .with_seed(42);

        assert_eq!(config.population_size, 50);
        assert_eq!(config.max_generations, 1000);
        assert_eq!(config.tournament_size, 5);
        assert!((config.elite_ratio - 0.2).abs() < 1e-10);
        assert!((config.crossover_rate - 0.8).abs() < 1e-10);
        assert!((config.mutation_rate - 0.05).abs() < 1e-10);
        assert_eq!(config.stagnation_limit, 30);
        assert_eq!(config.target_fitness, Some(12.5));
        assert_eq!(config.time_limit_ms, Some(500));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_rates_clamped() {
        let config = GaConfig::default()
            .with_elite_ratio(1.5)
            .with_crossover_rate(-0.5)
            .with_mutation_rate(2.0);
        assert!((config.elite_ratio - 1.0).abs() < 1e-10);
        assert!((config.crossover_rate - 0.0).abs() < 1e-10);
        assert!((config.mutation_rate - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_validate_rejects_tiny_population() {
        assert!(GaConfig::default()
            .with_population_size(1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_zero_generations() {
        assert!(GaConfig::default()
            .with_max_generations(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_full_elitism() {
        assert!(GaConfig::default()
            .with_population_size(10)
            .with_elite_ratio(1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_zero_time_limit() {
        assert!(GaConfig::default().with_time_limit_ms(0).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_target() {
        assert!(GaConfig::default()
            .with_target_fitness(f64::NAN)
            .validate()
            .is_err());
    }
}
