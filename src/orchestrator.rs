//! End-to-end optimization pipeline.
//!
//! [`Optimizer`] sequences the two search stages (evolutionary global
//! search, then tabular local refinement seeded with the evolutionary best)
//! and formats the outcome for callers: a name-keyed allocation map, the
//! recomputed aggregate impact, a confidence score, and a stepwise
//! implementation plan with heuristic timeline/risk/cost classifications.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Constraint, Impact, Objective, Problem, Resource};
use crate::error::{OptimError, Result};
use crate::ga::{GaConfig, GaEngine};
use crate::refine::{RefineConfig, RefinementAgent};

/// Allocations within this absolute margin of a resource's minimum are
/// treated as "already at minimum" and produce no plan step.
const PLAN_EPSILON: f64 = 1e-9;

/// Relative-allocation thresholds for risk classification.
const HIGH_RISK_THRESHOLD: f64 = 0.75;
const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

/// Risk classification for a plan step or the whole plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// One implementation step: ramp a single resource to its target allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Resource being ramped.
    pub resource: String,
    /// Final allocation for this resource.
    pub target_allocation: f64,
    /// Heuristic rollout duration.
    pub duration_weeks: u32,
    /// Heuristic risk class, driven by how far above its minimum the
    /// resource is pushed.
    pub risk: RiskLevel,
    /// Allocation × unit cost.
    pub cost: f64,
}

/// Stepwise rollout plan derived from the final allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationPlan {
    /// One step per resource allocated above its minimum.
    pub steps: Vec<PlanStep>,
    /// Longest step duration (steps are independent workstreams).
    pub total_duration_weeks: u32,
    /// Sum of step costs.
    pub total_cost: f64,
    /// Worst risk across steps; [`RiskLevel::Low`] for an empty plan.
    pub risk_assessment: RiskLevel,
}

/// Final result of an optimization request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Resource name → refined allocation.
    pub allocation: BTreeMap<String, f64>,
    /// Aggregate impact recomputed from the final allocation.
    pub expected_impact: Impact,
    /// Refiner confidence in `[0.5, 0.95]`.
    pub confidence: f64,
    /// Rollout plan.
    pub implementation_plan: ImplementationPlan,
}

/// Sequences evolutionary search and tabular refinement.
///
/// One optimizer instance serves one logical optimization request at a time;
/// it owns no shared state, so callers needing concurrency create one
/// instance per request.
#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    ga_config: GaConfig,
    refine_config: RefineConfig,
}

impl Optimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the evolutionary stage configuration.
    pub fn with_ga_config(mut self, config: GaConfig) -> Self {
        self.ga_config = config;
        self
    }

    /// Replaces the refinement stage configuration.
    pub fn with_refine_config(mut self, config: RefineConfig) -> Self {
        self.refine_config = config;
        self
    }

    /// Runs the full pipeline.
    ///
    /// # Errors
    ///
    /// - [`OptimError::InvalidConfiguration`] for an invalid problem or
    ///   stage configuration, before any search begins.
    /// - [`OptimError::NoFeasibleSolution`] when the evolutionary stage
    ///   exhausts its budget without a feasible individual; refinement
    ///   requires a feasible seed.
    pub fn optimize(
        &self,
        resources: Vec<Resource>,
        constraints: Vec<Constraint>,
        objectives: Vec<Objective>,
    ) -> Result<OptimizationResult> {
        let problem = Problem::new(resources, constraints, objectives)?;

        let ga_outcome = GaEngine::evolve(&problem, &self.ga_config)?;
        if !ga_outcome.best.feasible {
            return Err(OptimError::NoFeasibleSolution {
                generations: ga_outcome.generations,
            });
        }
        debug!(
            fitness = ga_outcome.best.fitness,
            generations = ga_outcome.generations,
            "global search produced a feasible seed"
        );

        let mut refiner = RefinementAgent::new(self.refine_config.clone())?;
        let refined = refiner.refine(&ga_outcome.best.genes, &problem)?;

        let expected_impact = problem.impact(&refined.allocation);
        let allocation: BTreeMap<String, f64> = problem
            .resources()
            .iter()
            .zip(&refined.allocation)
            .map(|(r, v)| (r.name.clone(), *v))
            .collect();
        let implementation_plan = build_plan(problem.resources(), &refined.allocation);

        info!(
            confidence = refined.confidence,
            steps = implementation_plan.steps.len(),
            risk = ?implementation_plan.risk_assessment,
            "optimization request complete"
        );

        Ok(OptimizationResult {
            allocation,
            expected_impact,
            confidence: refined.confidence,
            implementation_plan,
        })
    }
}

/// Derives the rollout plan: one step per resource allocated above its
/// minimum, classified by how far into its range the allocation sits.
fn build_plan(resources: &[Resource], allocation: &[f64]) -> ImplementationPlan {
    let mut steps = Vec::new();
    for (resource, &value) in resources.iter().zip(allocation) {
        if value <= resource.min + PLAN_EPSILON {
            continue;
        }
        let relative = if resource.range() > 0.0 {
            (value - resource.min) / resource.range()
        } else {
            1.0
        };
        steps.push(PlanStep {
            resource: resource.name.clone(),
            target_allocation: value,
            duration_weeks: ((relative * 12.0).ceil() as u32).max(1),
            risk: classify_risk(relative),
            cost: value * resource.cost,
        });
    }

    let total_duration_weeks = steps.iter().map(|s| s.duration_weeks).max().unwrap_or(0);
    let total_cost = steps.iter().map(|s| s.cost).sum();
    let risk_assessment = steps
        .iter()
        .map(|s| s.risk)
        .max()
        .unwrap_or(RiskLevel::Low);

    ImplementationPlan {
        steps,
        total_duration_weeks,
        total_cost,
        risk_assessment,
    }
}

fn classify_risk(relative_allocation: f64) -> RiskLevel {
    if relative_allocation > HIGH_RISK_THRESHOLD {
        RiskLevel::High
    } else if relative_allocation > MEDIUM_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Aggregate, ConstraintOp};

    fn resource(name: &str, min: f64, max: f64, cost: f64) -> Resource {
        Resource {
            name: name.into(),
            min,
            max,
            cost,
            emissions_factor: 0.2,
            efficiency: 1.0,
        }
    }

    fn seeded_optimizer() -> Optimizer {
        Optimizer::new()
            .with_ga_config(
                GaConfig::default()
                    .with_population_size(60)
                    .with_max_generations(80)
                    .with_seed(42),
            )
            .with_refine_config(RefineConfig::default().with_seed(42))
    }

    #[test]
    fn test_end_to_end_optimization() {
        let result = seeded_optimizer()
            .optimize(
                vec![
                    resource("solar", 0.0, 10.0, 1.0),
                    resource("wind", 0.0, 10.0, 1.0),
                ],
                vec![Constraint {
                    target: Aggregate::Cost,
                    op: ConstraintOp::LessEq,
                    value: 15.0,
                }],
                vec![Objective {
                    target: Aggregate::Efficiency,
                    weight: 1.0,
                    minimize: false,
                }],
            )
            .unwrap();

        assert_eq!(result.allocation.len(), 2);
        assert!(result.allocation.contains_key("solar"));
        assert!(result.allocation.contains_key("wind"));
        assert!(
            result.expected_impact.cost <= 15.0 + 0.5,
            "refined allocation broke the budget: {}",
            result.expected_impact.cost
        );
        assert!((0.5..=0.95).contains(&result.confidence));
        assert!(!result.implementation_plan.steps.is_empty());
        // Rollup risk is the worst step risk.
        let worst = result
            .implementation_plan
            .steps
            .iter()
            .map(|s| s.risk)
            .max()
            .unwrap();
        assert_eq!(result.implementation_plan.risk_assessment, worst);
    }

    #[test]
    fn test_infeasible_problem_is_fatal() {
        let err = seeded_optimizer()
            .optimize(
                vec![resource("a", 0.0, 10.0, 1.0)],
                vec![Constraint {
                    target: Aggregate::Efficiency,
                    op: ConstraintOp::GreaterEq,
                    value: 1_000.0,
                }],
                vec![Objective {
                    target: Aggregate::Efficiency,
                    weight: 1.0,
                    minimize: false,
                }],
            )
            .unwrap_err();
        assert!(matches!(err, OptimError::NoFeasibleSolution { .. }));
    }

    #[test]
    fn test_invalid_problem_fails_before_search() {
        let err = seeded_optimizer()
            .optimize(
                vec![],
                vec![],
                vec![Objective {
                    target: Aggregate::Cost,
                    weight: 1.0,
                    minimize: true,
                }],
            )
            .unwrap_err();
        assert!(matches!(err, OptimError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_plan_skips_resources_at_minimum() {
        let resources = vec![resource("fixed", 5.0, 5.0, 1.0), resource("a", 0.0, 10.0, 1.0)];
        let plan = build_plan(&resources, &[5.0, 8.0]);
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].resource, "a");
    }

    #[test]
    fn test_plan_risk_classification() {
        assert_eq!(classify_risk(0.1), RiskLevel::Low);
        assert_eq!(classify_risk(0.5), RiskLevel::Medium);
        assert_eq!(classify_risk(0.9), RiskLevel::High);
    }

    #[test]
    fn test_plan_totals() {
        let resources = vec![resource("a", 0.0, 10.0, 2.0), resource("b", 0.0, 10.0, 1.0)];
        let plan = build_plan(&resources, &[10.0, 4.0]);
        assert_eq!(plan.steps.len(), 2);
        // Duration is the max (parallel workstreams), cost the sum.
        assert_eq!(plan.total_duration_weeks, 12);
        assert!((plan.total_cost - (10.0 * 2.0 + 4.0)).abs() < 1e-9);
        assert_eq!(plan.risk_assessment, RiskLevel::High);
    }

    #[test]
    fn test_empty_plan_rolls_up_low_risk() {
        let resources = vec![resource("fixed", 5.0, 5.0, 1.0)];
        let plan = build_plan(&resources, &[5.0]);
        assert!(plan.steps.is_empty());
        assert_eq!(plan.risk_assessment, RiskLevel::Low);
        assert_eq!(plan.total_duration_weeks, 0);
    }

    #[test]
    fn test_seeded_pipeline_is_deterministic() {
        let run = || {
            seeded_optimizer()
                .optimize(
                    vec![
                        resource("solar", 0.0, 10.0, 1.0),
                        resource("wind", 0.0, 10.0, 1.0),
                    ],
                    vec![],
                    vec![Objective {
                        target: Aggregate::Efficiency,
                        weight: 1.0,
                        minimize: false,
                    }],
                )
                .unwrap()
        };
        assert_eq!(run(), run());
    }
}
