//! Problem domain: resources, constraints, objectives, and the shared
//! scalarization they induce.
//!
//! Every algorithm in this crate scores an allocation the same way: compute
//! the aggregate [`Impact`] of the gene vector, then fold the weighted,
//! direction-aware objectives into a single score via [`scalarize`]. Keeping
//! these as free functions over plain data means the evolutionary fitness
//! (§ ga) and the refinement reward (§ refine) cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::error::{OptimError, Result};

/// Feasibility tolerance for equality and boundary comparisons.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Finite stand-in for "worst possible score" when a computation produces
/// NaN or infinity. Local numeric corruption is clamped to this instead of
/// propagating (see error module docs).
pub(crate) const WORST_SCORE: f64 = f64::MIN;

/// One allocatable resource with bounds and per-unit coefficients.
///
/// Immutable once passed into a search. `min == max` is allowed and pins
/// the corresponding gene to that value for the entire run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique name; doubles as the key of the output allocation map.
    pub name: String,
    /// Lower allocation bound (inclusive).
    pub min: f64,
    /// Upper allocation bound (inclusive). Must satisfy `min <= max`.
    pub max: f64,
    /// Cost per allocated unit.
    pub cost: f64,
    /// Emissions per allocated unit.
    pub emissions_factor: f64,
    /// Efficiency contribution per allocated unit.
    pub efficiency: f64,
}

impl Resource {
    /// Allocation range (`max - min`).
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Clamps a candidate allocation into this resource's bounds.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// One of the three derived aggregates an objective or constraint can
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    /// Total cost: `Σ genes[i] · cost[i]`. Constraint tag: "budget".
    Cost,
    /// Total emissions: `Σ genes[i] · emissions_factor[i]`.
    Emissions,
    /// Total efficiency: `Σ genes[i] · efficiency[i]`.
    Efficiency,
}

impl Aggregate {
    /// Parses an aggregate from its external name.
    ///
    /// Accepts `"cost"` / `"budget"`, `"emissions"`, `"efficiency"`.
    /// Unknown names are an [`OptimError::InvalidConfiguration`]; the
    /// fail-fast path for objectives referencing aggregates that do not
    /// exist.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "cost" | "budget" => Ok(Aggregate::Cost),
            "emissions" => Ok(Aggregate::Emissions),
            "efficiency" => Ok(Aggregate::Efficiency),
            other => Err(OptimError::InvalidConfiguration(format!(
                "unknown aggregate '{other}' (expected cost/budget, emissions, or efficiency)"
            ))),
        }
    }
}

/// Comparison operator for constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintOp {
    /// Aggregate must be `<= value` (within tolerance).
    LessEq,
    /// Aggregate must be `>= value` (within tolerance).
    GreaterEq,
    /// Aggregate must equal `value` (within tolerance).
    Equal,
}

/// A business constraint over a derived aggregate.
///
/// Constraints are evaluated against [`Impact`] values, never against raw
/// genes. Violations are non-fatal per individual: the evolutionary engine
/// absorbs them as a fitness penalty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Which aggregate this constraint bounds.
    pub target: Aggregate,
    /// Comparison operator.
    pub op: ConstraintOp,
    /// Threshold value.
    pub value: f64,
}

impl Constraint {
    /// Whether `aggregate_value` satisfies this constraint within
    /// [`FEASIBILITY_TOLERANCE`].
    pub fn holds(&self, aggregate_value: f64) -> bool {
        match self.op {
            ConstraintOp::LessEq => aggregate_value <= self.value + FEASIBILITY_TOLERANCE,
            ConstraintOp::GreaterEq => aggregate_value >= self.value - FEASIBILITY_TOLERANCE,
            ConstraintOp::Equal => (aggregate_value - self.value).abs() <= FEASIBILITY_TOLERANCE,
        }
    }
}

/// A weighted, direction-aware optimization objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// The aggregate this objective scores.
    pub target: Aggregate,
    /// Non-negative weight. Weights are not required to sum to 1.
    pub weight: f64,
    /// `true` to minimize the aggregate, `false` to maximize it.
    pub minimize: bool,
}

impl Objective {
    /// Builds an objective from an external aggregate name.
    pub fn named(name: &str, weight: f64, minimize: bool) -> Result<Self> {
        Ok(Self {
            target: Aggregate::from_name(name)?,
            weight,
            minimize,
        })
    }
}

/// The three aggregates derived from an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Impact {
    pub cost: f64,
    pub emissions: f64,
    pub efficiency: f64,
}

impl Impact {
    /// Value of a single aggregate.
    pub fn get(&self, aggregate: Aggregate) -> f64 {
        match aggregate {
            Aggregate::Cost => self.cost,
            Aggregate::Emissions => self.emissions,
            Aggregate::Efficiency => self.efficiency,
        }
    }
}

/// Computes aggregate impact for an allocation vector.
///
/// `genes` and `resources` must have equal length; callers go through
/// [`Problem::new`] or validate explicitly before search, so this is a
/// debug-time invariant here.
pub fn compute_impact(genes: &[f64], resources: &[Resource]) -> Impact {
    debug_assert_eq!(genes.len(), resources.len());
    let mut impact = Impact::default();
    for (gene, resource) in genes.iter().zip(resources) {
        impact.cost += gene * resource.cost;
        impact.emissions += gene * resource.emissions_factor;
        impact.efficiency += gene * resource.efficiency;
    }
    impact
}

/// Folds the objectives into a single score: `+ weight × value` when
/// maximizing, `− weight × value` when minimizing. Higher is better.
///
/// A NaN/infinite result is clamped to a finite worst-case score so one
/// corrupt individual cannot poison population-level comparisons.
pub fn scalarize(objectives: &[Objective], impact: &Impact) -> f64 {
    let mut score = 0.0;
    for objective in objectives {
        let value = impact.get(objective.target);
        if objective.minimize {
            score -= objective.weight * value;
        } else {
            score += objective.weight * value;
        }
    }
    if score.is_finite() {
        score
    } else {
        WORST_SCORE
    }
}

/// Whether the impact satisfies every constraint.
pub fn is_feasible(constraints: &[Constraint], impact: &Impact) -> bool {
    constraints
        .iter()
        .all(|c| c.holds(impact.get(c.target)))
}

/// A fully validated optimization problem.
///
/// Construction is the fail-fast gate: every engine takes `&Problem`, so an
/// invalid definition can never reach a search loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    resources: Vec<Resource>,
    constraints: Vec<Constraint>,
    objectives: Vec<Objective>,
}

impl Problem {
    /// Validates and bundles a problem definition.
    ///
    /// # Errors
    ///
    /// [`OptimError::InvalidConfiguration`] when the resource list is empty,
    /// any bound or coefficient is non-finite, `min > max`, resource names
    /// collide, there are no objectives, or any weight is negative.
    pub fn new(
        resources: Vec<Resource>,
        constraints: Vec<Constraint>,
        objectives: Vec<Objective>,
    ) -> Result<Self> {
        if resources.is_empty() {
            return Err(OptimError::InvalidConfiguration(
                "resource list is empty".into(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for r in &resources {
            if !seen.insert(r.name.as_str()) {
                return Err(OptimError::InvalidConfiguration(format!(
                    "duplicate resource name '{}'",
                    r.name
                )));
            }
            let coefficients = [r.min, r.max, r.cost, r.emissions_factor, r.efficiency];
            if coefficients.iter().any(|v| !v.is_finite()) {
                return Err(OptimError::InvalidConfiguration(format!(
                    "resource '{}' has a non-finite bound or coefficient",
                    r.name
                )));
            }
            if r.min > r.max {
                return Err(OptimError::InvalidConfiguration(format!(
                    "resource '{}' has min {} > max {}",
                    r.name, r.min, r.max
                )));
            }
        }
        for c in &constraints {
            if !c.value.is_finite() {
                return Err(OptimError::InvalidConfiguration(
                    "constraint threshold is non-finite".into(),
                ));
            }
        }
        if objectives.is_empty() {
            return Err(OptimError::InvalidConfiguration(
                "objective list is empty".into(),
            ));
        }
        for o in &objectives {
            if !(o.weight.is_finite() && o.weight >= 0.0) {
                return Err(OptimError::InvalidConfiguration(format!(
                    "objective weight {} must be finite and non-negative",
                    o.weight
                )));
            }
        }
        Ok(Self {
            resources,
            constraints,
            objectives,
        })
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// Number of decision variables (one gene per resource).
    pub fn dimension(&self) -> usize {
        self.resources.len()
    }

    /// Impact of an allocation under this problem.
    pub fn impact(&self, genes: &[f64]) -> Impact {
        compute_impact(genes, &self.resources)
    }

    /// Scalarized objective score of an allocation (higher is better).
    pub fn score(&self, impact: &Impact) -> f64 {
        scalarize(&self.objectives, impact)
    }

    /// Whether an impact satisfies all constraints.
    pub fn feasible(&self, impact: &Impact) -> bool {
        is_feasible(&self.constraints, impact)
    }
}
