//! Chromosome representation and evaluation.

use serde::{Deserialize, Serialize};

use crate::domain::{Impact, Problem};

/// Multiplier applied to the fitness of constraint-violating individuals.
///
/// Infeasible individuals are penalized, never discarded: a damped fitness
/// keeps gradient information pointing back toward the feasible region.
pub const INFEASIBILITY_PENALTY: f64 = 0.1;

/// One candidate allocation in the evolutionary search.
///
/// `genes[i]` is the allocation for resource `i` and stays within that
/// resource's `[min, max]` bounds at all times: initialization samples
/// inside the bounds and mutation clamps back into them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// One allocation value per resource, in resource order.
    pub genes: Vec<f64>,
    /// Scalarized objective score, penalized when infeasible. Higher is better.
    pub fitness: f64,
    /// Aggregate impact of the current genes.
    pub impact: Impact,
    /// Whether all constraints hold for the current genes.
    pub feasible: bool,
}

impl Individual {
    /// Wraps a gene vector with its fitness not yet computed.
    pub fn from_genes(genes: Vec<f64>) -> Self {
        Self {
            genes,
            fitness: f64::NEG_INFINITY,
            impact: Impact::default(),
            feasible: false,
        }
    }

    /// Recomputes impact, feasibility, and penalized fitness from the genes.
    pub fn evaluate(&mut self, problem: &Problem) {
        self.impact = problem.impact(&self.genes);
        self.feasible = problem.feasible(&self.impact);
        let mut fitness = problem.score(&self.impact);
        if !self.feasible {
            fitness *= INFEASIBILITY_PENALTY;
        }
        self.fitness = fitness;
    }
}
