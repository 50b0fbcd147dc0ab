//! # L-BFGS Backend: Augmented Lagrangian
//!
//! Pure-Rust fallback that drives the [`GibbsProblem`] callbacks without an
//! external NLP library. The constrained problem
//!
//! ```text
//! minimize    G(x) / (R·T)
//! subject to  g(x) = 0             (phase, site and mass balances)
//!             x_l ≤ x ≤ x_u        (fractions in [0, 1])
//! ```
//!
//! is turned into a sequence of unconstrained subproblems
//!
//! ```text
//! L_μ(x, λ) = G(x̂)/(R·T) + Σ λ_i g_i(x) + (μ/2) Σ g_i(x)² + (μ/2) Σ (x_j − x̂_j)²
//! ```
//!
//! where `x̂` is `x` projected onto the bounds (with site fractions kept a hair
//! above zero so `y ln y` stays defined). Each subproblem is solved with
//! argmin's L-BFGS, then `λ ← λ + μ·g(x)` and `μ ← 10·μ` until the largest
//! residual drops under the tolerance.
//!
//! Variables whose bounds coincide (a lone phase fraction, the single species
//! of a sublattice) are held at the bound and never move.
//!
//! ## Gradient
//!
//! - objective: analytic, from the expression engine
//! - phase and site balance rows: the evaluator's Jacobian values
//! - mass-balance rows: central differences of `Σ w_i g_i`, since their
//!   reported Jacobian leaves out the cross-species atom-count terms

use std::time::Instant;

use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use tracing::debug;

use crate::equilibrium::nlp::{jacobian_values, ConstraintKind, GibbsProblem};
use crate::equilibrium::solution::{GibbsSolution, SolutionStatus};
use crate::equilibrium::traits::{NlpBackend, SolverConfig};
use crate::error::GibbsError;
use crate::models::GAS_CONSTANT;

/// Smallest site fraction the objective is evaluated at.
const FRACTION_FLOOR: f64 = 1e-12;

const INITIAL_PENALTY: f64 = 10.0;
const PENALTY_GROWTH: f64 = 10.0;
const MAX_PENALTY: f64 = 1e6;
const MAX_OUTER_ITERATIONS: usize = 20;
const MIN_INNER_ITERATIONS: u64 = 10;

/// Central difference step for the mass-balance rows.
const FD_STEP: f64 = 1e-7;

/// L-BFGS backend, always available.
pub struct LbfgsBackend;

impl NlpBackend for LbfgsBackend {
    fn id(&self) -> &str {
        "lbfgs"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn solve(
        &self,
        problem: &GibbsProblem,
        config: &SolverConfig,
    ) -> Result<GibbsSolution, GibbsError> {
        solve_with_start(problem, problem.initial_point(), config)
    }
}

/// Bound handling shared by the cost and gradient.
struct FractionBounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
    fixed: Vec<bool>,
}

impl FractionBounds {
    fn new(problem: &GibbsProblem) -> Self {
        let (lower, upper) = problem.variable_bounds();
        let fixed = lower.iter().zip(&upper).map(|(lo, hi)| lo == hi).collect();
        Self {
            lower,
            upper,
            fixed,
        }
    }

    /// `x` with fixed variables set to their bound.
    fn pin(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .enumerate()
            .map(|(j, &xj)| if self.fixed[j] { self.lower[j] } else { xj })
            .collect()
    }

    /// Lower bound used for objective evaluation.
    fn floor(&self, j: usize) -> f64 {
        if self.fixed[j] {
            self.lower[j]
        } else {
            self.lower[j].max(FRACTION_FLOOR)
        }
    }

    /// Projection used for objective evaluation.
    fn clamp(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .enumerate()
            .map(|(j, &xj)| {
                if self.fixed[j] {
                    self.lower[j]
                } else {
                    xj.max(self.floor(j)).min(self.upper[j])
                }
            })
            .collect()
    }

    /// True where the objective sees a moving variable.
    fn is_free(&self, x: &[f64], j: usize) -> bool {
        !self.fixed[j] && x[j] > self.floor(j) && x[j] < self.upper[j]
    }

    /// `x - proj(x)` over the non-fixed variables.
    fn excess(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .enumerate()
            .map(|(j, &xj)| {
                if self.fixed[j] {
                    0.0
                } else {
                    xj - xj.max(self.lower[j]).min(self.upper[j])
                }
            })
            .collect()
    }

    fn project(&self, x: &mut [f64]) {
        for (j, xj) in x.iter_mut().enumerate() {
            *xj = xj.max(self.lower[j]).min(self.upper[j]);
        }
    }
}

/// One augmented Lagrangian subproblem.
struct AugmentedLagrangian<'a> {
    problem: &'a GibbsProblem,
    bounds: &'a FractionBounds,
    multipliers: &'a [f64],
    penalty: f64,
    /// `1 / (R T)`
    scale: f64,
    /// Catalogue rows that are mass balances
    mass_rows: Vec<usize>,
}

impl<'a> AugmentedLagrangian<'a> {
    /// Weight of each constraint gradient in `∇L`: `λ_i + μ g_i`.
    fn weights(&self, g: &[f64]) -> Vec<f64> {
        g.iter()
            .zip(self.multipliers)
            .map(|(gi, li)| li + self.penalty * gi)
            .collect()
    }

    fn weighted_mass_residual(&self, x: &[f64], weights: &[f64]) -> f64 {
        let g = self.problem.constraints(x);
        self.mass_rows.iter().map(|&i| weights[i] * g[i]).sum()
    }
}

impl<'a> CostFunction for AugmentedLagrangian<'a> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let objective = self.problem.objective(&self.bounds.clamp(x))? * self.scale;

        let pinned = self.bounds.pin(x);
        let g = self.problem.constraints(&pinned);
        let constraint_terms: f64 = g
            .iter()
            .zip(self.multipliers)
            .map(|(gi, li)| li * gi + 0.5 * self.penalty * gi * gi)
            .sum();

        let bound_terms: f64 = self
            .bounds
            .excess(x)
            .iter()
            .map(|b| 0.5 * self.penalty * b * b)
            .sum();

        Ok(objective + constraint_terms + bound_terms)
    }
}

impl<'a> Gradient for AugmentedLagrangian<'a> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, x: &Self::Param) -> Result<Self::Gradient, argmin::core::Error> {
        let n = x.len();
        let mut grad = self.problem.objective_gradient(&self.bounds.clamp(x))?;
        for (j, gj) in grad.iter_mut().enumerate() {
            if self.bounds.is_free(x, j) {
                *gj *= self.scale;
            } else {
                *gj = 0.0;
            }
        }

        let pinned = self.bounds.pin(x);
        let g = self.problem.constraints(&pinned);
        let weights = self.weights(&g);

        // Phase and site balance rows through the Jacobian entries.
        let values = jacobian_values(self.problem, &pinned);
        for (entry, value) in self.problem.catalogue().entries().zip(values) {
            let is_mass_row = matches!(
                self.problem.catalogue().row(entry.row).kind,
                ConstraintKind::MassBalance { .. }
            );
            if is_mass_row || self.bounds.fixed[entry.col] {
                continue;
            }
            grad[entry.col] += weights[entry.row] * value;
        }

        if !self.mass_rows.is_empty() {
            for j in 0..n {
                if self.bounds.fixed[j] {
                    continue;
                }
                let mut forward = pinned.clone();
                let mut backward = pinned.clone();
                forward[j] += FD_STEP;
                backward[j] -= FD_STEP;
                grad[j] += (self.weighted_mass_residual(&forward, &weights)
                    - self.weighted_mass_residual(&backward, &weights))
                    / (2.0 * FD_STEP);
            }
        }

        for (j, b) in self.bounds.excess(x).into_iter().enumerate() {
            grad[j] += self.penalty * b;
        }

        Ok(grad)
    }
}

/// Solve from a given starting point.
pub fn solve_with_start(
    problem: &GibbsProblem,
    x0: Vec<f64>,
    config: &SolverConfig,
) -> Result<GibbsSolution, GibbsError> {
    let start = Instant::now();
    let bounds = FractionBounds::new(problem);
    let scale = 1.0 / (GAS_CONSTANT * problem.conditions().temperature);
    let mass_rows: Vec<usize> = problem
        .catalogue()
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| matches!(row.kind, ConstraintKind::MassBalance { .. }))
        .map(|(i, _)| i)
        .collect();

    let mut x = bounds.pin(&x0);
    let mut multipliers = vec![0.0; problem.catalogue().len()];
    let mut penalty = INITIAL_PENALTY;
    let mut total_iterations = 0;
    let inner_max_iter =
        (config.max_iterations as u64 / MAX_OUTER_ITERATIONS as u64).max(MIN_INNER_ITERATIONS);

    for outer in 0..MAX_OUTER_ITERATIONS {
        let subproblem = AugmentedLagrangian {
            problem,
            bounds: &bounds,
            multipliers: &multipliers,
            penalty,
            scale,
            mass_rows: mass_rows.clone(),
        };

        let linesearch = MoreThuenteLineSearch::new();
        let solver = LBFGS::new(linesearch, 7);
        let result = Executor::new(subproblem, solver)
            .configure(|state| state.param(x.clone()).max_iters(inner_max_iter))
            .run();

        match result {
            Ok(res) => {
                total_iterations += res.state().get_iter() as usize;
                if let Some(best) = res.state().get_best_param() {
                    x = best.clone();
                }
            }
            Err(err) => {
                // keep the current point; the multiplier update may still help
                debug!(outer, error = %err, "L-BFGS subproblem failed");
            }
        }

        let pinned = bounds.pin(&x);
        let g = problem.constraints(&pinned);
        for (li, gi) in multipliers.iter_mut().zip(&g) {
            *li += penalty * gi;
        }

        let violation = problem.max_violation(&pinned);
        debug!(
            outer,
            penalty,
            violation,
            iterations = total_iterations,
            "augmented Lagrangian step"
        );
        if violation < config.tolerance {
            break;
        }
        penalty = (penalty * PENALTY_GROWTH).min(MAX_PENALTY);
    }

    let mut x = bounds.pin(&x);
    bounds.project(&mut x);
    let violation = problem.max_violation(&x);

    let status = if violation < config.tolerance {
        SolutionStatus::Optimal
    } else if violation < config.tolerance * 10.0 {
        SolutionStatus::Acceptable
    } else {
        SolutionStatus::IterationLimit
    };

    Ok(GibbsSolution {
        status,
        objective: problem.objective(&bounds.clamp(&x))?,
        iterations: total_iterations,
        solve_time_ms: start.elapsed().as_millis(),
        constraint_violation: violation,
        phases: problem.finalize(&x),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{binary_conditions, liquid_conditions, two_phase_database};

    #[test]
    fn test_lbfgs_backend_id() {
        let backend = LbfgsBackend;
        assert_eq!(backend.id(), "lbfgs");
        assert!(backend.is_available());
    }

    #[test]
    fn test_fixed_variables_are_pinned() {
        let problem = GibbsProblem::new(&two_phase_database(), &liquid_conditions(0.3)).unwrap();
        let bounds = FractionBounds::new(&problem);
        // LIQUID_FRAC is the only fixed variable
        assert_eq!(bounds.fixed, vec![true, false, false]);
        assert_eq!(bounds.pin(&[0.2, 0.5, 0.5]), vec![1.0, 0.5, 0.5]);
        assert_eq!(bounds.clamp(&[0.2, -0.1, 1.5]), vec![1.0, FRACTION_FLOOR, 1.0]);
        assert_eq!(bounds.excess(&[0.2, -0.1, 1.5]), vec![0.0, -0.1, 0.5]);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let problem = GibbsProblem::new(&two_phase_database(), &binary_conditions()).unwrap();
        let bounds = FractionBounds::new(&problem);
        let multipliers = vec![0.3, -0.2, 0.1, 0.5];
        let subproblem = AugmentedLagrangian {
            problem: &problem,
            bounds: &bounds,
            multipliers: &multipliers,
            penalty: 10.0,
            scale: 1.0 / (GAS_CONSTANT * 1400.0),
            mass_rows: vec![3],
        };

        let x = vec![0.4, 0.65, 0.35, 1.0, 0.6, 0.2, 0.8];
        let grad = subproblem.gradient(&x).unwrap();
        let h = 1e-6;
        for j in 0..x.len() {
            if bounds.fixed[j] {
                assert_eq!(grad[j], 0.0);
                continue;
            }
            let mut xp = x.clone();
            let mut xm = x.clone();
            xp[j] += h;
            xm[j] -= h;
            let fd = (subproblem.cost(&xp).unwrap() - subproblem.cost(&xm).unwrap()) / (2.0 * h);
            assert!(
                (fd - grad[j]).abs() < 1e-4 * (1.0 + fd.abs()),
                "component {j}: analytic {}, finite difference {fd}",
                grad[j]
            );
        }
    }

    #[test]
    fn test_single_phase_binary_solve() {
        let problem = GibbsProblem::new(&two_phase_database(), &liquid_conditions(0.3)).unwrap();
        let config = SolverConfig {
            tolerance: 1e-7,
            ..SolverConfig::default()
        };
        let solution = LbfgsBackend.solve(&problem, &config).unwrap();

        let liquid = solution.phase("LIQUID").unwrap();
        assert_eq!(liquid.fraction, 1.0);
        let y_ni = liquid.site_fraction(0, "NI").unwrap();
        assert!((y_ni - 0.3).abs() < 1e-3, "y_NI = {y_ni}");
        assert!(solution.constraint_violation < 1e-3);
        assert!(solution.objective.is_finite());
    }

    #[test]
    fn test_two_phase_solve_stays_in_bounds() {
        let problem = GibbsProblem::new(&two_phase_database(), &binary_conditions()).unwrap();
        let solution = LbfgsBackend
            .solve(&problem, &SolverConfig::default())
            .unwrap();

        assert_eq!(solution.phases.len(), 2);
        for (name, phase) in &solution.phases {
            assert!((0.0..=1.0).contains(&phase.fraction), "{name}");
            for occupancy in &phase.sublattices {
                for (species, y) in &occupancy.site_fractions {
                    assert!((0.0..=1.0).contains(y), "{name} {species} = {y}");
                }
            }
        }
        assert!(solution.objective.is_finite());
    }
}
