//! IPOPT backend.
//!
//! [`IpoptGibbs`] implements the `ipopt` crate's problem traits directly on
//! top of [`GibbsProblem`]. The Lagrangian Hessian is never supplied; the
//! solver runs with `hessian_approximation = limited-memory`.

#![cfg(feature = "solver-ipopt")]

use std::time::Instant;

use ipopt::{
    BasicProblem, ConstrainedProblem, Index, IntermediateCallbackData, Ipopt, Number, SolveStatus,
};
use tracing::debug;

use crate::equilibrium::nlp::{describe_sparsity, fill_values, GibbsProblem};
use crate::equilibrium::solution::{GibbsSolution, SolutionStatus};
use crate::equilibrium::traits::{NlpBackend, SolverConfig};
use crate::error::GibbsError;

/// Callback adapter handed to IPOPT.
pub struct IpoptGibbs<'a> {
    problem: &'a GibbsProblem,
    iterations: usize,
}

impl<'a> IpoptGibbs<'a> {
    pub fn new(problem: &'a GibbsProblem) -> Self {
        Self {
            problem,
            iterations,
        }
    }

    /// Iterations IPOPT has reported so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn record_iteration(&mut self, iter_count: Index) {
        self.iterations = usize::try_from(iter_count).unwrap_or(0);
    }

    fn on_iteration(&mut self, data: IntermediateCallbackData) -> bool {
        self.record_iteration(data.iter_count);
        true
    }
}

impl<'a> BasicProblem for IpoptGibbs<'a> {
    fn num_variables(&self) -> usize {
        self.problem.nlp_info().n
    }

    fn bounds(&self, x_l: &mut [Number], x_u: &mut [Number]) -> bool {
        let (lower, upper) = self.problem.variable_bounds();
        x_l.copy_from_slice(&lower);
        x_u.copy_from_slice(&upper);
        true
    }

    fn initial_point(&self, x: &mut [Number]) -> bool {
        x.copy_from_slice(&self.problem.initial_point());
        true
    }

    fn objective(&self, x: &[Number], _new_x: bool, obj: &mut Number) -> bool {
        match self.problem.objective(x) {
            Ok(value) => {
                *obj = value;
                true
            }
            Err(err) => {
                debug!(error = %err, "objective evaluation failed");
                false
            }
        }
    }

    fn objective_grad(&self, x: &[Number], _new_x: bool, grad_f: &mut [Number]) -> bool {
        match self.problem.objective_gradient(x) {
            Ok(grad) => {
                grad_f.copy_from_slice(&grad);
                true
            }
            Err(err) => {
                debug!(error = %err, "gradient evaluation failed");
                false
            }
        }
    }
}

impl<'a> ConstrainedProblem for IpoptGibbs<'a> {
    fn num_constraints(&self) -> usize {
        self.problem.nlp_info().m
    }

    fn num_constraint_jacobian_non_zeros(&self) -> usize {
        self.problem.nlp_info().nnz_jac_g
    }

    fn constraint_bounds(&self, g_l: &mut [Number], g_u: &mut [Number]) -> bool {
        let (lower, upper) = self.problem.constraint_bounds();
        g_l.copy_from_slice(&lower);
        g_u.copy_from_slice(&upper);
        true
    }

    fn constraint(&self, x: &[Number], _new_x: bool, g: &mut [Number]) -> bool {
        g.copy_from_slice(&self.problem.constraints(x));
        true
    }

    fn constraint_jacobian_indices(&self, irow: &mut [Index], jcol: &mut [Index]) -> bool {
        describe_sparsity(self.problem, irow, jcol)
    }

    fn constraint_jacobian_values(&self, x: &[Number], _new_x: bool, vals: &mut [Number]) -> bool {
        fill_values(self.problem, x, vals)
    }

    fn num_hessian_non_zeros(&self) -> usize {
        0
    }

    fn hessian_indices(&self, _irow: &mut [Index], _jcol: &mut [Index]) -> bool {
        false
    }

    fn hessian_values(
        &self,
        _x: &[Number],
        _new_x: bool,
        _obj_factor: Number,
        _lambda: &[Number],
        _vals: &mut [Number],
    ) -> bool {
        false
    }
}

fn map_status(status: &SolveStatus) -> SolutionStatus {
    match status {
        SolveStatus::SolveSucceeded => SolutionStatus::Optimal,
        SolveStatus::SolvedToAcceptableLevel => SolutionStatus::Acceptable,
        SolveStatus::InfeasibleProblemDetected => SolutionStatus::Infeasible,
        SolveStatus::MaximumIterationsExceeded => SolutionStatus::IterationLimit,
        SolveStatus::InvalidNumberDetected | SolveStatus::ErrorInStepComputation => {
            SolutionStatus::NumericalError
        }
        _ => SolutionStatus::Unknown,
    }
}

/// IPOPT interior-point backend (feature `solver-ipopt`).
pub struct IpoptBackend;

impl NlpBackend for IpoptBackend {
    fn id(&self) -> &str {
        "ipopt"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn solve(
        &self,
        problem: &GibbsProblem,
        config: &SolverConfig,
    ) -> Result<GibbsSolution, GibbsError> {
        let start = Instant::now();
        let mut solver = Ipopt::new(IpoptGibbs::new(problem))
            .map_err(|e| GibbsError::Solver(format!("IPOPT init failed: {:?}", e)))?;

        solver.set_option("max_iter", config.max_iterations as i32);
        solver.set_option("tol", config.tolerance);
        solver.set_option("print_level", config.print_level);
        solver.set_option("sb", "yes");
        solver.set_option("hessian_approximation", "limited-memory");
        solver.set_intermediate_callback(Some(IpoptGibbs::on_iteration));

        let result = solver.solve();
        let status = map_status(&result.status);
        let iterations = result.solver_data.problem.iterations();
        debug!(ipopt_status = ?result.status, %status, iterations, "IPOPT finished");

        let x = result.solver_data.solution.primal_variables;
        Ok(GibbsSolution {
            status,
            objective: result.objective_value,
            iterations,
            solve_time_ms: start.elapsed().as_millis(),
            constraint_violation: problem.max_violation(x),
            phases: problem.finalize(x),
        })
    }
}
