//! # Constraint Jacobian
//!
//! Solvers query the Jacobian twice: once for the sparsity structure (row and
//! column of every nonzero, values buffer absent) and then, at every iterate,
//! for the values. The solver pairs values with the structure by position, so
//! both passes here walk the same iterator, [`ConstraintCatalogue::entries`].
//!
//! ## Entry values
//!
//! ```text
//!                     │ f_p           │ y(p, s, k)              │ y(p, s, i), i != k │
//! ────────────────────┼───────────────┼─────────────────────────┼────────────────────┤
//! phase balance       │ 1             │                         │                    │
//! site balance (p, s) │               │ 1                       │ 1                  │
//! mass balance k      │ x_k(p)        │ f_p dx_k(p)/dy(p, s, k) │ (not reported)     │
//! ```
//!
//! Mass-balance rows only report site fractions of their own species. The
//! cross-species derivatives through the atom count are left out of the
//! structure.
//!
//! [`ConstraintCatalogue::entries`]: super::constraints::ConstraintCatalogue::entries

use sprs::{CsMat, TriMat};

use super::constraints::{JacobianEntry, JacobianTerm};
use super::problem::GibbsProblem;
use crate::mole_fraction::{mole_fraction, mole_fraction_derivative, Constitution};

/// Sparsity pattern as `(rows, cols)`, zero-based.
pub fn jacobian_sparsity(problem: &GibbsProblem) -> (Vec<usize>, Vec<usize>) {
    problem
        .catalogue()
        .entries()
        .map(|entry| (entry.row, entry.col))
        .unzip()
}

pub fn jacobian_nnz(problem: &GibbsProblem) -> usize {
    problem.catalogue().nnz()
}

/// Values at `x`, in the order of [`jacobian_sparsity`].
pub fn jacobian_values(problem: &GibbsProblem, x: &[f64]) -> Vec<f64> {
    let constitutions = problem.constitutions(x);
    let values: Vec<f64> = problem
        .catalogue()
        .entries()
        .map(|entry| entry_value(problem, entry, x, &constitutions))
        .collect();
    assert_eq!(values.len(), jacobian_nnz(problem));
    values
}

fn entry_value(
    problem: &GibbsProblem,
    entry: &JacobianEntry,
    x: &[f64],
    constitutions: &[Constitution],
) -> f64 {
    let species = || {
        problem
            .catalogue()
            .row(entry.row)
            .kind
            .species()
            .unwrap_or_default()
    };
    match entry.term {
        JacobianTerm::Unit => 1.0,
        JacobianTerm::PhaseMoleFraction { phase } => mole_fraction(species(), &constitutions[phase]),
        JacobianTerm::SiteMoleFraction { phase, sublattice } => {
            let species = species();
            let fraction = x[problem.variables().phase_fraction(phase).index];
            fraction * mole_fraction_derivative(species, species, sublattice, &constitutions[phase])
        }
    }
}

/// Structure pass into solver-owned index buffers.
///
/// Returns `false` if the buffers do not have room for exactly `nnz` entries
/// or an index does not fit in `I`.
pub fn describe_sparsity<I: TryFrom<usize>>(
    problem: &GibbsProblem,
    rows: &mut [I],
    cols: &mut [I],
) -> bool {
    let nnz = jacobian_nnz(problem);
    if rows.len() != nnz || cols.len() != nnz {
        return false;
    }
    for (k, entry) in problem.catalogue().entries().enumerate() {
        match (I::try_from(entry.row), I::try_from(entry.col)) {
            (Ok(r), Ok(c)) => {
                rows[k] = r;
                cols[k] = c;
            }
            _ => return false,
        }
    }
    true
}

/// Value pass into a solver-owned buffer.
pub fn fill_values(problem: &GibbsProblem, x: &[f64], values: &mut [f64]) -> bool {
    if values.len() != jacobian_nnz(problem) {
        return false;
    }
    values.copy_from_slice(&jacobian_values(problem, x));
    true
}

/// Single entry point following the solver protocol: structure when
/// `values` is `None`, values otherwise.
pub fn eval_jacobian<I: TryFrom<usize>>(
    problem: &GibbsProblem,
    x: &[f64],
    rows: &mut [I],
    cols: &mut [I],
    values: Option<&mut [f64]>,
) -> bool {
    match values {
        None => describe_sparsity(problem, rows, cols),
        Some(values) => fill_values(problem, x, values),
    }
}

/// Jacobian at `x` as a CSR matrix, for diagnostics.
pub fn sparse_jacobian(problem: &GibbsProblem, x: &[f64]) -> CsMat<f64> {
    let info = problem.nlp_info();
    let mut triplets = TriMat::new((info.m, info.n));
    let (rows, cols) = jacobian_sparsity(problem);
    for ((r, c), v) in rows.into_iter().zip(cols).zip(jacobian_values(problem, x)) {
        triplets.add_triplet(r, c, v);
    }
    triplets.to_csr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equilibrium::nlp::ConstraintKind;
    use crate::test_utils::{binary_conditions, liquid_conditions, two_phase_database};

    fn problem() -> GibbsProblem {
        GibbsProblem::new(&two_phase_database(), &binary_conditions()).unwrap()
    }

    #[test]
    fn test_structure_and_values_align() {
        let problem = problem();
        let x = vec![0.4, 0.65, 0.35, 1.0, 0.6, 0.2, 0.8];

        let mut rows = vec![0i32; jacobian_nnz(&problem)];
        let mut cols = vec![0i32; jacobian_nnz(&problem)];
        assert!(eval_jacobian(&problem, &x, &mut rows, &mut cols, None));

        let mut values = vec![0.0; jacobian_nnz(&problem)];
        let mut unused_rows: Vec<i32> = Vec::new();
        let mut unused_cols: Vec<i32> = Vec::new();
        assert!(eval_jacobian(
            &problem,
            &x,
            &mut unused_rows,
            &mut unused_cols,
            Some(values.as_mut_slice())
        ));

        let (r, c) = jacobian_sparsity(&problem);
        assert_eq!(rows.iter().map(|&v| v as usize).collect::<Vec<_>>(), r);
        assert_eq!(cols.iter().map(|&v| v as usize).collect::<Vec<_>>(), c);

        let matrix = sparse_jacobian(&problem, &x);
        for (k, (&row, &col)) in r.iter().zip(&c).enumerate() {
            assert_eq!(matrix.get(row, col).copied(), Some(values[k]), "entry {k}");
        }
    }

    #[test]
    fn test_mass_balance_values() {
        let problem = problem();
        let x = vec![0.4, 0.65, 0.35, 1.0, 0.6, 0.2, 0.8];
        let values = jacobian_values(&problem, &x);
        let (rows, cols) = jacobian_sparsity(&problem);

        let mass_row = problem
            .catalogue()
            .rows()
            .iter()
            .position(|r| matches!(r.kind, ConstraintKind::MassBalance { .. }))
            .unwrap();
        let entries: Vec<(usize, f64)> = rows
            .iter()
            .zip(&cols)
            .zip(&values)
            .filter(|((r, _), _)| **r == mass_row)
            .map(|((_, c), v)| (*c, *v))
            .collect();

        // phase fractions first: x_NI in FCC_A1, then in LIQUID
        assert_eq!(entries[0].0, 0);
        assert!((entries[0].1 - 0.35).abs() < 1e-12);
        assert_eq!(entries[1].0, 4);
        assert!((entries[1].1 - 0.8).abs() < 1e-12);
        // f_p d x_NI / d y_NI = f_p (1 - x_NI) for one sublattice with unit atoms
        assert_eq!(entries[2].0, 2);
        assert!((entries[2].1 - 0.4 * 0.65).abs() < 1e-12);
        assert_eq!(entries[3].0, 6);
        assert!((entries[3].1 - 0.6 * 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_reported_entries_match_finite_difference() {
        let problem = problem();
        let x = vec![0.4, 0.65, 0.35, 1.0, 0.6, 0.2, 0.8];
        let values = jacobian_values(&problem, &x);
        let h = 1e-7;

        for (entry, value) in problem.catalogue().entries().zip(&values) {
            let mut xp = x.clone();
            let mut xm = x.clone();
            xp[entry.col] += h;
            xm[entry.col] -= h;
            let fd = (problem.constraints(&xp)[entry.row] - problem.constraints(&xm)[entry.row])
                / (2.0 * h);
            assert!(
                (fd - value).abs() < 1e-6,
                "row {} col {}: analytic {value}, finite difference {fd}",
                entry.row,
                entry.col
            );
        }
    }

    #[test]
    fn test_wrong_buffer_length_is_rejected() {
        let problem = GibbsProblem::new(&two_phase_database(), &liquid_conditions(0.3)).unwrap();
        let mut rows = vec![0usize; 1];
        let mut cols = vec![0usize; 1];
        assert!(!describe_sparsity(&problem, &mut rows, &mut cols));
        let mut values = vec![0.0; 7];
        assert!(!fill_values(&problem, &[1.0, 0.5, 0.5], &mut values));
    }
}
