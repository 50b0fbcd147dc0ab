//! `gibbs inspect`: show how a run maps onto the nonlinear program.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use gibbs_algo::{ConstraintKind, GibbsProblem};
use gibbs_cli::OutputFormat;
use serde::Serialize;
use tabwriter::TabWriter;

use super::{emit, load_problem};

#[derive(Debug, Serialize)]
pub struct VariableRow {
    pub index: usize,
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub start: f64,
}

#[derive(Debug, Serialize)]
pub struct ConstraintSummary {
    pub row: usize,
    pub kind: String,
    pub columns: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub n: usize,
    pub m: usize,
    pub nnz_jac_g: usize,
    pub variables: Vec<VariableRow>,
    pub constraints: Vec<ConstraintSummary>,
}

impl InspectReport {
    pub fn from_problem(problem: &GibbsProblem) -> Self {
        let info = problem.nlp_info();
        let (lower, upper) = problem.variable_bounds();
        let start = problem.initial_point();
        let variables = problem
            .variables()
            .descriptors()
            .iter()
            .enumerate()
            .map(|(index, variable)| VariableRow {
                index,
                name: variable.to_string(),
                lower: lower[index],
                upper: upper[index],
                start: start[index],
            })
            .collect();

        let phase_names = problem.variables().phase_names();
        let constraints = problem
            .catalogue()
            .rows()
            .iter()
            .enumerate()
            .map(|(row, constraint)| ConstraintSummary {
                row,
                kind: match &constraint.kind {
                    ConstraintKind::PhaseFractionBalance => "phase balance".to_string(),
                    ConstraintKind::SiteFractionBalance { phase, sublattice } => {
                        format!("site balance {}:{}", phase_names[*phase], sublattice)
                    }
                    ConstraintKind::MassBalance { species, target } => {
                        format!("mass balance X({species}) = {target}")
                    }
                },
                columns: constraint.entries.iter().map(|e| e.col).collect(),
            })
            .collect();

        Self {
            n: info.n,
            m: info.m,
            nnz_jac_g: info.nnz_jac_g,
            variables,
            constraints,
        }
    }

    pub fn render_plain(&self) -> Result<Vec<u8>> {
        let mut writer = TabWriter::new(Vec::new()).padding(2);
        writeln!(writer, "n\t{}", self.n)?;
        writeln!(writer, "m\t{}", self.m)?;
        writeln!(writer, "nnz_jac_g\t{}", self.nnz_jac_g)?;
        writeln!(writer)?;

        writeln!(writer, "INDEX\tVARIABLE\tLOWER\tUPPER\tSTART")?;
        for v in &self.variables {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{:.6}",
                v.index, v.name, v.lower, v.upper, v.start
            )?;
        }
        writeln!(writer)?;

        writeln!(writer, "ROW\tCONSTRAINT\tCOLUMNS")?;
        for c in &self.constraints {
            let columns: Vec<String> = c.columns.iter().map(|col| col.to_string()).collect();
            writeln!(writer, "{}\t{}\t{}", c.row, c.kind, columns.join(","))?;
        }
        writer.flush()?;
        Ok(writer.into_inner()?)
    }
}

pub fn handle(database: &Path, run: &Path, format: OutputFormat) -> Result<()> {
    let (problem, _) = load_problem(database, run)?;
    let report = InspectReport::from_problem(&problem);
    let rendered = match format {
        OutputFormat::Plain => report.render_plain()?,
        OutputFormat::Json => {
            let mut text = serde_json::to_vec_pretty(&report)?;
            text.push(b'\n');
            text
        }
    };
    emit(&rendered, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gibbs_algo::test_utils::{binary_conditions, two_phase_database};

    #[test]
    fn test_report_covers_every_variable_and_row() {
        let problem = GibbsProblem::new(&two_phase_database(), &binary_conditions()).unwrap();
        let report = InspectReport::from_problem(&problem);

        assert_eq!((report.n, report.m, report.nnz_jac_g), (7, 4, 10));
        assert_eq!(report.variables.len(), 7);
        assert_eq!(report.variables[0].name, "FCC_A1_FRAC");
        assert_eq!(report.constraints[0].kind, "phase balance");
        assert_eq!(report.constraints[1].kind, "site balance FCC_A1:0");
        assert_eq!(report.constraints[3].columns, vec![0, 4, 2, 6]);

        let total: usize = report.constraints.iter().map(|c| c.columns.len()).sum();
        assert_eq!(total, report.nnz_jac_g);
    }

    #[test]
    fn test_plain_rendering() {
        let problem = GibbsProblem::new(&two_phase_database(), &binary_conditions()).unwrap();
        let text =
            String::from_utf8(InspectReport::from_problem(&problem).render_plain().unwrap())
                .unwrap();
        assert!(text.contains("LIQUID_0_NI"));
        assert!(text.contains("mass balance X(NI) = 0.3"));
    }
}
