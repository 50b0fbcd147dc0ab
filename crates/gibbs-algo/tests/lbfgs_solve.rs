use gibbs_algo::test_utils::{liquid_conditions, two_phase_database};
use gibbs_algo::{select_backend, GibbsProblem, GibbsSolution, SolverConfig};

fn solve_liquid(x_ni: f64) -> GibbsSolution {
    let problem = GibbsProblem::new(&two_phase_database(), &liquid_conditions(x_ni)).unwrap();
    let backend = select_backend(Some("lbfgs")).unwrap();
    let config = SolverConfig {
        tolerance: 1e-7,
        ..SolverConfig::default()
    };
    backend.solve(&problem, &config).unwrap()
}

#[test]
fn liquid_composition_follows_the_target() {
    for x_ni in [0.2, 0.5, 0.75] {
        let solution = solve_liquid(x_ni);
        let overall = solution.overall_mole_fraction("NI");
        assert!(
            (overall - x_ni).abs() < 1e-3,
            "target {x_ni}, got {overall} ({})",
            solution.status
        );
    }
}

#[test]
fn mole_fractions_of_the_final_phase_sum_to_one() {
    let solution = solve_liquid(0.3);
    let liquid = solution.phase("LIQUID").unwrap();
    let fractions = liquid.mole_fractions();
    assert_eq!(fractions.keys().cloned().collect::<Vec<_>>(), vec!["CU", "NI"]);
    let total: f64 = fractions.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn solution_serializes_to_json() {
    let solution = solve_liquid(0.3);
    let json = serde_json::to_string(&solution).unwrap();
    let back: GibbsSolution = serde_json::from_str(&json).unwrap();
    assert_eq!(back.status, solution.status);
    assert_eq!(back.phases.len(), 1);
}
