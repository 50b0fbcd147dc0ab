//! Small Cu-Ni fixtures shared by unit and integration tests.

use gibbs_core::{
    Database, EvalConditions, Parameter, ParameterKind, Phase, PhaseStatus, PiecewiseFunction,
    PowerTerm, Sublattice, TemperatureRange,
};

fn range(low: f64, high: f64, a: f64, b: f64, c: f64) -> TemperatureRange {
    TemperatureRange {
        low,
        high,
        a,
        b,
        c,
        ..TemperatureRange::constant(0.0)
    }
}

fn strings(species: &[&str]) -> Vec<String> {
    species.iter().map(|s| s.to_string()).collect()
}

fn g_liquid_cu() -> PiecewiseFunction {
    PiecewiseFunction::new(vec![
        TemperatureRange {
            d: -0.00265684,
            e: 1.29223e-7,
            f: 52478.0,
            ..range(298.15, 1357.77, 5194.278, 120.973331, -24.112392)
        },
        range(1357.77, 3200.0, -46.545, 173.881484, -31.38),
    ])
}

fn g_liquid_ni() -> PiecewiseFunction {
    PiecewiseFunction::new(vec![
        TemperatureRange {
            d: -0.0048407,
            extra: vec![PowerTerm {
                coefficient: -3.82318e-21,
                power: 7.0,
            }],
            ..range(298.15, 1728.0, 11235.527, 108.457, -22.096)
        },
        range(1728.0, 3000.0, -9549.775, 268.598, -43.1),
    ])
}

fn g_fcc_cu() -> PiecewiseFunction {
    PiecewiseFunction::new(vec![
        TemperatureRange {
            d: -0.00265684,
            e: 1.29223e-7,
            f: 52478.0,
            ..range(298.15, 1357.77, -7770.458, 130.485235, -24.112392)
        },
        TemperatureRange {
            extra: vec![PowerTerm {
                coefficient: 3.64167e29,
                power: -9.0,
            }],
            ..range(1357.77, 3200.0, -13542.026, 183.803828, -31.38)
        },
    ])
}

fn g_fcc_ni() -> PiecewiseFunction {
    PiecewiseFunction::new(vec![
        TemperatureRange {
            d: -0.0048407,
            ..range(298.15, 1728.0, -5179.159, 117.854, -22.096)
        },
        TemperatureRange {
            extra: vec![PowerTerm {
                coefficient: 1.12754e31,
                power: -9.0,
            }],
            ..range(1728.0, 3000.0, -27840.655, 279.135, -43.1)
        },
    ])
}

fn linear(a: f64, b: f64) -> PiecewiseFunction {
    PiecewiseFunction::new(vec![range(298.15, 6000.0, a, b, 0.0)])
}

/// LIQUID (CU,NI)1 and FCC_A1 (CU,NI)1 (VA)1 with reference and
/// Redlich-Kister parameters.
pub fn two_phase_database() -> Database {
    let cu_ni = vec![strings(&["CU", "NI"])];
    Database::new()
        .with_phase(Phase::new("LIQUID").with_sublattice(Sublattice::new(1.0, ["CU", "NI"])))
        .with_phase(
            Phase::new("FCC_A1")
                .with_sublattice(Sublattice::new(1.0, ["CU", "NI"]))
                .with_sublattice(Sublattice::new(1.0, ["VA"])),
        )
        .with_parameter(Parameter::new(
            "LIQUID",
            ParameterKind::G,
            vec![strings(&["CU"])],
            0,
            g_liquid_cu(),
        ))
        .with_parameter(Parameter::new(
            "LIQUID",
            ParameterKind::G,
            vec![strings(&["NI"])],
            0,
            g_liquid_ni(),
        ))
        .with_parameter(Parameter::new(
            "LIQUID",
            ParameterKind::L,
            cu_ni.clone(),
            0,
            linear(11760.0, 1.084),
        ))
        .with_parameter(Parameter::new(
            "LIQUID",
            ParameterKind::L,
            cu_ni,
            1,
            linear(-1671.8, 0.0),
        ))
        .with_parameter(Parameter::new(
            "FCC_A1",
            ParameterKind::G,
            vec![strings(&["CU"]), strings(&["VA"])],
            0,
            g_fcc_cu(),
        ))
        .with_parameter(Parameter::new(
            "FCC_A1",
            ParameterKind::G,
            vec![strings(&["NI"]), strings(&["VA"])],
            0,
            g_fcc_ni(),
        ))
        .with_parameter(Parameter::new(
            "FCC_A1",
            ParameterKind::L,
            vec![strings(&["CU", "NI"]), strings(&["VA"])],
            0,
            linear(8047.72, 3.42217),
        ))
        .with_parameter(Parameter::new(
            "FCC_A1",
            ParameterKind::L,
            vec![strings(&["CU", "NI"]), strings(&["VA"])],
            1,
            linear(-2041.3, 0.99714),
        ))
}

/// CU-NI-VA at 1400 K with both phases entered and X(NI) = 0.3.
pub fn binary_conditions() -> EvalConditions {
    EvalConditions::new(1400.0)
        .with_element("CU")
        .with_element("NI")
        .with_element("VA")
        .with_phase("FCC_A1", PhaseStatus::Entered)
        .with_phase("LIQUID", PhaseStatus::Entered)
        .with_mole_fraction("NI", 0.3)
}

/// Liquid only at 1800 K with X(NI) = `x_ni`.
pub fn liquid_conditions(x_ni: f64) -> EvalConditions {
    EvalConditions::new(1800.0)
        .with_element("CU")
        .with_element("NI")
        .with_element("VA")
        .with_phase("LIQUID", PhaseStatus::Entered)
        .with_phase("FCC_A1", PhaseStatus::Suspended)
        .with_mole_fraction("NI", x_ni)
}
