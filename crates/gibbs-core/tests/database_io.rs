use std::fs;

use gibbs_core::{Database, EvalConditions, ParameterKind, PhaseStatus};
use tempfile::tempdir;

const FE_CR: &str = r#"
[phases.BCC_A2]
sublattices = [
    { stoichiometry = 1.0, species = ["CR", "FE"] },
    { stoichiometry = 3.0, species = ["VA"] },
]

[phases.SIGMA]
sublattices = [
    { stoichiometry = 8.0, species = ["FE"] },
    { stoichiometry = 4.0, species = ["CR"] },
    { stoichiometry = 18.0, species = ["CR", "FE"] },
]

[[parameters]]
phase = "BCC_A2"
kind = "G"
constituents = [["FE"], ["VA"]]
value = [
    { low = 298.15, high = 1811.0, a = 1225.7, b = 124.134, c = -23.5143, d = -0.00439752, e = -5.8927e-8, f = 77359.0 },
    { low = 1811.0, high = 6000.0, a = -25383.581, b = 299.31255, c = -46.0, extra = [{ coefficient = 2.29603e31, power = -9.0 }] },
]

[[parameters]]
phase = "BCC_A2"
kind = "L"
constituents = [["CR", "FE"], ["VA"]]
order = 0
value = [{ a = 20500.0, b = -9.68 }]
"#;

#[test]
fn load_toml_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fecr.toml");
    fs::write(&path, FE_CR).unwrap();

    let db = Database::from_path(&path).expect("database should load");
    assert_eq!(db.phases.len(), 2);
    let names: Vec<_> = db.phases.keys().cloned().collect();
    assert_eq!(names, vec!["BCC_A2", "SIGMA"], "phases iterate in name order");
    assert_eq!(db.parameters.of_kind("BCC_A2", ParameterKind::G).count(), 1);
}

#[test]
fn high_temperature_range_uses_extra_terms() {
    let db = Database::from_toml_str(FE_CR).unwrap();
    let g = &db.parameters.parameters[0].value;
    let t: f64 = 2000.0;
    let expected = -25383.581 + 299.31255 * t - 46.0 * t * t.ln() + 2.29603e31 * t.powf(-9.0);
    assert!((g.value_at(t) - expected).abs() < 1e-6, "got {}", g.value_at(t));
}

#[test]
fn toml_round_trip_preserves_database() {
    let db = Database::from_toml_str(FE_CR).unwrap();
    let text = db.to_toml_string().unwrap();
    let again = Database::from_toml_str(&text).unwrap();
    assert_eq!(db, again);
}

#[test]
fn json_extension_selects_json_parser() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cu.json");
    fs::write(
        &path,
        r#"{
            "phases": {
                "FCC_A1": { "sublattices": [ { "stoichiometry": 1.0, "species": ["CU", "NI"] } ] }
            },
            "parameters": [
                { "phase": "FCC_A1", "kind": "L", "constituents": [["CU", "NI"]], "order": 0,
                  "value": [ { "low": 298.15, "high": 3000.0, "a": 8047.72, "b": 3.42217 } ] }
            ]
        }"#,
    )
    .unwrap();

    let db = Database::from_path(&path).unwrap();
    assert_eq!(db.phase("FCC_A1").unwrap().sublattices[0].species.len(), 2);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = Database::from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("I/O error"), "got {err}");
}

#[test]
fn conditions_reference_database_phases() {
    let db = Database::from_toml_str(FE_CR).unwrap();
    let conditions = EvalConditions::new(1200.0)
        .with_element("CR")
        .with_element("FE")
        .with_element("VA")
        .with_phase("BCC_A2", PhaseStatus::Entered)
        .with_phase("SIGMA", PhaseStatus::Entered)
        .with_mole_fraction("CR", 0.45);
    assert!(conditions.validate().is_ok());
    assert!(conditions.entered_phases().all(|p| db.phase(p).is_some()));
}
