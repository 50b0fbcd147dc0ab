//! End-to-end tests of the `gibbs` binary.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const CU_NI: &str = r#"
[phases.LIQUID]
sublattices = [{ stoichiometry = 1.0, species = ["CU", "NI"] }]

[[parameters]]
phase = "LIQUID"
kind = "G"
constituents = [["CU"]]
value = [{ low = 298.15, high = 3200.0, a = -46.545, b = 173.881484, c = -31.38 }]

[[parameters]]
phase = "LIQUID"
kind = "G"
constituents = [["NI"]]
value = [{ low = 298.15, high = 3000.0, a = -9549.775, b = 268.598627, c = -43.1 }]

[[parameters]]
phase = "LIQUID"
kind = "L"
constituents = [["CU", "NI"]]
order = 0
value = [{ a = 11760.0, b = 1.084 }]
"#;

const RUN: &str = r#"
[conditions]
temperature = 1800.0
elements = ["CU", "NI"]
phases = { LIQUID = "entered" }
mole_fractions = { NI = 0.3 }

[solver]
tolerance = 1e-7
"#;

fn write_inputs(dir: &Path) -> (String, String) {
    let database = dir.join("cu-ni.toml");
    let run = dir.join("run.toml");
    fs::write(&database, CU_NI).unwrap();
    fs::write(&run, RUN).unwrap();
    (
        database.to_str().unwrap().to_string(),
        run.to_str().unwrap().to_string(),
    )
}

#[test]
fn inspect_prints_problem_sizes() {
    let tmp = tempdir().unwrap();
    let (database, run) = write_inputs(tmp.path());

    let mut cmd = cargo_bin_cmd!("gibbs");
    cmd.args(["inspect", "--database", &database, "--run", &run])
        .assert()
        .success()
        .stdout(predicate::str::contains("LIQUID_0_NI"))
        .stdout(predicate::str::contains("mass balance X(NI) = 0.3"));
}

#[test]
fn solve_writes_json_result() {
    let tmp = tempdir().unwrap();
    let (database, run) = write_inputs(tmp.path());
    let out = tmp.path().join("result.json");

    let mut cmd = cargo_bin_cmd!("gibbs");
    cmd.args([
        "solve",
        "--database",
        &database,
        "--run",
        &run,
        "--backend",
        "lbfgs",
        "--format",
        "json",
        "--out",
        out.to_str().unwrap(),
    ])
    .assert()
    .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let y_ni = json["phases"]["LIQUID"]["sublattices"][0]["site_fractions"][1][1]
        .as_f64()
        .unwrap();
    assert!((y_ni - 0.3).abs() < 1e-3, "y_NI = {y_ni}");
}

#[test]
fn unknown_backend_fails() {
    let tmp = tempdir().unwrap();
    let (database, run) = write_inputs(tmp.path());

    let mut cmd = cargo_bin_cmd!("gibbs");
    cmd.args([
        "solve",
        "--database",
        &database,
        "--run",
        &run,
        "--backend",
        "simplex",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown backend"));
}

#[test]
fn missing_database_names_the_file() {
    let tmp = tempdir().unwrap();
    let (_, run) = write_inputs(tmp.path());

    let mut cmd = cargo_bin_cmd!("gibbs");
    cmd.args(["inspect", "--database", "no-such-db.toml", "--run", &run])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-db.toml"));
}
