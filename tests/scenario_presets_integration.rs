use std::process::{Command, Output};

#[derive(Debug)]
struct Summary {
    npv: f64,
    total_saving: f64,
}

#[test]
fn scenario_files_run_via_cli_and_differ() {
    let baseline = run_and_parse_summary(&["--scenario", "scenarios/baseline.toml"]);
    let grandfathered = run_and_parse_summary(&["--scenario", "scenarios/grandfathered.toml"]);
    let expiring = run_and_parse_summary(&["--scenario", "scenarios/expiring_credits.toml"]);

    assert!(
        grandfathered.total_saving > baseline.total_saving,
        "expected grandfathered savings above baseline: grandfathered={:.2}, baseline={:.2}",
        grandfathered.total_saving,
        baseline.total_saving
    );
    assert!(
        (baseline.npv - expiring.npv).abs() > 1.0,
        "expected baseline and expiring_credits NPV to differ: baseline={:.2}, expiring={:.2}",
        baseline.npv,
        expiring.npv
    );
}

#[test]
fn baseline_file_matches_baseline_preset() {
    let from_file = run_and_parse_summary(&["--scenario", "scenarios/baseline.toml"]);
    let from_preset = run_and_parse_summary(&["--preset", "baseline"]);
    assert_eq!(from_file.npv, from_preset.npv);
    assert_eq!(from_file.total_saving, from_preset.total_saving);
}

#[test]
fn json_report_has_stable_fields() {
    let output = run(&["run", "--preset", "baseline", "--horizon", "10", "--json"]);
    assert_success(&output, "run --json");
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");

    assert_eq!(report["tariff_id"], "light");
    assert_eq!(report["horizon_years"], 10);
    assert_eq!(report["payback_year"], 1);
    assert_eq!(report["irr_converged"], false);
    assert_eq!(report["years"].as_array().map(Vec::len), Some(10));
    assert_eq!(report["years"][0]["months"].as_array().map(Vec::len), Some(12));
    let npv = report["npv"].as_f64().expect("npv is a number");
    assert!((npv - 1_997_315.59).abs() < 0.01, "unexpected npv {npv}");
}

#[test]
fn unknown_preset_fails_with_message() {
    let output = run(&["run", "--preset", "nonexistent"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown preset"), "stderr: {stderr}");
}

#[test]
fn unknown_tariff_lists_known_ids() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("scenario.toml");
    std::fs::write(
        &path,
        "[system]\ncost = 1000.0\nmonthly_consumption_kwh = 300.0\n\
         monthly_generation_kwh = 250.0\n\n[tariff]\nid = \"cemig\"\n",
    )
    .expect("write scenario");

    let output = run(&["run", "--scenario", path.to_str().expect("utf-8 path")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    for id in ["cemig", "ceral", "enel-rj", "light"] {
        assert!(stderr.contains(id), "stderr should mention {id}: {stderr}");
    }
}

#[test]
fn tariffs_lists_builtin_registry() {
    let output = run(&["tariffs"]);
    assert_success(&output, "tariffs");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let ids: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(ids, ["ceral", "enel-rj", "light"]);
}

#[test]
fn heating_sizes_household_file() {
    let output = run(&["heating", "--input", "scenarios/household_heating.toml"]);
    assert_success(&output, "heating");
    let stdout = String::from_utf8_lossy(&output.stdout);
    // 280 shower + 80 washbasin + 100 kitchen + 50 washing machine, 1.5 days of storage
    assert!(stdout.contains("Daily demand: 510.00 L"), "stdout: {stdout}");
    assert!(stdout.contains("Boiler: 800 L"), "stdout: {stdout}");
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_solar-viability"))
        .args(args)
        .env_remove("SOLAR_VIABILITY_LOG_LEVEL")
        .output()
        .expect("solar-viability process should run")
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{what} failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn run_and_parse_summary(run_args: &[&str]) -> Summary {
    let mut args = vec!["run"];
    args.extend_from_slice(run_args);
    let output = run(&args);
    assert_success(&output, &args.join(" "));

    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    Summary {
        npv: parse_metric(&stdout, "NPV:"),
        total_saving: parse_metric(&stdout, "Total saving:"),
    }
}

fn parse_metric(stdout: &str, label: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing report line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid report format for line `{line}`"));

    raw.parse::<f64>()
        .unwrap_or_else(|_| panic!("invalid numeric value in line `{line}`"))
}
