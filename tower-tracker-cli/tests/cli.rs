use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const REPORT: &str = "Battle Report
Battle Date\tNov 20, 2025 14:35
Real Time\t7h 46m 6s
Tier\t11
Wave\t5,012
Coins earned\t43.91T
Cells Earned\t12.5K
Coins From Death Wave\t20T
";

const CSV: &str = "Tier,Wave,Coins earned,Real Time,Battle Date
11,5012,43.91T,7h 46m 6s,\"Nov 20, 2025 14:35\"
12+,900,1.1T,1h 2m,\"Nov 22, 2025 18:30\"
";

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "tower-tracker-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn write_input(label: &str, contents: &str) -> PathBuf {
    let path = temp_path(label);
    std::fs::write(&path, contents).expect("write input");
    path
}

fn run(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tower-tracker"))
        .env("NO_COLOR", "1")
        .arg("--store")
        .arg(store)
        .args(args)
        .output()
        .expect("run cli")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

#[test]
fn import_then_json_stats() {
    let store = temp_path("store-stats");
    let input = write_input("report", REPORT);
    let output = run(&store, &["import", path_str(&input)]);
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Added: 1"));

    let report_path = temp_path("stats-json");
    let output = run(
        &store,
        &["stats", "--report", "json", "--output", path_str(&report_path)],
    );
    assert!(output.status.success(), "{output:?}");
    let content = std::fs::read_to_string(&report_path).expect("read report");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(value["runCount"], 1);
    assert_eq!(value["tiers"][0], 11);
    assert_eq!(
        value["latestBreakdown"]["sources"][0]["key"],
        "coinsFromDeathWave"
    );
}

#[test]
fn csv_import_skips_duplicates_and_exports() {
    let store = temp_path("store-csv");
    let input = write_input("csv", CSV);

    let first = run(&store, &["import", "--csv", path_str(&input)]);
    assert!(first.status.success(), "{first:?}");
    assert!(String::from_utf8_lossy(&first.stdout).contains("Added: 2"));

    let second = run(&store, &["import", "--csv", path_str(&input)]);
    assert!(second.status.success(), "{second:?}");
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("Added: 0"), "{stdout}");
    assert!(stdout.contains("Skipped duplicates: 2"), "{stdout}");

    let export_path = temp_path("export");
    let output = run(&store, &["export", "--output", path_str(&export_path)]);
    assert!(output.status.success(), "{output:?}");
    let exported = std::fs::read_to_string(&export_path).expect("read export");
    assert!(exported.starts_with("Date,Time,Run Type,Tier,Wave,Coins earned"));
    assert_eq!(exported.lines().count(), 3);
    assert!(exported.contains("12+"));
}

#[test]
fn check_flags_european_input_until_settings_change() {
    let store = temp_path("store-check");
    let input = write_input(
        "european",
        "Battle Date\tnov. 20, 2025 14:35\nTier\t9\nCoins earned\t43,91T\n",
    );

    let output = run(&store, &["check", path_str(&input)]);
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("as decimal separator"), "{stdout}");
    assert!(stdout.contains("dates look like month-first-lowercase"), "{stdout}");

    let output = run(
        &store,
        &[
            "settings",
            "--decimal",
            "comma",
            "--thousands",
            "period",
            "--date-format",
            "month-first-lowercase",
            "--locale",
            "de",
        ],
    );
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Locale: Deutsch (de)"));

    let output = run(&store, &["check", path_str(&input)]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("matches the configured import format"));
}

#[test]
fn missing_input_fails() {
    let store = temp_path("store-missing");
    let output = run(&store, &["import", "/definitely/not/here.txt"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}
