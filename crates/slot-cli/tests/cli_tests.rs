//! Integration tests for the `slots` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the week,
//! openings and admit subcommands through the actual binary, including
//! stdin piping, file I/O, configuration and error reporting.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Helper: path to the calendar.json fixture.
fn calendar_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/calendar.json")
}

/// Helper: path to the invalid_records.json fixture.
fn invalid_records_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/invalid_records.json")
}

/// Helper: the binary, isolated from any user configuration.
fn slots(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("slots").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .env_remove("RUST_LOG")
        .env_remove("SLOTS_EVENTS_PATH")
        .env_remove("SLOTS_LOG_FILTER");
    cmd
}

/// Helper: run and parse stdout as JSON.
fn run_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout must be JSON")
}

fn slots_of(day: &Value) -> Vec<String> {
    day["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap().to_string())
        .collect()
}

fn write_events(dir: &TempDir, name: &str, json: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, json).unwrap();
    path.display().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// week
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn week_from_file() {
    let home = TempDir::new().unwrap();

    let days = run_json(
        slots(&home).args(["week", "--from", "2014-08-10", "-i", calendar_json_path()]),
    );

    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["date"], "2014-08-10");
    assert!(slots_of(&days[0]).is_empty());
    assert_eq!(days[1]["date"], "2014-08-11");
    assert_eq!(slots_of(&days[1]), ["9:30", "10:00", "11:30", "12:00"]);
    assert_eq!(slots_of(&days[3]), ["14:00", "14:30"]);
    assert_eq!(days[6]["date"], "2014-08-16");
}

#[test]
fn week_from_stdin() {
    let home = TempDir::new().unwrap();
    let input = r#"[{"kind":"opening","starts_at":"2016-05-23T09:30:00","ends_at":"2016-05-23T10:30:00"}]"#;

    let days = run_json(
        slots(&home)
            .args(["week", "--from", "2016-05-20", "-i", "-"])
            .write_stdin(input),
    );

    assert_eq!(slots_of(&days[3]), ["9:30", "10:00"]);
}

#[test]
fn week_to_output_file() {
    let home = TempDir::new().unwrap();
    let output = home.path().join("week.json");

    slots(&home)
        .args(["week", "--from", "2014-08-10", "-i", calendar_json_path(), "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written.as_array().unwrap().len(), 7);
}

#[test]
fn week_without_event_file_is_empty() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("nothing-here.json");

    let days = run_json(
        slots(&home)
            .args(["week", "--from", "2016-05-23", "-i"])
            .arg(&missing),
    );

    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert!(days.iter().all(|d| slots_of(d).is_empty()));
}

#[test]
fn week_defaults_to_today() {
    let home = TempDir::new().unwrap();
    let before = chrono::Local::now().date_naive().to_string();

    let days = run_json(slots(&home).args(["week", "-i", calendar_json_path()]));

    let after = chrono::Local::now().date_naive().to_string();
    let first = days[0]["date"].as_str().unwrap();
    assert!(first == before || first == after, "unexpected first date {first}");
    assert_eq!(days.as_array().unwrap().len(), 7);
}

#[test]
fn week_skips_invalid_records_with_warnings() {
    let home = TempDir::new().unwrap();

    let assert = slots(&home)
        .args(["week", "--from", "2016-05-23", "-i", invalid_records_path()])
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping event"))
        .stderr(predicate::str::contains("lunch-break"))
        .stderr(predicate::str::contains("half-hour boundary"))
        .stderr(predicate::str::contains("Only openings can recur"));

    let days: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(slots_of(&days[0]), ["9:30", "10:00"]);
    assert!(slots_of(&days[1]).is_empty());
}

#[test]
fn week_rejects_bad_from_date() {
    let home = TempDir::new().unwrap();

    slots(&home)
        .args(["week", "--from", "23/05/2016", "-i", calendar_json_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn week_rejects_malformed_event_file() {
    let home = TempDir::new().unwrap();
    let path = write_events(&home, "broken.json", "{ not json");

    slots(&home)
        .args(["week", "--from", "2016-05-23", "-i", path.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid event file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// openings
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn openings_lists_each_opening_without_subtracting_bookings() {
    let home = TempDir::new().unwrap();

    let listing = run_json(
        slots(&home).args(["openings", "--from", "2014-08-10", "-i", calendar_json_path()]),
    );

    let listing = listing.as_array().unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0]["date"], "2014-08-11");
    assert_eq!(
        slots_of(&listing[0]),
        ["9:30", "10:00", "10:30", "11:00", "11:30", "12:00"]
    );
    assert_eq!(listing[1]["date"], "2014-08-13");
}

// ─────────────────────────────────────────────────────────────────────────────
// admit
// ─────────────────────────────────────────────────────────────────────────────

const BOOKED: &str = r#"[{"kind":"appointment","starts_at":"2016-05-23T11:00:00","ends_at":"2016-05-23T11:30:00"}]"#;

#[test]
fn admit_back_to_back_appointment() {
    let home = TempDir::new().unwrap();
    let path = write_events(&home, "events.json", BOOKED);

    let event = run_json(slots(&home).args([
        "admit",
        "--kind",
        "appointment",
        "--starts-at",
        "2016-05-23 11:30",
        "--ends-at",
        "2016-05-23T12:00:00",
        "-i",
        path.as_str(),
    ]));

    assert_eq!(event["kind"], "appointment");
    assert_eq!(event["starts_at"], "2016-05-23T11:30:00");
    assert_eq!(event["id"], 2);
    // Without --save the file is untouched.
    assert_eq!(std::fs::read_to_string(&path).unwrap(), BOOKED);
}

#[test]
fn admit_overlapping_appointment_fails() {
    let home = TempDir::new().unwrap();
    let path = write_events(&home, "events.json", BOOKED);

    slots(&home)
        .args([
            "admit",
            "--kind",
            "appointment",
            "--starts-at",
            "2016-05-23 11:00",
            "--ends-at",
            "2016-05-23 11:15",
            "-i",
            path.as_str(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not admitted"))
        .stderr(predicate::str::contains("overlaps existing appointment #1"));
}

#[test]
fn admit_unknown_kind_fails() {
    let home = TempDir::new().unwrap();
    let path = write_events(&home, "events.json", "[]");

    slots(&home)
        .args([
            "admit",
            "--kind",
            "lunch-break",
            "--starts-at",
            "2016-05-23 12:00",
            "--ends-at",
            "2016-05-23 13:00",
            "-i",
            path.as_str(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown event kind: 'lunch-break'"));
}

#[test]
fn admit_off_grid_opening_fails() {
    let home = TempDir::new().unwrap();
    let path = write_events(&home, "events.json", "[]");

    slots(&home)
        .args([
            "admit",
            "--kind",
            "opening",
            "--starts-at",
            "2016-05-23 09:31",
            "--ends-at",
            "2016-05-23 10:30",
            "-i",
            path.as_str(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("half-hour boundary"));
}

#[test]
fn admit_recurring_appointment_fails() {
    let home = TempDir::new().unwrap();
    let path = write_events(&home, "events.json", "[]");

    slots(&home)
        .args([
            "admit",
            "--kind",
            "appointment",
            "--starts-at",
            "2016-05-23 09:00",
            "--ends-at",
            "2016-05-23 10:00",
            "--weekly-recurring",
            "-i",
            path.as_str(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Only openings can recur weekly"));
}

#[test]
fn admit_save_then_week_reflects_booking() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("events.json");

    for (kind, start, end) in [
        ("opening", "2016-05-23 09:00", "2016-05-23 11:00"),
        ("appointment", "2016-05-23 09:30", "2016-05-23 10:00"),
    ] {
        slots(&home)
            .args(["admit", "--kind", kind, "--starts-at", start, "--ends-at", end, "--save", "-i"])
            .arg(&path)
            .assert()
            .success();
    }

    let stored: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 2);

    let days = run_json(
        slots(&home)
            .args(["week", "--from", "2016-05-23", "-i"])
            .arg(&path),
    );
    assert_eq!(slots_of(&days[0]), ["9:00", "10:00", "10:30"]);
}

#[test]
fn admit_save_keeps_records_skipped_at_load() {
    let home = TempDir::new().unwrap();
    let raw = std::fs::read_to_string(invalid_records_path()).unwrap();
    let path = write_events(&home, "events.json", &raw);

    slots(&home)
        .args([
            "admit",
            "--kind",
            "appointment",
            "--starts-at",
            "2016-05-23 10:00",
            "--ends-at",
            "2016-05-23 10:30",
            "--save",
            "-i",
            path.as_str(),
        ])
        .assert()
        .success();

    let stored: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let stored = stored.as_array().unwrap();
    assert_eq!(stored.len(), 5);
    assert_eq!(stored[1]["kind"], "lunch-break");
    assert_eq!(stored[2]["starts_at"], "2016-05-23T14:31:00");
    assert_eq!(stored[3]["kind"], "appointment");
    assert_eq!(stored[3]["weekly_recurring"], true);
    assert_eq!(stored[4]["kind"], "appointment");
    assert_eq!(stored[4]["starts_at"], "2016-05-23T10:00:00");
}

#[test]
fn admit_save_refuses_stdin() {
    let home = TempDir::new().unwrap();

    slots(&home)
        .args([
            "admit",
            "--kind",
            "opening",
            "--starts-at",
            "2016-05-23 09:00",
            "--ends-at",
            "2016-05-23 10:00",
            "--save",
            "-i",
            "-",
        ])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--save needs an event file"));
}

#[test]
fn admit_rejects_unparseable_datetime() {
    let home = TempDir::new().unwrap();

    slots(&home)
        .args([
            "admit",
            "--kind",
            "opening",
            "--starts-at",
            "tomorrow at nine",
            "--ends-at",
            "2016-05-23 10:00",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid datetime"));
}

// ─────────────────────────────────────────────────────────────────────────────
// configuration & logging
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn config_file_supplies_events_path() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("slots.toml");
    std::fs::write(
        &config,
        format!("events_path = {:?}\n", calendar_json_path()),
    )
    .unwrap();

    let days = run_json(
        slots(&home)
            .args(["week", "--from", "2014-08-10", "--config"])
            .arg(&config),
    );

    assert_eq!(slots_of(&days[1]), ["9:30", "10:00", "11:30", "12:00"]);
}

#[test]
fn environment_supplies_events_path() {
    let home = TempDir::new().unwrap();

    let days = run_json(
        slots(&home)
            .env("SLOTS_EVENTS_PATH", calendar_json_path())
            .args(["week", "--from", "2014-08-10"]),
    );

    assert_eq!(slots_of(&days[3]), ["14:00", "14:30"]);
}

#[test]
fn verbose_logs_to_stderr_and_keeps_stdout_json() {
    let home = TempDir::new().unwrap();

    let assert = slots(&home)
        .args(["-v", "week", "--from", "2014-08-10", "-i", calendar_json_path()])
        .assert()
        .success()
        .stderr(predicate::str::contains("loaded events"));

    let days: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(days.as_array().unwrap().len(), 7);
}

#[test]
fn no_subcommand_shows_usage() {
    let home = TempDir::new().unwrap();

    slots(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
