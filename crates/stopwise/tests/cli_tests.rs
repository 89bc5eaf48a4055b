use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// `stopwise` running inside `dir` with no credentials from the environment
fn stopwise_cmd(dir: &TempDir) -> Command {
  let mut cmd = Command::cargo_bin("stopwise").expect("binary exists");
  cmd.current_dir(dir.path()).env_remove("STOPWISE_API_KEY").env_remove("RUST_LOG");
  cmd
}

fn write(dir: &TempDir, name: &str, content: &str) {
  fs::write(dir.path().join(name), content).unwrap();
}

const STOPS_CSV: &str = "description,latitude,longitude,type
Depot,52.50,13.40,Registrierung
North,52.60,13.40,Erstbestellung
East,52.50,13.60,Foo
";

#[test]
fn test_plan_without_route_prints_markers() {
  let temp = TempDir::new().unwrap();
  write(&temp, "stops.csv", STOPS_CSV);

  let output = stopwise_cmd(&temp).args(["plan", "stops.csv", "--no-route"]).output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let stops = report["route"]["stops"].as_array().unwrap();
  assert_eq!(stops.len(), 3);
  assert_eq!(stops[0]["description"], "Depot");
  assert_eq!(stops[0]["color"], "red");
  assert_eq!(stops[2]["color"], "gray");
  assert_eq!(report["route"]["legs"], serde_json::json!([]));
  assert_eq!(report["diagnostics"], serde_json::json!([]));
}

#[test]
fn test_plan_without_api_key_uses_heuristic_route() {
  let temp = TempDir::new().unwrap();
  write(&temp, "stops.csv", STOPS_CSV);

  stopwise_cmd(&temp)
    .args(["plan", "stops.csv", "--pretty"])
    .assert()
    .success()
    .stdout(contains("\"source\": \"heuristic\"").and(contains("route_heuristic")))
    .stderr(contains("nearest-neighbour"));
}

#[test]
fn test_verbose_plan_lists_stops_in_visiting_order() {
  let temp = TempDir::new().unwrap();
  write(&temp, "stops.csv", STOPS_CSV);

  stopwise_cmd(&temp)
    .args(["plan", "stops.csv", "--no-route", "--verbose"])
    .assert()
    .success()
    .stderr(contains("1. Depot (52.5, 13.4) [red]").and(contains("3. East")));
}

#[test]
fn test_plan_reads_json_tables() {
  let temp = TempDir::new().unwrap();
  write(
    &temp,
    "stops.json",
    r#"[{"description":"A","latitude":52.1,"longitude":13.1,"type":"Registrierung"}]"#,
  );

  stopwise_cmd(&temp)
    .args(["plan", "stops.json"])
    .assert()
    .success()
    .stdout(contains("\"color\":\"red\""));
}

#[test]
fn test_plan_writes_output_file() {
  let temp = TempDir::new().unwrap();
  write(&temp, "stops.csv", STOPS_CSV);

  stopwise_cmd(&temp)
    .args(["plan", "stops.csv", "--no-route", "--output", "route.json"])
    .assert()
    .success()
    .stderr(contains("route.json"));

  let report = fs::read_to_string(temp.path().join("route.json")).unwrap();
  assert!(report.contains("\"stop_index\":3"));
}

#[test]
fn test_missing_location_columns_is_fatal() {
  let temp = TempDir::new().unwrap();
  write(&temp, "stops.csv", "description,type\nA,Registrierung\n");

  stopwise_cmd(&temp)
    .args(["plan", "stops.csv"])
    .assert()
    .failure()
    .stdout(contains("invalid_input"))
    .stderr(contains("'latitude+longitude' or 'address'"));
}

#[test]
fn test_addresses_without_api_key_are_fatal() {
  let temp = TempDir::new().unwrap();
  write(&temp, "stops.csv", "description,address\nA,Hauptstr. 1\n");

  stopwise_cmd(&temp)
    .args(["plan", "stops.csv", "--no-route"])
    .assert()
    .failure()
    .stdout(contains("resolver_unavailable"))
    .stderr(contains("no API key configured"));
}

#[test]
fn test_invalid_coordinate_is_fatal() {
  let temp = TempDir::new().unwrap();
  write(&temp, "stops.csv", "latitude,longitude\n95.0,13.4\n");

  stopwise_cmd(&temp)
    .args(["plan", "stops.csv"])
    .assert()
    .failure()
    .stderr(contains("'95.0' is not a valid latitude"));
}

#[test]
fn test_missing_table_file() {
  let temp = TempDir::new().unwrap();

  stopwise_cmd(&temp)
    .args(["plan", "absent.csv"])
    .assert()
    .failure()
    .stdout(contains("invalid_input"))
    .stderr(contains("Failed to read table").and(contains("absent.csv")));
}

#[test]
fn test_colors_uses_config_from_working_directory() {
  let temp = TempDir::new().unwrap();
  write(
    &temp,
    ".stopwise.json",
    r#"{"categories":{"colors":{"Besuch":"blue"},"default_color":"black"}}"#,
  );

  stopwise_cmd(&temp)
    .arg("colors")
    .assert()
    .success()
    .stdout(contains("Besuch").and(contains("blue")).and(contains("black")))
    .stdout(contains("Registrierung").not());
}

#[test]
fn test_colors_defaults() {
  let temp = TempDir::new().unwrap();

  stopwise_cmd(&temp)
    .arg("colors")
    .assert()
    .success()
    .stdout(contains("Registrierung").and(contains("red")).and(contains("gray")));
}

#[test]
fn test_invalid_config_is_reported() {
  let temp = TempDir::new().unwrap();
  write(&temp, "custom.json", r#"{"routing":{"timeout_secs":0}}"#);

  stopwise_cmd(&temp)
    .args(["colors", "--config", "custom.json"])
    .assert()
    .failure()
    .stderr(contains("routing.timeout_secs"));
}
