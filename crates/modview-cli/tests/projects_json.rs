//! Integration tests for `modview projects`.

use serde_json::{json, Value};
use std::path::Path;
use std::process::{Command, Output};

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "modview-cli", "--bin", "modview", "--"]);
    cmd
}

fn write_json(path: &Path, value: &Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn add_project(dir: &Path, name: &str) {
    write_json(&dir.join(name).join("package.json"), &json!({ "name": name }));
    std::fs::create_dir_all(dir.join(name).join("node_modules")).unwrap();
}

fn run(args: &[&str]) -> Output {
    cargo_bin()
        .args(args)
        .env_remove("MODVIEW_CONFIG")
        .output()
        .expect("Failed to run modview")
}

#[test]
fn test_projects_json_rootdir_scan() {
    let dir = tempfile::tempdir().unwrap();
    let work = dir.path().join("work");
    add_project(&work, "zeta");
    add_project(&work, "alpha");
    // Not a project: no node_modules.
    write_json(&work.join("plain").join("package.json"), &json!({}));

    let config = dir.path().join("conf").join("modview.json");
    write_json(
        &config,
        &json!({
            "projects_rootdir": "../work",
            "projects": [{ "name": "pinned", "path": "../work/zeta" }]
        }),
    );

    let output = run(&["--json", "projects", "--config", config.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "Should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: Value = serde_json::from_slice(&output.stdout).expect("Should be valid JSON");
    assert_eq!(json["ok"], true);

    let projects = json["projects"].as_array().unwrap();
    let names: Vec<&str> = projects
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    // Explicit entries first; the rootdir copy of zeta is dropped as a duplicate.
    assert_eq!(names, vec!["pinned", "alpha"]);

    for project in projects {
        let id = project["id"].as_str().unwrap();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(Path::new(project["rootPath"].as_str().unwrap()).is_absolute());
    }
}

#[test]
fn test_projects_ids_are_stable() {
    let dir = tempfile::tempdir().unwrap();
    add_project(dir.path(), "app");
    let config = dir.path().join("modview.json");
    write_json(&config, &json!({ "projects_rootdir": "." }));

    let ids: Vec<Value> = (0..2)
        .map(|_| {
            let output = run(&["--json", "projects", "--config", config.to_str().unwrap()]);
            let json: Value = serde_json::from_slice(&output.stdout).unwrap();
            json["projects"][0]["id"].clone()
        })
        .collect();
    assert_eq!(ids[0], ids[1]);
}

#[test]
fn test_projects_missing_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("missing.json");

    let output = run(&["--json", "projects", "--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));

    let json: Value = serde_json::from_slice(&output.stdout).expect("Should be valid JSON");
    assert_eq!(json["ok"], false);
    assert_eq!(json["code"], "CONFIG_INVALID");
}

#[test]
fn test_projects_empty_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("modview.json");
    write_json(&config, &json!({ "projects": [] }));

    let output = run(&["--json", "projects", "--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["code"], "CONFIG_NO_PROJECTS");
}
