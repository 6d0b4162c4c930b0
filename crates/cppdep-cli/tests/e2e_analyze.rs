//! E2E tests for `cppdep` on a small on-disk C++ project.
//!
//! Covers text, JSON, file, and DOT outputs plus configuration failures.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CONFIG: &str = "\
internal:
  - name: engine
    path: engine
    packages:
      - name: io
        src: [io]
        include: [io]
      - name: net
        src: [net]
        include: [net]
  - name: tools
    path: tools
    packages:
      - name: cli
        src: ['.']
external:
  - name: system
    path: sys
    packages:
      - name: std
        pattern: ['string$', 'vector$']
      - name: posix
        include: [include]
";

fn cppdep_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cppdep"));
    cmd.current_dir(dir);
    cmd.env("CPPDEP_LOG", "error");
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, content).expect("write");
}

fn init_project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    write(root, ".cppdep.yml", CONFIG);
    write(root, "engine/io/file.h", "#include <string>\n");
    write(root, "engine/io/file.cpp", "#include \"file.h\"\n#include <unistd.h>\n");
    write(root, "engine/net/socket.h", "#include \"file.h\"\n");
    write(root, "engine/net/socket.cpp", "#include \"socket.h\"\n#include \"stream.h\"\n");
    write(root, "engine/net/stream.h", "#include \"socket.h\"\n#include <vector>\n");
    write(root, "tools/main.cpp", "#include <socket.h>\n");
    write(root, "sys/include/unistd.h", "");
    dir
}

#[test]
fn text_report_for_every_view() {
    let dir = init_project();
    cppdep_cmd(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "analyzing dependencies among all components ...",
        ))
        .stdout(predicate::str::contains(
            "analyzing dependencies among all packages ...",
        ))
        .stdout(predicate::str::contains(
            "engine.net->engine.io: socket->file\n",
        ))
        .stdout(predicate::str::contains(
            "analyzing dependencies among all package groups ...",
        ))
        .stdout(predicate::str::contains(
            "analyzing dependencies among packages in the specified package group engine ...",
        ))
        .stdout(predicate::str::contains(
            "analyzing dependencies among components in the specified package engine.net ...",
        ))
        .stdout(predicate::str::contains(
            "cycle #0 (2 nodes): socket, stream",
        ))
        .stdout(predicate::str::contains("SUMMARY:"));
}

#[test]
fn listing_flags_show_dependencies() {
    let dir = init_project();
    cppdep_cmd(dir.path())
        .arg("-l")
        .assert()
        .success()
        .stdout(predicate::str::contains("\ttools\n\t\t1. engine\n"));
}

#[test]
fn json_report_is_one_array() {
    let dir = init_project();
    let output = cppdep_cmd(dir.path())
        .arg("--json")
        .output()
        .expect("cppdep should not crash");
    assert!(
        output.status.success(),
        "cppdep failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let names: Vec<&str> = json
        .as_array()
        .expect("array")
        .iter()
        .map(|r| r["name"].as_str().expect("name"))
        .collect();
    assert_eq!(
        names,
        [
            "all_components",
            "all_packages",
            "system",
            "engine",
            "engine_io",
            "engine_net",
            "tools_cli"
        ]
    );

    let net = &json[5];
    assert_eq!(net["summary"]["cycles"], 1);
}

#[test]
fn report_and_graphs_written_to_files() {
    let dir = init_project();
    cppdep_cmd(dir.path())
        .args(["-c", ".cppdep.yml", "-o", "out/report.txt", "--graph-dir", "graphs"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let report = fs::read_to_string(dir.path().join("out/report.txt")).expect("report");
    assert!(report.contains("SUMMARY:"));
    for file in [
        "all_components_orig.dot",
        "all_packages_final.dot",
        "system_orig.dot",
        "system_final.dot",
        "engine_net_cycles.dot",
    ] {
        assert!(dir.path().join("graphs").join(file).is_file(), "{file} written");
    }
    let dot = fs::read_to_string(dir.path().join("graphs/engine_net_orig.dot")).expect("dot");
    assert!(dot.starts_with("digraph"));
}

#[test]
fn missing_config_fails_with_code() {
    let dir = TempDir::new().expect("tempdir");
    cppdep_cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1001]"))
        .stderr(predicate::str::contains(".cppdep.yml"));
}

#[test]
fn unknown_config_key_fails() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        "deps.yml",
        "internal:\n  - name: g\n    path: .\n    packages: [{name: p, sources: [x]}]\n",
    );
    cppdep_cmd(dir.path())
        .args(["--config", "deps.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1002]"));
}

#[test]
fn conflicting_listing_flags_are_rejected() {
    let dir = init_project();
    cppdep_cmd(dir.path())
        .args(["-l", "-L"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn version_flag() {
    Command::new(assert_cmd::cargo::cargo_bin!("cppdep"))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
