//! Integration tests for the `dex` binary.
//!
//! These tests run the CLI against snapshot files in temporary directories.
//! HOME and the config search variables point into the temp dir so no real
//! user configuration is read or written.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Fixtures
// =============================================================================

const SNAPSHOT: &str = r#"{
  "libraries": [
    {
      "name": "Travel",
      "namespace": "http://example.com/travel",
      "members": [
        {
          "kind": "business_object",
          "name": "Profile",
          "facets": {
            "summary": [
              { "kind": "attribute", "name": "code", "type": "xsd:string", "mandatory": true }
            ],
            "detail": [
              { "kind": "element", "name": "Address", "type": "Address" }
            ]
          },
          "aliases": ["Traveler"]
        },
        { "kind": "core_object", "name": "Address" },
        { "kind": "closed_enumeration", "name": "Status", "values": ["Active", "Closed"] }
      ]
    },
    {
      "name": "Common",
      "namespace": "http://example.com/common",
      "status": "final",
      "members": [
        { "kind": "core_object", "name": "Party" }
      ]
    }
  ]
}"#;

/// Temp dir holding a snapshot and an isolated home directory.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        fs::create_dir_all(dir.path().join("home")).unwrap();
        fs::write(dir.path().join("model.json"), SNAPSHOT).unwrap();
        Self { dir }
    }

    fn snapshot(&self) -> PathBuf {
        self.dir.path().join("model.json")
    }

    fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    /// A `dex` command isolated from the real environment.
    fn dex(&self) -> Command {
        let mut cmd = Command::cargo_bin("dex").unwrap();
        cmd.env("HOME", self.home())
            .env("XDG_CONFIG_HOME", self.home().join(".config"))
            .env_remove("DEX_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    /// `dex <command> <snapshot> <args...>`
    fn on_snapshot(&self, command: &str, args: &[&str]) -> Command {
        let mut cmd = self.dex();
        cmd.arg(command).arg(self.snapshot()).args(args);
        cmd
    }
}

// =============================================================================
// Basics
// =============================================================================

#[test]
fn version_flag_works() {
    Sandbox::new()
        .dex()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dex"));
}

#[test]
fn missing_snapshot_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .dex()
        .args(["tree", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read snapshot"));
}

#[test]
fn malformed_snapshot_fails() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.snapshot(), r#"{ "libraries": [ { "name": "X" } ] }"#).unwrap();
    sandbox
        .on_snapshot("verify", &[])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// =============================================================================
// Inspection
// =============================================================================

#[test]
fn tree_lists_libraries_with_editability() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot("tree", &[])
        .assert()
        .success()
        .stdout(predicate::str::contains("Travel 1.0.0 (editable)"))
        .stdout(predicate::str::contains("Common 1.0.0 (read-only)"))
        .stdout(predicate::str::contains("XMLSchema"))
        .stdout(predicate::str::contains("code [Attribute] * -> string"))
        .stdout(predicate::str::contains("Profile [Business Object]"));
}

#[test]
fn tree_can_hide_builtins() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot("tree", &["--no-builtins"])
        .assert()
        .success()
        .stdout(predicate::str::contains("XMLSchema").not());
}

#[test]
fn where_used_lists_users() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot("where-used", &["Address"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile\tProfile [Business Object]"));
}

#[test]
fn where_used_reports_unused_provider() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot("where-used", &["Status"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Status is not used"));
}

#[test]
fn unknown_key_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot("actions", &["Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No object with key 'Nope'"));
}

#[test]
fn actions_show_enabled_and_refused() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot("actions", &["Profile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(manager: full)"))
        .stdout(predicate::str::contains("add-property"))
        .stdout(predicate::str::contains("enabled (needs a property kind)"))
        .stdout(predicate::str::is_match(r"delete-alias\s+refused").unwrap());
}

#[test]
fn actions_on_final_library_are_refused() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot("actions", &["Party"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(manager: read-only)"))
        .stdout(predicate::str::contains("enabled").not());
}

// =============================================================================
// Running Actions
// =============================================================================

#[test]
fn run_prints_events_as_json() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .on_snapshot("run", &["add-property", "Profile", "--param", "attribute"])
        .assert()
        .success()
        .stderr(predicate::str::contains("created newAttribute [Attribute]"))
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["kind"], "child_added");
}

#[test]
fn run_quiet_prints_only_events() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot(
            "run",
            &["set-description", "Profile", "--param", "A traveler", "--quiet"],
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("documentation_change"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn run_assigns_provider_by_key() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot(
            "run",
            &["assign-type", "Profile.code", "--param", "xsd:string"],
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("type_change"));
}

#[test]
fn run_refused_action_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot("run", &["set-description", "Party", "--param", "doc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("set-description on 'Party' was refused"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn run_missing_parameter_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot("run", &["set-name", "Profile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("was refused"));
}

#[test]
fn run_unknown_action_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot("run", &["explode", "Profile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown action 'explode'"));
}

#[test]
fn managed_library_needs_the_lock_holder() {
    let sandbox = Sandbox::new();
    let managed = SNAPSHOT.replace(
        r#""namespace": "http://example.com/travel","#,
        r#""namespace": "http://example.com/travel", "managed": true, "locked_by": "bob","#,
    );
    fs::write(sandbox.snapshot(), managed).unwrap();

    sandbox
        .on_snapshot("run", &["set-description", "Profile", "--param", "doc"])
        .assert()
        .failure();
    sandbox
        .on_snapshot(
            "run",
            &["set-description", "Profile", "--param", "doc", "--user", "bob"],
        )
        .assert()
        .success();
}

#[test]
fn snapshot_is_never_written_back() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot("run", &["delete-alias", "Profile@Traveler"])
        .assert()
        .success()
        .stdout(predicate::str::contains("child_deleted"));
    assert_eq!(fs::read_to_string(sandbox.snapshot()).unwrap(), SNAPSHOT);
}

// =============================================================================
// Verification
// =============================================================================

#[test]
fn verify_reports_ok() {
    let sandbox = Sandbox::new();
    sandbox
        .on_snapshot("verify", &[])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ok ("));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn config_list_shows_defaults() {
    let sandbox = Sandbox::new();
    sandbox
        .dex()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user = (unset)"))
        .stdout(predicate::str::contains("history_limit = 50"))
        .stdout(predicate::str::contains("actions.minor_version_additions = true"));
}

#[test]
fn config_set_writes_home_config() {
    let sandbox = Sandbox::new();
    sandbox
        .dex()
        .args(["config", "set", "history_limit", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set history_limit = 10"));

    let written = sandbox.home().join(".dex/config.toml");
    assert!(written.exists());
    assert!(fs::read_to_string(&written).unwrap().contains("history_limit = 10"));

    sandbox
        .dex()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("history_limit = 10"));
    sandbox
        .dex()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".dex/config.toml"))
        .stdout(predicate::str::contains("not present").not());
}

#[test]
fn config_set_rejects_invalid_values() {
    let sandbox = Sandbox::new();
    sandbox
        .dex()
        .args(["config", "set", "history_limit", "0"])
        .assert()
        .failure();
    sandbox
        .dex()
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key: colour"));
    assert!(!sandbox.home().join(".dex/config.toml").exists());
}

#[test]
fn configured_user_acts_as_lock_holder() {
    let sandbox = Sandbox::new();
    let managed = SNAPSHOT.replace(
        r#""namespace": "http://example.com/travel","#,
        r#""namespace": "http://example.com/travel", "managed": true, "locked_by": "bob","#,
    );
    fs::write(sandbox.snapshot(), managed).unwrap();
    let config = sandbox.dir.path().join("dex.toml");
    fs::write(&config, "user = \"bob\"\n").unwrap();

    sandbox
        .on_snapshot("run", &["set-description", "Profile", "--param", "doc"])
        .env("DEX_CONFIG", &config)
        .assert()
        .success();
}
