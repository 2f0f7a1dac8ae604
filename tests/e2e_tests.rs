//! End-to-end tests for pydist CLI
//!
//! These tests verify:
//! - Resolution output in text and JSON form
//! - Substvars produced by the depends subcommand
//! - Exit codes are correct for each fatal failure site

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Create a packaging tree whose override sources all live inside it
fn create_test_project(user_overrides: &str) -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let root = temp_dir.path();

    fs::create_dir_all(root.join("debian")).unwrap();
    fs::write(root.join("debian/py3dist-overrides"), user_overrides).unwrap();

    let config = format!(
        r#"[overrides]
user_file = "debian/py3dist-overrides"
system_dir = "{root}/dist"
fallback_file = "{root}/dist_fallback"
"#,
        root = root.display()
    );
    fs::write(root.join("pydist.toml"), config).unwrap();
    fs::write(
        root.join("index.txt"),
        "python3-six: /usr/lib/python3/dist-packages/six-1.16.0.egg-info\n",
    )
    .unwrap();
    temp_dir
}

/// The binary, run inside `dir` with its config and file index
fn pydist(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pydist").expect("binary should be built");
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .args(["--config", "pydist.toml", "--file-index", "index.txt"]);
    cmd
}

mod resolve_tests {
    use super::*;

    #[test]
    fn test_resolve_text_output() {
        let temp_dir = create_test_project("bar python3-bar; s/^/1:/\nargparse\n");

        pydist(temp_dir.path())
            .args(["resolve", "bar>=2.3", "argparse", "six", "My_Foo"])
            .assert()
            .success()
            .stdout("python3-bar (>= 1:2.3)\n\npython3-six\npython3-my-foo\n")
            .stderr(predicate::str::contains("Using python3-my-foo as package name"));
    }

    #[test]
    fn test_resolve_json_output() {
        let temp_dir = create_test_project("argparse\n");

        let output = pydist(temp_dir.path())
            .args(["resolve", "--json", "argparse", "six"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json[0]["requirement"], "argparse");
        assert!(json[0]["dependency"].is_null());
        assert_eq!(json[1]["dependency"], "python3-six");
    }

    #[test]
    fn test_resolve_quiet_hides_best_guess_warning() {
        let temp_dir = create_test_project("");

        pydist(temp_dir.path())
            .args(["--quiet", "resolve", "My_Foo"])
            .assert()
            .success()
            .stdout("python3-my-foo\n")
            .stderr(predicate::str::is_empty());
    }

    #[test]
    fn test_resolve_target_version() {
        let temp_dir = create_test_project("foo -3.2 python3-oldfoo\nfoo python3-foo\n");

        pydist(temp_dir.path())
            .args(["resolve", "--target-version", "3.3", "foo"])
            .assert()
            .success()
            .stdout("python3-foo\n");
    }

    #[test]
    fn test_overrides_flag_replaces_user_file() {
        let temp_dir = create_test_project("foo python3-foo\n");
        fs::write(temp_dir.path().join("custom"), "foo python3-custom-foo\n").unwrap();

        pydist(temp_dir.path())
            .args(["--overrides", "custom", "resolve", "foo"])
            .assert()
            .success()
            .stdout("python3-custom-foo\n");
    }
}

mod depends_tests {
    use super::*;

    #[test]
    fn test_depends_substvars() {
        let temp_dir = create_test_project("bar python3-bar; s/^/1:/\n");
        fs::write(
            temp_dir.path().join("stats.json"),
            r#"{
                "compile": true,
                "private_dirs": {"/usr/share/foo": {"compile": true, "ext": ["3.1", "3.2"]}}
            }"#,
        )
        .unwrap();

        pydist(temp_dir.path())
            .args([
                "depends",
                "python3-foo",
                "--stats",
                "stats.json",
                "--depends",
                "bar>=2.3",
                "--breaks",
                "python3-old (<< 1.0)",
                "-X",
                "it's",
            ])
            .assert()
            .success()
            .stdout(
                "python3:Depends=python3 (>= 3.2.3-3~), python3 (>= 3.1), python3 (<< 3.3), \
                 python3-bar (>= 1:2.3)\n\
                 python3:Breaks=python3-old (<< 1.0)\n\
                 rtupdate: /usr/share/foo -V 3.1-3.2 -X 'it'\\''s'\n",
            );
    }

    #[test]
    fn test_depends_json() {
        let temp_dir = create_test_project("");
        fs::write(temp_dir.path().join("stats.json"), r#"{"ext": ["3.2"]}"#).unwrap();

        let output = pydist(temp_dir.path())
            .args(["--json", "depends", "python3-foo", "--stats", "stats.json", "-V", "3.2"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["package"], "python3-foo");
        assert_eq!(json["substvars"][0]["name"], "python3:Depends");
        assert_eq!(
            json["substvars"][0]["values"],
            serde_json::json!(["python3.2", "python3 (<< 3.3)"])
        );
    }
}

mod exit_code_tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_requirement() {
        let temp_dir = create_test_project("");

        pydist(temp_dir.path())
            .args(["resolve", ">=1.0"])
            .assert()
            .code(8)
            .stderr(predicate::str::contains("requirement is not valid"));
    }

    #[test]
    fn test_exit_code_broken_override_line() {
        let temp_dir = create_test_project("foo 3.x python3-foo\n");

        pydist(temp_dir.path())
            .args(["resolve", "foo"])
            .assert()
            .code(9)
            .stderr(predicate::str::contains("py3dist-overrides"));
    }

    #[test]
    fn test_exit_code_shebang_conflict() {
        let temp_dir = create_test_project("");
        fs::write(
            temp_dir.path().join("stats.json"),
            r#"{"private_dirs": {"/usr/share/foo": {"shebangs": [
                {"interpreter": "python3.1", "version": "3.1"},
                {"interpreter": "python3.2", "version": "3.2"}
            ]}}}"#,
        )
        .unwrap();

        pydist(temp_dir.path())
            .args(["depends", "foo", "--stats", "stats.json"])
            .assert()
            .code(13)
            .stderr(predicate::str::contains("more than one Python dependency"));
    }

    #[test]
    fn test_exit_code_validate() {
        let temp_dir = create_test_project("");
        let root = temp_dir.path();
        fs::write(root.join("good"), "# comment\nfoo 3.2- python3-foo; PEP386\n").unwrap();
        fs::write(root.join("bad"), "foo python3-foo\nFoo Python3-Foo\n").unwrap();

        pydist(root).args(["validate", "good"]).assert().success();
        pydist(root)
            .args(["validate", "good", "bad"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Foo Python3-Foo"));
    }

    #[test]
    fn test_exit_code_missing_stats() {
        let temp_dir = create_test_project("");

        pydist(temp_dir.path())
            .args(["depends", "foo", "--stats", "missing.json"])
            .assert()
            .code(1);
    }

    #[test]
    fn test_exit_code_invalid_config() {
        let temp_dir = create_test_project("");
        fs::write(
            temp_dir.path().join("pydist.toml"),
            "[versions]\nsupported = [\"3.2\"]\ndefault = \"3.1\"\n",
        )
        .unwrap();

        pydist(temp_dir.path()).args(["resolve", "foo"]).assert().code(2);
    }

    #[test]
    fn test_exit_code_help() {
        Command::cargo_bin("pydist")
            .unwrap()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("resolve"));
    }
}
