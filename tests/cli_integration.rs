//! Integration tests for the pmod CLI.
//!
//! These tests run the binary against module directories built with
//! assert_fs.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Get a command for running pmod.
fn pmod() -> Command {
    Command::cargo_bin("pmod").unwrap()
}

fn widgets_module() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("acme/v1/widget.proto")
        .write_str("syntax = \"proto3\";\npackage acme.v1;\n")
        .unwrap();
    temp.child("acme/v1/part.proto")
        .write_str("syntax = \"proto3\";\n")
        .unwrap();
    temp.child("vendor/other.proto")
        .write_str("syntax = \"proto3\";\n")
        .unwrap();
    temp.child("README.md").write_str("# not a source\n").unwrap();
    temp.child("buf.md").write_str("# Widgets\n").unwrap();
    temp
}

#[test]
fn version_flag_works() {
    pmod()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pmod"));
}

#[test]
fn help_lists_commands() {
    pmod()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ls-files").and(predicate::str::contains("init")));
}

mod init {
    use super::*;

    #[test]
    fn writes_canonical_config() {
        let temp = TempDir::new().unwrap();
        pmod()
            .arg("init")
            .arg(temp.path())
            .args(["--name", "example.com/acme/widgets"])
            .args(["--dep", "example.com/acme/base"])
            .assert()
            .success()
            .stdout(predicate::str::contains("buf.mod"));

        temp.child("buf.mod")
            .assert(predicate::str::contains("example.com/acme/base"));
        temp.child("buf.yaml").assert(predicate::path::missing());
    }

    #[test]
    fn deps_without_name_write_nothing() {
        let temp = TempDir::new().unwrap();
        pmod()
            .arg("init")
            .arg(temp.path())
            .args(["--dep", "example.com/acme/base"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("module name"));

        temp.child("buf.mod").assert(predicate::path::missing());
    }

    #[test]
    fn uncomment_requires_doc() {
        let temp = TempDir::new().unwrap();
        pmod()
            .arg("init")
            .arg(temp.path())
            .arg("--uncomment")
            .assert()
            .failure();
        temp.child("buf.mod").assert(predicate::path::missing());
    }

    #[test]
    fn existing_legacy_config_needs_force() {
        let temp = TempDir::new().unwrap();
        temp.child("buf.yaml").write_str("version: v1beta1\n").unwrap();

        pmod()
            .arg("init")
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("--force"));

        pmod()
            .arg("init")
            .arg(temp.path())
            .args(["--force", "--doc"])
            .assert()
            .success();
        temp.child("buf.mod")
            .assert(predicate::str::contains("# version is the version"));
    }
}

mod config {
    use super::*;

    #[test]
    fn defaults_without_config() {
        let temp = TempDir::new().unwrap();
        pmod()
            .arg("config")
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("version: v1beta1").and(predicate::str::contains("DEFAULT")));
    }

    #[test]
    fn legacy_config_is_read() {
        let temp = TempDir::new().unwrap();
        temp.child("buf.yaml")
            .write_str("version: v1\nname: example.com/acme/widgets\n")
            .unwrap();
        pmod()
            .arg("config")
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("example.com/acme/widgets"));
    }

    #[test]
    fn inline_override() {
        let temp = TempDir::new().unwrap();
        pmod()
            .arg("config")
            .arg(temp.path())
            .args(["--config", "version: v1"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("version: v1\n"));
    }

    #[test]
    fn file_override() {
        let temp = TempDir::new().unwrap();
        let file = temp.child("ci.yaml");
        file.write_str("version: v1\nname: example.com/acme/ci\n").unwrap();
        pmod()
            .arg("config")
            .arg(temp.path())
            .arg("--config")
            .arg(file.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("example.com/acme/ci"));
    }

    #[test]
    fn unsupported_version_fails() {
        let temp = TempDir::new().unwrap();
        temp.child("buf.mod").write_str("version: v2\n").unwrap();
        pmod()
            .arg("config")
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("'v2'"));
    }
}

mod module {
    use super::*;

    #[test]
    fn ls_files_lists_only_sources() {
        let temp = widgets_module();
        pmod()
            .arg("ls-files")
            .arg(temp.path())
            .assert()
            .success()
            .stdout(
                predicate::str::contains("acme/v1/part.proto")
                    .and(predicate::str::contains("acme/v1/widget.proto"))
                    .and(predicate::str::contains("README.md").not())
                    .and(predicate::str::contains("buf.md").not()),
            );
    }

    #[test]
    fn ls_files_honours_excludes() {
        let temp = widgets_module();
        temp.child("buf.mod")
            .write_str("version: v1\nbuild:\n  excludes: [vendor]\n")
            .unwrap();
        pmod()
            .arg("ls-files")
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("vendor").not());
    }

    #[test]
    fn deps_reads_lock_file() {
        let temp = widgets_module();
        temp.child("buf.lock")
            .write_str(
                "version: v1\ndeps:\n  - remote: example.com\n    owner: acme\n    repository: zeta\n    commit: bbb\n  - remote: example.com\n    owner: acme\n    repository: alpha\n    branch: dev\n    commit: aaa\n",
            )
            .unwrap();
        pmod()
            .arg("deps")
            .arg(temp.path())
            .assert()
            .success()
            .stdout("example.com/acme/alpha dev aaa\nexample.com/acme/zeta main bbb\n");
    }

    #[test]
    fn duplicate_lock_entries_fail() {
        let temp = widgets_module();
        temp.child("buf.lock")
            .write_str(
                "version: v1\ndeps:\n  - remote: example.com\n    owner: acme\n    repository: base\n    commit: a\n  - remote: example.com\n    owner: acme\n    repository: base\n    commit: b\n",
            )
            .unwrap();
        pmod()
            .arg("deps")
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("example.com/acme/base"));
    }

    #[test]
    fn pack_then_inspect() {
        let temp = widgets_module();
        let out = temp.child("widgets.json");

        let packed = pmod()
            .arg("pack")
            .arg(temp.path())
            .arg("--output")
            .arg(out.path())
            .assert()
            .success()
            .stdout(predicate::str::starts_with("sha256:"));
        let digest = String::from_utf8(packed.get_output().stdout.clone()).unwrap();

        out.assert(predicate::path::exists());
        pmod()
            .arg("inspect")
            .arg(out.path())
            .assert()
            .success()
            .stdout(
                predicate::str::contains(format!("digest: {}", digest.trim()))
                    .and(predicate::str::contains("acme/v1/widget.proto"))
                    .and(predicate::str::contains("documentation:")),
            );
    }

    #[test]
    fn missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        pmod()
            .arg("ls-files")
            .arg(temp.path().join("nope"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not exist"));
    }
}

#[test]
fn completion_generates_script() {
    pmod()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pmod"));
}
