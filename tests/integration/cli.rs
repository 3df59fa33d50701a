//! The `ginjarator` binary: commands, exit codes and error reporting.

use assert_cmd::Command;
use predicates::prelude::*;

use crate::common::ProjectFixture;

fn ginjarator(project: &ProjectFixture) -> Command {
    let mut cmd = Command::cargo_bin("ginjarator").unwrap();
    cmd.current_dir(project.root());
    cmd
}

#[test]
fn test_help() {
    Command::cargo_bin("ginjarator")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("render"));
}

#[test]
fn test_init_then_scan_and_render() {
    let project = ProjectFixture::new("templates = [\"src/t.jinja\"]\n").unwrap();
    project
        .write("src/t.jinja", r#"{{ write_text(path="build/out.txt", contents="cli") }}"#)
        .unwrap();

    ginjarator(&project).arg("init").assert().success();
    assert!(project.path("build.ninja").is_file());

    ginjarator(&project).args(["scan", "src/t.jinja"]).assert().success();
    ginjarator(&project).args(["render", "src/t.jinja"]).assert().success();
    assert_eq!(project.read("build/out.txt").unwrap(), "cli");
}

#[test]
fn test_directory_flag() {
    let project = ProjectFixture::new("").unwrap();
    Command::cargo_bin("ginjarator")
        .unwrap()
        .arg("-C")
        .arg(project.root())
        .arg("minimal-config")
        .assert()
        .success();
    assert!(project.path(".ginjarator/config/minimal.json").is_file());
}

#[test]
fn test_access_error_names_path_and_allowed_paths() {
    let project = ProjectFixture::new("").unwrap();
    project
        .write("src/t.jinja", r#"{{ write_text(path="src/generated.txt", contents="x") }}"#)
        .unwrap();
    project.minimal_config().unwrap();

    ginjarator(&project)
        .args(["scan", "src/t.jinja"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("src/generated.txt"))
        .stderr(predicate::str::contains("build"));
    assert!(!project.path(".ginjarator/templates/src%2Ft.jinja.json").exists());
}

#[test]
fn test_missing_config() {
    let project = ProjectFixture::new("").unwrap();
    std::fs::remove_file(project.path("ginjarator.toml")).unwrap();

    ginjarator(&project)
        .arg("init")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("ginjarator.toml"));
}

#[test]
fn test_render_without_scan() {
    let project = ProjectFixture::new("").unwrap();
    project.write("src/t.jinja", "").unwrap();
    project.minimal_config().unwrap();

    ginjarator(&project)
        .args(["render", "src/t.jinja"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("src/t.jinja"));
}

#[test]
fn test_render_delete_created_on_error() {
    let project = ProjectFixture::new("").unwrap();
    project
        .write("src/t.jinja", r#"{{ write_text(path="build/out.txt", contents="x") }}"#)
        .unwrap();
    project.minimal_config().unwrap();
    ginjarator(&project).args(["scan", "src/t.jinja"]).assert().success();

    project
        .write(
            "src/t.jinja",
            r#"{{ write_text(path="build/out.txt", contents="x") }}{{ throw(message="nope") }}"#,
        )
        .unwrap();
    ginjarator(&project)
        .args(["render", "--delete-created-on-error", "src/t.jinja"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
    assert!(!project.path("build/out.txt").exists());
}
