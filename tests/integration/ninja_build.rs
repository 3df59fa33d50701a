//! Full builds driven by a real `ninja`.
//!
//! Each test returns early when `ninja` is not installed.

use assert_cmd::Command;

use crate::common::{ProjectFixture, ninja_available, run_ninja_ok};

const CONFIG: &str = r#"ninja_templates = ["src/value.ninja.jinja"]
templates = ["src/page.jinja", "src/summary.jinja"]
"#;

const VALUE_NINJA: &str = r#"rule write_value
    command = printf '%s' {{ to_ninja(value="foo: $bar", escape_shell=true) }} > $out

build build/value.txt: write_value
"#;

const PAGE: &str = r#"{% set data = read_text(path="src/data.txt") -%}
{{ write_text(path="build/page.txt", contents="page: " ~ data) }}"#;

const SUMMARY: &str = r#"{% set page = read_text(path="build/page.txt") -%}
{% if page is available -%}
{{ write_text(path="build/summary.txt", contents="summary of " ~ page) }}
{%- else -%}
{{ add_output(path="build/summary.txt") }}
{%- endif %}"#;

fn project() -> Option<ProjectFixture> {
    if !ninja_available() {
        eprintln!("ninja not found, skipping");
        return None;
    }
    let project = ProjectFixture::new(CONFIG).unwrap();
    project.write("src/value.ninja.jinja", VALUE_NINJA).unwrap();
    project.write("src/page.jinja", PAGE).unwrap();
    project.write("src/summary.jinja", SUMMARY).unwrap();
    project.write("src/data.txt", "v1").unwrap();

    Command::cargo_bin("ginjarator")
        .unwrap()
        .current_dir(project.root())
        .arg("init")
        .assert()
        .success();
    Some(project)
}

#[test]
fn test_build_renders_templates_in_dependency_order() {
    let Some(project) = project() else {
        return;
    };

    run_ninja_ok(project.root()).unwrap();

    assert_eq!(project.read("build/page.txt").unwrap(), "page: v1");
    assert_eq!(project.read("build/summary.txt").unwrap(), "summary of page: v1");
}

#[test]
fn test_to_ninja_survives_ninja_and_shell() {
    let Some(project) = project() else {
        return;
    };

    run_ninja_ok(project.root()).unwrap();

    assert_eq!(project.read("build/value.txt").unwrap(), "foo: $bar");
}

#[test]
fn test_source_change_propagates_through_deferred_read() {
    let Some(project) = project() else {
        return;
    };
    run_ninja_ok(project.root()).unwrap();

    std::thread::sleep(std::time::Duration::from_millis(20));
    project.write("src/data.txt", "v2").unwrap();
    run_ninja_ok(project.root()).unwrap();

    assert_eq!(project.read("build/summary.txt").unwrap(), "summary of page: v2");
}

#[test]
fn test_second_build_is_a_no_op() {
    let Some(project) = project() else {
        return;
    };
    run_ninja_ok(project.root()).unwrap();
    let before = project.mtimes().unwrap();

    std::thread::sleep(std::time::Duration::from_millis(20));
    run_ninja_ok(project.root()).unwrap();

    assert_eq!(project.mtimes().unwrap(), before);
}
