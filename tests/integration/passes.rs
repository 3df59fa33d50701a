//! Scan and render passes driven through the library, without ninja.

use ginjarator::driver::{self, OnRenderError, TemplateState};
use ginjarator::paths::FsPath;

use crate::common::ProjectFixture;

const CONFIG: &str = r#"templates = ["src/a.jinja", "src/b.jinja"]
"#;

fn template(path: &str) -> FsPath {
    FsPath::new(path)
}

#[test]
fn test_scan_then_render_round_trip() {
    let project = ProjectFixture::new(CONFIG).unwrap();
    project
        .write("src/b.jinja", r#"{{ write_text(path="build/b.txt", contents="from b") }}"#)
        .unwrap();
    project.minimal_config().unwrap();

    let state = driver::scan(project.root(), &template("src/b.jinja")).unwrap();
    assert_eq!(state.outputs.iter().collect::<Vec<_>>(), vec![&FsPath::new("build/b.txt")]);
    assert!(state.dependencies.contains(&FsPath::new("src/b.jinja")));
    assert!(!project.path("build/b.txt").exists());

    driver::render(project.root(), &template("src/b.jinja"), OnRenderError::default()).unwrap();
    assert_eq!(project.read("build/b.txt").unwrap(), "from b");
}

#[test]
fn test_deferred_read_of_another_templates_output() {
    let project = ProjectFixture::new(CONFIG).unwrap();
    project
        .write(
            "src/a.jinja",
            r#"{% set b = read_text(path="build/b.txt") -%}
{% if b is available -%}
{{ write_text(path="build/a.txt", contents="a sees: " ~ b) }}
{%- else -%}
{{ add_output(path="build/a.txt") }}
{%- endif %}"#,
        )
        .unwrap();
    project
        .write("src/b.jinja", r#"{{ write_text(path="build/b.txt", contents="from b") }}"#)
        .unwrap();
    project.minimal_config().unwrap();

    let a_state = driver::scan(project.root(), &template("src/a.jinja")).unwrap();
    assert!(a_state.dependencies.contains(&FsPath::new("build/b.txt")));
    assert!(a_state.outputs.contains(&FsPath::new("build/a.txt")));

    // The deferred read is not in the depfile: the file may not exist yet.
    let depfile = project.read(".ginjarator/templates/src%2Fa.jinja.d").unwrap();
    assert!(!depfile.contains("build/b.txt"));
    let dyndep = project.read(".ginjarator/templates/src%2Fa.jinja.dd").unwrap();
    assert!(dyndep.contains("build/b.txt"));

    driver::scan(project.root(), &template("src/b.jinja")).unwrap();
    driver::render(project.root(), &template("src/b.jinja"), OnRenderError::default()).unwrap();
    driver::render(project.root(), &template("src/a.jinja"), OnRenderError::default()).unwrap();

    assert_eq!(project.read("build/a.txt").unwrap(), "a sees: from b");
}

#[test]
fn test_render_is_limited_to_scanned_state() {
    let project = ProjectFixture::new(CONFIG).unwrap();
    project.write("src/a.jinja", "{{ read_text(path=\"src/data.txt\") }}").unwrap();
    project.write("src/data.txt", "data").unwrap();
    project.minimal_config().unwrap();
    driver::scan(project.root(), &template("src/a.jinja")).unwrap();

    let state_path = project.path(".ginjarator/templates/src%2Fa.jinja.json");
    let state =
        TemplateState::from_json(&std::fs::read_to_string(&state_path).unwrap()).unwrap();
    assert!(state.dependencies.contains(&FsPath::new("src/data.txt")));

    // Reading something the scan never saw fails the render.
    project.write("src/other.txt", "other").unwrap();
    project.write("src/a.jinja", "{{ read_text(path=\"src/other.txt\") }}").unwrap();
    let err = driver::render(project.root(), &template("src/a.jinja"), OnRenderError::default())
        .unwrap_err();
    assert!(format!("{err:#}").contains("src/other.txt"));
}

#[test]
fn test_init_generates_ninja_files() {
    let project = ProjectFixture::new(
        r#"ninja_templates = ["src/extra.ninja.jinja"]
templates = ["src/a.jinja"]
"#,
    )
    .unwrap();
    project.write("src/extra.ninja.jinja", "# {{ ginjarator.current_template }}\n").unwrap();
    project.write("src/a.jinja", "").unwrap();

    driver::init(project.root()).unwrap();

    let entrypoint = project.read("build.ninja").unwrap();
    assert!(
        entrypoint.contains("subninja .ginjarator/ninja_templates/src%2Fextra.ninja.jinja.ninja")
    );
    assert!(entrypoint.ends_with("subninja .ginjarator/main.ninja\n"));
    assert_eq!(
        project.read(".ginjarator/ninja_templates/src%2Fextra.ninja.jinja.ninja").unwrap(),
        "# src/extra.ninja.jinja\n"
    );
    let main = project.read(".ginjarator/main.ninja").unwrap();
    assert!(main.contains(".ginjarator/templates/src%2Fa.jinja.json"));
    assert!(project.path(".ginjarator/config/minimal.json").is_file());
    assert_eq!(
        project.read(".ginjarator/.gitignore").unwrap(),
        "# Automatically generated by ginjarator.\n*\n"
    );
}

#[test]
fn test_rerunning_every_pass_touches_nothing() {
    let project = ProjectFixture::new(CONFIG).unwrap();
    project.write("src/a.jinja", r#"{{ write_text(path="build/a.txt", contents="a") }}"#).unwrap();
    project.write("src/b.jinja", r#"{{ write_text(path="build/b.txt", contents="b") }}"#).unwrap();

    let run_all = || {
        driver::init(project.root()).unwrap();
        for name in ["src/a.jinja", "src/b.jinja"] {
            driver::scan(project.root(), &template(name)).unwrap();
            driver::render(project.root(), &template(name), OnRenderError::default()).unwrap();
        }
    };

    run_all();
    let before = project.mtimes().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(20));
    run_all();
    assert_eq!(project.mtimes().unwrap(), before);
}

#[test]
fn test_imported_macro_file_is_tracked_across_passes() {
    let project = ProjectFixture::new(CONFIG).unwrap();
    project
        .write("src/macros.jinja", "{% macro line(text) %}* {{ text }}{% endmacro line %}")
        .unwrap();
    project
        .write(
            "src/a.jinja",
            r#"{% import "src/macros.jinja" as m -%}
{{ write_text(path="build/a.txt", contents=m::line(text="one")) }}"#,
        )
        .unwrap();
    project.minimal_config().unwrap();

    let state = driver::scan(project.root(), &template("src/a.jinja")).unwrap();
    assert!(state.dependencies.contains(&FsPath::new("src/macros.jinja")));
    let depfile = project.read(".ginjarator/templates/src%2Fa.jinja.d").unwrap();
    assert!(depfile.contains("src/macros.jinja"));

    driver::render(project.root(), &template("src/a.jinja"), OnRenderError::default()).unwrap();
    assert_eq!(project.read("build/a.txt").unwrap(), "* one");
}
