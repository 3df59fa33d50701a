//! Template functions, filters and testers backed by a [`Filesystem`].
//!
//! Tera functions take keyword arguments only:
//!
//! ```jinja
//! {% set data = read_text(path="build/data.json") %}
//! {% if data is available %}
//!   {{ write_text(path="build/out.txt", contents=data) }}
//! {% else %}
//!   {{ add_output(path="build/out.txt") }}
//! {% endif %}
//!
//! {% filter write_to(path="build/page.html") %}
//!   <h1>{{ ginjarator.current_template }}</h1>
//! {% endfilter %}
//! ```
//!
//! Functions that only record or write return an empty string, so they can
//! be called from `{{ }}` without producing output.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tera::{Tera, Value};

use crate::filesystem::{Filesystem, ReadOutcome};
use crate::ninja;

/// A façade shared between the renderer and the functions it registers.
pub type SharedFilesystem = Arc<Mutex<Filesystem>>;

/// Registers every ginjarator function, filter and tester on `tera`.
pub fn register(tera: &mut Tera, fs: &SharedFilesystem) {
    tera.register_function("read_text", read_text(Arc::clone(fs)));
    tera.register_function("add_dependency", add_dependency(Arc::clone(fs)));
    tera.register_function("write_text", write_text(Arc::clone(fs)));
    tera.register_function("add_output", add_output(Arc::clone(fs)));
    tera.register_function("read_config", read_config(Arc::clone(fs)));
    tera.register_function("read_minimal_config", read_minimal_config(Arc::clone(fs)));
    tera.register_function("to_ninja", to_ninja);
    tera.register_filter("write_to", write_to(Arc::clone(fs)));
    tera.register_tester("available", available);
}

pub(crate) fn lock(fs: &SharedFilesystem) -> tera::Result<MutexGuard<'_, Filesystem>> {
    fs.lock().map_err(|_| tera::Error::msg("filesystem lock poisoned by an earlier failure"))
}

fn required_str<'a>(args: &'a HashMap<String, Value>, name: &str) -> tera::Result<&'a str> {
    match args.get(name) {
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(tera::Error::msg(format!("`{name}` must be a string, got {other}"))),
        None => Err(tera::Error::msg(format!("missing required argument `{name}`"))),
    }
}

fn optional_bool(args: &HashMap<String, Value>, name: &str, default: bool) -> tera::Result<bool> {
    match args.get(name) {
        Some(Value::Bool(value)) => Ok(*value),
        Some(other) => Err(tera::Error::msg(format!("`{name}` must be a boolean, got {other}"))),
        None => Ok(default),
    }
}

/// Carries a façade error through Tera's error chain.
///
/// Boxing an [`anyhow::Error`] directly hides the concrete error type, so
/// this exposes it as the source instead.
#[derive(Debug)]
struct FacadeError(anyhow::Error);

impl fmt::Display for FacadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for FacadeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.0)
    }
}

fn fs_error(action: String, error: anyhow::Error) -> tera::Error {
    tera::Error::chain(action, FacadeError(error))
}

fn read_text(fs: SharedFilesystem) -> impl tera::Function + 'static {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let path = required_str(args, "path")?;
        let defer_ok = optional_bool(args, "defer_ok", true)?;
        let outcome = lock(&fs)?
            .read_text(path, defer_ok)
            .map_err(|e| fs_error(format!("reading '{path}'"), e))?;
        Ok(match outcome {
            ReadOutcome::Available(contents) => Value::String(contents),
            ReadOutcome::NotYetAvailable => Value::Null,
        })
    }
}

fn add_dependency(fs: SharedFilesystem) -> impl tera::Function + 'static {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let path = required_str(args, "path")?;
        let defer_ok = optional_bool(args, "defer_ok", true)?;
        lock(&fs)?
            .add_dependency(path, defer_ok)
            .map_err(|e| fs_error(format!("adding dependency '{path}'"), e.into()))?;
        Ok(Value::String(String::new()))
    }
}

fn write_text(fs: SharedFilesystem) -> impl tera::Function + 'static {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let path = required_str(args, "path")?;
        let contents = required_str(args, "contents")?;
        let defer_ok = optional_bool(args, "defer_ok", true)?;
        lock(&fs)?
            .write_text(path, contents, defer_ok)
            .map_err(|e| fs_error(format!("writing '{path}'"), e))?;
        Ok(Value::String(String::new()))
    }
}

fn add_output(fs: SharedFilesystem) -> impl tera::Function + 'static {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let path = required_str(args, "path")?;
        let defer_ok = optional_bool(args, "defer_ok", true)?;
        lock(&fs)?
            .add_output(path, defer_ok)
            .map_err(|e| fs_error(format!("adding output '{path}'"), e.into()))?;
        Ok(Value::String(String::new()))
    }
}

fn read_config(fs: SharedFilesystem) -> impl tera::Function + 'static {
    move |_args: &HashMap<String, Value>| -> tera::Result<Value> {
        let config = lock(&fs)?
            .read_config()
            .map_err(|e| fs_error("reading config".to_string(), e))?;
        Ok(tera::to_value(config)?)
    }
}

fn read_minimal_config(fs: SharedFilesystem) -> impl tera::Function + 'static {
    move |_args: &HashMap<String, Value>| -> tera::Result<Value> {
        let fs = lock(&fs)?;
        Ok(tera::to_value(fs.read_minimal_config())?)
    }
}

fn to_ninja(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let value = args
        .get("value")
        .ok_or_else(|| tera::Error::msg("missing required argument `value`"))?;
    let escape_shell = optional_bool(args, "escape_shell", false)?;
    let encoded = ninja::value_to_ninja(value, escape_shell)
        .map_err(|e| tera::Error::chain("converting to ninja syntax", e))?;
    Ok(Value::String(encoded))
}

fn write_to(fs: SharedFilesystem) -> impl tera::Filter + 'static {
    move |value: &Value, args: &HashMap<String, Value>| -> tera::Result<Value> {
        let contents = value
            .as_str()
            .ok_or_else(|| tera::Error::msg("write_to filter requires a string"))?;
        let path = required_str(args, "path")?;
        let defer_ok = optional_bool(args, "defer_ok", true)?;
        lock(&fs)?
            .write_text(path, contents, defer_ok)
            .map_err(|e| fs_error(format!("writing '{path}'"), e))?;
        Ok(value.clone())
    }
}

/// `{% if x is available %}`: false for reads that were deferred.
fn available(value: Option<&Value>, _args: &[Value]) -> tera::Result<bool> {
    Ok(value.is_some_and(|value| !value.is_null()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(key, value)| (key.to_string(), value.clone())).collect()
    }

    #[test]
    fn test_required_str() {
        let args = args(&[("path", Value::from("a")), ("n", Value::from(1))]);
        assert_eq!(required_str(&args, "path").unwrap(), "a");
        assert!(required_str(&args, "n").is_err());
        assert!(required_str(&args, "missing").is_err());
    }

    #[test]
    fn test_optional_bool() {
        let args = args(&[("defer_ok", Value::from(false)), ("bad", Value::from("no"))]);
        assert!(!optional_bool(&args, "defer_ok", true).unwrap());
        assert!(optional_bool(&args, "missing", true).unwrap());
        assert!(optional_bool(&args, "bad", true).is_err());
    }

    #[test]
    fn test_to_ninja_function() {
        let result = to_ninja(&args(&[("value", Value::from("a b"))])).unwrap();
        assert_eq!(result, Value::from("a$ b"));

        let result = to_ninja(&args(&[
            ("value", Value::from("it's")),
            ("escape_shell", Value::from(true)),
        ]))
        .unwrap();
        assert_eq!(result, Value::from("'it'\\''s'"));

        assert!(to_ninja(&args(&[("value", Value::from("#"))])).is_err());
        assert!(to_ninja(&HashMap::new()).is_err());
    }

    #[test]
    fn test_available_tester() {
        assert!(available(Some(&Value::from("")), &[]).unwrap());
        assert!(!available(Some(&Value::Null), &[]).unwrap());
        assert!(!available(None, &[]).unwrap());
    }
}
