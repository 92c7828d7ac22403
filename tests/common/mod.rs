//! Shared test infrastructure for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Run the built `jarviz` binary with `args`, logging at warn to keep output small.
pub fn run_jarviz<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    run_jarviz_logged(args, "warn")
}

/// Run the built `jarviz` binary with an explicit log filter.
#[allow(dead_code)]
pub fn run_jarviz_logged<I, S>(args: I, filter: &str) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_jarviz"))
        .args(args)
        .env("JARVIZ_LOG", filter)
        .output()
        .expect("run jarviz")
}

pub fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Write an executable stand-in for `mvn` that appends its argv to
/// `calls.log` next to it, then runs `body`.
#[cfg(unix)]
#[allow(dead_code)]
pub fn write_fetch_stub(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let log = dir.join("calls.log");
    let path = dir.join("mvn-stub");
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" >> '{}'\n{body}\n",
        log.display()
    );
    fs::write(&path, script).expect("write stub");
    let mut perms = fs::metadata(&path).expect("stub metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod stub");
    path
}

#[allow(dead_code)]
pub fn recorded_calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("calls.log"))
        .map(|text| text.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// One coupling record as a JSON object with the given source and target classes.
#[allow(dead_code)]
pub fn record_json(source_class: &str, target_class: &str) -> serde_json::Value {
    serde_json::json!({
        "appSetName": "FooPortfolio",
        "applicationName": "foo_app",
        "artifactFileName": "foo-product-1.0.0.jar",
        "artifactId": "foo-product",
        "artifactGroup": "com.foo",
        "artifactVersion": "1.0.0",
        "sourceClass": source_class,
        "sourceMethod": "run",
        "targetClass": target_class,
        "targetMethod": "call"
    })
}
