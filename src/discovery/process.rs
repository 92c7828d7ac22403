//! Bounded supervision of one fetch-tool process.
//!
//! Stdout is drained into the info log on a background thread while the
//! caller polls for exit; stderr is only read once a nonzero exit is seen.
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How a supervised run ended.
#[derive(Debug)]
pub enum RunOutcome {
    Exited(ExitStatus),
    /// The deadline passed; the child was killed and reaped.
    TimedOut,
}

/// Spawn `command` and wait for it at most `timeout`.
///
/// Spawn and wait errors are returned as-is; exit status interpretation is
/// left to the caller.
pub fn run_with_timeout(command: &mut Command, timeout: Duration) -> io::Result<RunOutcome> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let drain = match child.stdout.take() {
        Some(stdout) => Some(spawn_stdout_drain(stdout).inspect_err(|_| {
            let _ = child.kill();
            let _ = child.wait();
        })?),
        None => None,
    };

    let start = Instant::now();
    let status = match wait_until(&mut child, start, timeout) {
        Ok(status) => status,
        Err(err) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(err);
        }
    };

    let Some(status) = status else {
        let _ = child.kill();
        let _ = child.wait();
        // Grandchildren may still hold the pipe open; the drain thread owns
        // its end and exits on EOF, so it is detached rather than joined.
        drop(drain);
        return Ok(RunOutcome::TimedOut);
    };

    if let Some(handle) = drain {
        if handle.join().is_err() {
            tracing::warn!("stdout drain thread panicked");
        }
    }

    if !status.success() {
        if let Some(stderr) = child.stderr.take() {
            if let Err(err) = for_each_line(stderr, |line| tracing::error!("{line}")) {
                tracing::warn!(error = %err, "read fetch tool stderr");
            }
        }
    }

    Ok(RunOutcome::Exited(status))
}

fn wait_until(child: &mut Child, start: Instant, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn spawn_stdout_drain<R: Read + Send + 'static>(stdout: R) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("fetch-stdout".to_string())
        .spawn(move || {
            if let Err(err) = for_each_line(stdout, |line| tracing::info!("{line}")) {
                tracing::warn!(error = %err, "read fetch tool stdout");
            }
        })
}

/// Feed each line of `reader` to `emit`, without its terminator.
///
/// Invalid UTF-8 is replaced rather than aborting the drain.
pub fn for_each_line<R: Read>(reader: R, mut emit: impl FnMut(&str)) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        emit(line.trim_end_matches(['\n', '\r']));
    }
}

pub fn exit_status_string(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        format!("{code}")
    } else {
        "terminated by signal".to_string()
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
