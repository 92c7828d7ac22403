use super::*;

#[test]
fn for_each_line_strips_terminators_and_keeps_last_partial_line() {
    let input: &[u8] = b"first\r\nsecond\n\nthird";
    let mut lines = Vec::new();
    for_each_line(input, |line| lines.push(line.to_string())).expect("read lines");
    assert_eq!(lines, vec!["first", "second", "", "third"]);
}

#[test]
fn for_each_line_replaces_invalid_utf8() {
    let input: &[u8] = b"ok\n\xff\xfe bytes\n";
    let mut lines = Vec::new();
    for_each_line(input, |line| lines.push(line.to_string())).expect("read lines");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].ends_with(" bytes"));
}

#[cfg(unix)]
#[test]
fn run_reports_exit_status() {
    let mut command = Command::new("sh");
    command.args(["-c", "echo out; echo err 1>&2; exit 3"]);
    let outcome = run_with_timeout(&mut command, Duration::from_secs(10)).expect("run sh");
    match outcome {
        RunOutcome::Exited(status) => {
            assert_eq!(status.code(), Some(3));
            assert_eq!(exit_status_string(&status), "3");
        }
        RunOutcome::TimedOut => panic!("expected exit"),
    }
}

#[cfg(unix)]
#[test]
fn run_drains_large_stdout_without_stalling() {
    // Far more than a pipe buffer; an undrained pipe would block the child.
    let mut command = Command::new("sh");
    command.args([
        "-c",
        "i=0; while [ $i -lt 20000 ]; do echo line-$i-padding-padding-padding; i=$((i+1)); done",
    ]);
    let outcome = run_with_timeout(&mut command, Duration::from_secs(30)).expect("run sh");
    assert!(matches!(outcome, RunOutcome::Exited(status) if status.success()));
}

#[cfg(unix)]
#[test]
fn run_times_out_and_returns_control() {
    let mut command = Command::new("sh");
    command.args(["-c", "exec sleep 30"]);
    let start = Instant::now();
    let outcome = run_with_timeout(&mut command, Duration::from_millis(300)).expect("run sh");
    assert!(matches!(outcome, RunOutcome::TimedOut));
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[test]
fn run_fails_to_spawn_missing_binary() {
    let mut command = Command::new("/nonexistent/jarviz-fetch-tool");
    let err = run_with_timeout(&mut command, Duration::from_secs(1)).expect_err("spawn fails");
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}
