use std::{
    env, fs,
    path::PathBuf,
    process::{Command, Output},
};

fn tile_defence(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tile-defence"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch tile-defence binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 output")
}

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("tile-defence-{}-{name}", std::process::id()));
    fs::write(&path, contents).expect("scratch file written");
    path
}

#[test]
fn default_run_prints_banner_and_board() {
    let output = tile_defence(&["--columns", "5", "--rows", "3", "--ticks", "4"]);
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Welcome to Tile Defence."));
    assert_eq!(lines.next(), Some("+-----+"));
    assert!(text.contains('X'), "destination missing:\n{text}");
    assert!(text.contains('S'), "spawn point missing:\n{text}");
}

#[test]
fn script_edits_and_exports_layout() {
    let script = scratch_file(
        "script.txt",
        "# wall off part of the board\nwall 1 1\nwall 1 0 # corner stays reachable\nspawn 3 0\npaths off\ngrid off\nshow\n",
    );
    let output = tile_defence(&[
        "--columns",
        "4",
        "--rows",
        "3",
        "--script",
        script.to_str().expect("utf-8 path"),
        "--export-layout",
    ]);
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Welcome to Tile Defence.");
    assert_eq!(&lines[1..4], &["....", ".#X.", "S#.S"]);
    assert!(lines[4].starts_with("board:v1:4x3:"));

    let reload = tile_defence(&["--layout", lines[4], "--quiet", "--export-layout"]);
    assert!(reload.status.success(), "{reload:?}");
    assert_eq!(stdout(&reload).trim(), lines[4]);
}

#[test]
fn script_errors_name_the_line() {
    let script = scratch_file("broken.txt", "wall 1 1\nfly 2 2\n");
    let output = tile_defence(&["--script", script.to_str().expect("utf-8 path")]);

    assert!(!output.status.success());
    let error = String::from_utf8_lossy(&output.stderr);
    assert!(error.contains("line 2"), "stderr: {error}");
}

#[test]
fn malformed_layouts_fail_cleanly() {
    let output = tile_defence(&["--layout", "maze:v1:4x4:e30", "--quiet"]);

    assert!(!output.status.success());
    let error = String::from_utf8_lossy(&output.stderr);
    assert!(error.contains("invalid layout string"), "stderr: {error}");
}
