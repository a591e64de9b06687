use std::io::Write;
use std::process::{Command, Stdio};

struct Run {
    stdout: String,
    code: i32,
}

fn dotpath(args: &[&str], stdin: &str) -> Run {
    let mut child = Command::new(env!("CARGO_BIN_EXE_dotpath"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // Commands that fail before reading stdin close the pipe early.
    let _ = child.stdin.take().unwrap().write_all(stdin.as_bytes());

    let output = child.wait_with_output().unwrap();

    Run {
        stdout: String::from_utf8(output.stdout).unwrap(),
        code: output.status.code().unwrap(),
    }
}

fn error_report(run: &Run) -> serde_json::Value {
    assert_eq!(run.code, 1, "stdout: {}", run.stdout);
    serde_json::from_str(&run.stdout).expect("stdout should hold only the error report")
}

#[test]
fn flattens_stdin_to_stdout() {
    let run = dotpath(&["flatten"], r#"{"a": {"b": {"c": 1}}, "d": 1}"#);

    assert_eq!(run.code, 0);
    assert_eq!(run.stdout, r#"[{"a.b.c":1,"d":1}]"#);
}

#[test]
fn malformed_record_reports_only_the_error() {
    let report = error_report(&dotpath(&["flatten"], r#"{"a": }"#));

    assert_eq!(report[0], "parse_error");
    assert!(report[1].as_str().unwrap().starts_with("Input Error:"));
}

#[test]
fn failure_after_first_record_discards_partial_output() {
    for format in ["normal", "pretty", "ndjson", "csv"] {
        let run = dotpath(&["flatten", "--format", format], r#"[{"a": {"b": 1}}, {"c": ]"#);
        let report = error_report(&run);

        assert_eq!(report[0], "parse_error", "format {}", format);
    }
}

#[test]
fn flag_options_reach_the_flattener() {
    let run = dotpath(
        &[
            "flatten",
            "--separator",
            "/",
            "--prefix",
            "root",
            "--arrays",
            "index",
            "--format",
            "ndjson",
        ],
        r#"{"a": [{"b": 1}, 2]}"#,
    );

    assert_eq!(run.code, 0);
    assert_eq!(run.stdout, "{\"root/a/0/b\":1,\"root/a/1\":2}\n");
}

#[test]
fn csv_format() {
    let run = dotpath(&["flatten", "--format", "csv"], r#"{"a": {"b": 1}, "c": null}"#);

    assert_eq!(run.code, 0);
    assert_eq!(run.stdout, "a.b,c\n1,\n");
}

#[test]
fn writes_to_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");

    let run = dotpath(
        &["flatten", "-o", path.to_str().unwrap()],
        r#"{"x": {"y": {}}, "z": 2}"#,
    );

    assert_eq!(run.code, 0);
    assert_eq!(run.stdout, "");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"[{"z":2}]"#);
}

#[test]
fn convert_takes_json_options() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.json");
    let output = dir.path().join("out.csv");
    std::fs::write(&input, "{\"a\": null, \"b\": {\"c\": null}}\n{\"b\": {\"c\": 3}}\n").unwrap();

    let run = dotpath(
        &[
            "convert",
            input.to_str().unwrap(),
            r#"{"json": {"flatten": {"separator": "_"}}}"#,
            output.to_str().unwrap(),
            r#"{"csv": {"delimiter": 59}}"#,
        ],
        "",
    );

    assert_eq!(run.code, 0);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "a;b_c\n;\n;3\n");
}

#[test]
fn convert_rejects_bad_options() {
    let run = dotpath(&["convert", "-", "{\"yaml\": {}}", "-", "{\"json\": {}}"], "{}");
    let report = error_report(&run);

    assert_eq!(report[0], "parse_error");
}

#[test]
fn missing_input_is_not_a_parse_error() {
    let run = dotpath(&["flatten", "/definitely/not/here.json"], "");
    let report = error_report(&run);

    assert!(report.as_str().unwrap().starts_with("error: "));
}

#[test]
fn second_largest_prints_integers() {
    let run = dotpath(&["second-largest"], "[2, 4, 6, 8]");
    assert_eq!(run.code, 0);
    assert_eq!(run.stdout, "6\n");

    let run = dotpath(&["second-largest"], "[8]");
    assert_eq!(run.code, 0);
    assert_eq!(run.stdout, "null\n");

    let run = dotpath(&["second-largest"], "[1.5, 0.5, 1]");
    assert_eq!(run.code, 0);
    assert_eq!(run.stdout, "1.0\n");
}

#[test]
fn second_largest_rejects_non_numbers() {
    let report = error_report(&dotpath(&["second-largest"], r#"[1, "two"]"#));

    assert_eq!(report[0], "parse_error");
}
