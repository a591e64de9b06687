use dotpath::json::reader::Options as JsonOptions;
use dotpath::{flatten, reader::new_reader, value, Reader, ReaderOptions, Value, WriterOptions};
use std::io::Write;

fn input_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn convert(contents: &str, reader_options: &str, writer_options: &str) -> String {
    let file = input_file(contents);
    let reader_options: ReaderOptions = serde_json::from_str(reader_options).unwrap();
    let writer_options: WriterOptions = serde_json::from_str(writer_options).unwrap();

    let reader = new_reader(file.path().to_str().unwrap(), reader_options).unwrap();
    let mut out = vec![];
    writer_options.write(&mut out, reader).unwrap();

    String::from_utf8(out).unwrap()
}

#[test]
fn flattens_sample_document() {
    let out = convert(
        r#"{"a": {"b": {"c": 1}}, "d": 1}"#,
        r#"{"json": {"flatten": {}}}"#,
        r#"{"json": {"mode": "normal"}}"#,
    );

    assert_eq!(out, r#"[{"a.b.c":1,"d":1}]"#);
}

#[test]
fn ndjson_to_csv_with_prefix_and_indices() {
    let out = convert(
        "{\"x\": {\"y\": {}}, \"z\": 2}\n{\"z\": 3, \"list\": [10, {\"k\": \"v\"}]}\n",
        r#"{"json": {"flatten": {"prefix": "r", "arrays": "index"}}}"#,
        r#"{"csv": {"delimiter": 44}}"#,
    );

    assert_eq!(out, "r.z,r.list.0,r.list.1.k\n2,,\n3,10,v\n");
}

#[test]
fn without_flatten_options_records_pass_through() {
    let out = convert(
        r#"[{"a": {"b": null}}]"#,
        r#"{"json": {}}"#,
        r#"{"json": {"mode": "ndjson"}}"#,
    );

    assert_eq!(out, "{\"a\":{\"b\":null}}\n");
}

#[test]
fn empty_file_is_an_empty_stream() {
    let out = convert("", r#"{"json": {"flatten": {}}}"#, r#"{"json": {"mode": "normal"}}"#);

    assert_eq!(out, "[]");
}

#[test]
fn reader_flattens_each_record() {
    let file = input_file(r#"[{"a": null, "b": {"c": null}}, {"s": {"t": "u"}}]"#);
    let opts = ReaderOptions::Json(JsonOptions::flattening(
        flatten::Options::default().with_separator("_"),
    ));
    let mut reader = new_reader(file.path().to_str().unwrap(), opts).unwrap();

    assert_eq!(reader.next().unwrap(), Some(value!({"a": null, "b_c": null})));
    assert_eq!(reader.next().unwrap(), Some(value!({"s_t": "u"})));
    assert_eq!(reader.next().unwrap(), None);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = new_reader("/definitely/not/here.json", ReaderOptions::default())
        .err()
        .unwrap();

    assert!(matches!(err, dotpath::Error::IoError(_)));
    assert!(!err.is_parse_error());
}

#[test]
fn malformed_input_is_a_parse_error() {
    let file = input_file(r#"{"a": }"#);
    let mut reader = new_reader(file.path().to_str().unwrap(), ReaderOptions::default()).unwrap();

    let err = reader.next().unwrap_err();
    assert!(err.is_parse_error());
}

#[test]
fn library_entry_points_agree() {
    let object = value!({"a": {"b": 1}}).unwrap_object().unwrap().clone();

    assert_eq!(Value::Object(dotpath::flatten(object.clone())), value!({"a.b": 1}));
    assert_eq!(
        Value::Object(dotpath::flatten_prefixed(object.clone(), "p")),
        value!({"p.a.b": 1})
    );
    assert_eq!(
        Value::Object(dotpath::flatten_with(object, &flatten::Options::default())),
        value!({"a.b": 1})
    );
}
