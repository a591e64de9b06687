use crate::reader::{Object, ValueReader};
use crate::{Error, Result, Value};
use indexmap::IndexSet;
use std::borrow::Cow;
use std::io::Write;

#[derive(Debug, serde::Deserialize)]
pub struct Options {
    #[serde(default = "default_delimiter")]
    pub delimiter: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

fn default_delimiter() -> u8 {
    b','
}

pub fn write_value(value: &Value, buf: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Int(i) => write!(buf, "{}", i).map_err(Into::into),
        Value::String(s) => write!(buf, "{}", s).map_err(Into::into),
        Value::Float(s) => write!(buf, "{}", s).map_err(Into::into),
        Value::Bool(s) => write!(buf, "{}", s).map_err(Into::into),
        Value::Object(o) => serde_json::to_writer(buf, &o).map_err(Into::into),
        Value::Array(o) => serde_json::to_writer(buf, &o).map_err(Into::into),
        Value::Null => Ok(()),
    }
}

/// Writes object records as CSV. The header is every key seen across all
/// records in first-seen order, so the records are buffered before anything
/// is written.
pub fn write<W: Write, R: ValueReader>(inner: W, mut reader: R, opts: Options) -> Result<()> {
    let mut rows: Vec<Object<'static>> = vec![];
    let mut columns: IndexSet<Cow<'static, str>> = IndexSet::new();

    while let Some(value) = reader.next()? {
        match value.into_static() {
            Value::Object(object) => {
                for key in object.keys() {
                    if !columns.contains(key) {
                        columns.insert(key.clone());
                    }
                }
                rows.push(object);
            }
            other => {
                return Err(Error::output(format!(
                    "CSV rows must be objects, found {}",
                    serde_json::to_string(&other)?
                )))
            }
        }
    }

    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(opts.delimiter)
        .from_writer(inner);

    let mut buf = vec![];

    if !columns.is_empty() {
        for column in columns.iter() {
            writer.write_field(column.as_bytes())?;
        }
        writer.write_record(None::<&[u8]>)?;
    }

    for row in rows.iter() {
        for column in columns.iter() {
            buf.clear();
            if let Some(value) = row.get(column) {
                write_value(value, &mut buf)?;
            }
            writer.write_field(&buf)?;
        }
        writer.write_record(None::<&[u8]>)?;
    }

    writer.flush()?;
    tracing::debug!(records = rows.len(), columns = columns.len(), "wrote csv");

    Ok(())
}

#[cfg(test)]
fn render(input: &'static str, delimiter: u8) -> Result<String> {
    use crate::json::reader::{Options as ReaderOptions, RecordReader};

    let reader = RecordReader::new(
        input.as_bytes(),
        ReaderOptions::flattening(Default::default()),
    )?;
    let mut out = vec![];
    write(&mut out, reader, Options { delimiter })?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn header_is_union_of_flattened_keys() {
    let out = render(
        "{\"id\": 1, \"user\": {\"name\": \"ann\"}}\n{\"id\": 2, \"user\": {\"age\": 30}, \"tags\": [\"x\"]}",
        b',',
    )
    .unwrap();

    assert_eq!(
        out,
        "id,user.name,user.age,tags\n1,ann,,\n2,,30,\"[\"\"x\"\"]\"\n"
    );
}

#[test]
fn nulls_are_empty_cells() {
    let out = render(r#"{"a": null, "b": {"c": true}}"#, b';').unwrap();

    assert_eq!(out, "a;b.c\n;true\n");
}

#[test]
fn no_records_no_output() {
    assert_eq!(render("[]", b',').unwrap(), "");
}

#[test]
fn rejects_scalar_rows() {
    let err = render("[1]", b',').unwrap_err();

    assert!(matches!(err, Error::OutputError(_)));
}

#[test]
fn delimiter_defaults_to_comma() {
    let opts: Options = serde_json::from_str("{}").unwrap();
    assert_eq!(opts.delimiter, b',');
}
