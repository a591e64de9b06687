use crate::reader::ValueReader;
use crate::Result;

use serde::Serialize;
use std::io::Write;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
pub enum Mode {
    #[default]
    #[serde(rename = "normal")]
    ArrayCompact,
    #[serde(rename = "pretty")]
    ArrayPretty,
    #[serde(rename = "ndjson")]
    NdJson,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct Options {
    #[serde(default)]
    pub mode: Mode,
}

struct Layout {
    open: &'static [u8],
    between: &'static [u8],
    close: &'static [u8],
    pretty: bool,
}

impl Mode {
    fn layout(self) -> Layout {
        match self {
            Mode::ArrayCompact => Layout {
                open: b"[",
                between: b",",
                close: b"]",
                pretty: false,
            },
            Mode::ArrayPretty => Layout {
                open: b"[\n",
                between: b",\n",
                close: b"\n]\n",
                pretty: true,
            },
            Mode::NdJson => Layout {
                open: b"",
                between: b"\n",
                close: b"\n",
                pretty: false,
            },
        }
    }
}

pub fn write<W: Write, R: ValueReader>(mut inner: W, mut reader: R, opts: Options) -> Result<()> {
    let layout = opts.mode.layout();
    let mut count = 0usize;

    inner.write_all(layout.open)?;

    while let Some(row) = reader.next()? {
        if count > 0 {
            inner.write_all(layout.between)?;
        }

        if layout.pretty {
            row.serialize(&mut serde_json::Serializer::pretty(&mut inner))?;
        } else {
            row.serialize(&mut serde_json::Serializer::new(&mut inner))?;
        }

        count += 1;
    }

    // An empty ndjson stream is an empty file.
    if count > 0 || opts.mode != Mode::NdJson {
        inner.write_all(layout.close)?;
    }

    inner.flush()?;
    tracing::debug!(records = count, mode = ?opts.mode, "wrote json");

    Ok(())
}

#[cfg(test)]
fn render(input: &'static str, mode: Mode) -> String {
    use crate::json::reader::{Options as ReaderOptions, RecordReader};

    let reader = RecordReader::new(
        input.as_bytes(),
        ReaderOptions::flattening(Default::default()),
    )
    .unwrap();
    let mut out = vec![];
    write(&mut out, reader, Options { mode }).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn compact_array() {
    assert_eq!(
        render(r#"{"a": {"b": {"c": 1}}, "d": 1}"#, Mode::ArrayCompact),
        r#"[{"a.b.c":1,"d":1}]"#
    );
    assert_eq!(render("", Mode::ArrayCompact), "[]");
}

#[test]
fn pretty_array() {
    assert_eq!(
        render(r#"[{"x": {"y": 1}}, {"z": null}]"#, Mode::ArrayPretty),
        "[\n{\n  \"x.y\": 1\n},\n{\n  \"z\": null\n}\n]\n"
    );
}

#[test]
fn ndjson_lines() {
    assert_eq!(
        render("{\"a\": {\"b\": \"s\"}}\n{\"c\": [1, 2]}", Mode::NdJson),
        "{\"a.b\":\"s\"}\n{\"c\":[1,2]}\n"
    );
    assert_eq!(render("", Mode::NdJson), "");
}

#[test]
fn mode_names() {
    let opts: Options = serde_json::from_str(r#"{"mode": "ndjson"}"#).unwrap();
    assert_eq!(opts.mode, Mode::NdJson);
    assert_eq!(serde_json::from_str::<Options>("{}").unwrap().mode, Mode::ArrayCompact);
}
