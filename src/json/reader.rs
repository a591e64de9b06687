use crate::{
    error::Error,
    flatten,
    reader::{Value, ValueReader},
    Result,
};

use serde::Deserialize;

/// Streams JSON records out of a buffer holding a single document, a run of
/// whitespace separated documents or a top-level array of documents.
pub struct RecordReader<R: AsRef<[u8]>> {
    offset: usize,
    reader: R,
    in_array: bool,
    flatten: Option<flatten::Options>,
}

#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct Options {
    /// Flatten every object record with these options.
    #[serde(default)]
    pub flatten: Option<flatten::Options>,
}

impl Options {
    pub fn flattening(opts: flatten::Options) -> Self {
        Self {
            flatten: Some(opts),
        }
    }
}

/// Reads the next value off `reader`, tracking whether we are between the
/// elements of a top-level array.
pub fn read_value<'a, T: Deserialize<'a>>(
    reader: &mut &'a [u8],
    in_array: &mut bool,
) -> Result<Option<T>> {
    if *in_array {
        match skip_whitespace(reader) {
            Some(b',') => {
                *reader = &reader[1..];
                deserialize_single(reader).map(Some)
            }
            Some(b']') => {
                *reader = &reader[1..];
                *in_array = false;
                read_value(reader, in_array)
            }
            Some(other) => Err(Error::input(format!(
                "Expected `,` or `]` after a value, found `{}`",
                *other as char
            ))),
            None => Err(Error::input(
                "Expected `,` or `]` after a value, found end of file.",
            )),
        }
    } else {
        match skip_whitespace(reader) {
            Some(b'[') => {
                *reader = &reader[1..];
                match skip_whitespace(reader) {
                    Some(b']') => {
                        *reader = &reader[1..];
                        read_value(reader, in_array)
                    }
                    Some(_) => {
                        *in_array = true;
                        deserialize_single(reader).map(Some)
                    }
                    None => Err(Error::input("Expected a JSON value, found end of stream")),
                }
            }
            Some(_) => deserialize_single(reader).map(Some),
            None => Ok(None),
        }
    }
}

impl<R: AsRef<[u8]> + Send + Sync> ValueReader for RecordReader<R> {
    fn next(&mut self) -> Result<Option<Value<'_>>> {
        let mut slice = &self.reader.as_ref()[self.offset..];

        let value = match read_value::<Value>(&mut slice, &mut self.in_array) {
            Ok(Some(value)) => match self.flatten {
                Some(ref opts) => Ok(Some(value.flatten_object(opts))),
                None => Ok(Some(value)),
            },
            ret => ret,
        };

        self.offset = self.reader.as_ref().len() - slice.len();

        if let Ok(Some(_)) = value {
            tracing::trace!(offset = self.offset, "read record");
        }

        value
    }

    fn reset(&mut self) {
        self.offset = 0;
        self.in_array = false;
    }
}

impl<R: AsRef<[u8]> + Send + Sync + 'static> RecordReader<R> {
    pub fn new(inner: R, opts: Options) -> Result<Self> {
        Ok(Self {
            offset: 0,
            reader: inner,
            flatten: opts.flatten,
            in_array: false,
        })
    }
}

fn skip_whitespace<'a>(reader: &mut &'a [u8]) -> Option<&'a u8> {
    loop {
        let (byte, rem) = reader.split_first()?;
        if !byte.is_ascii_whitespace() {
            return Some(byte);
        }
        *reader = rem;
    }
}

fn deserialize_single<'de, T: Deserialize<'de>>(reader: &mut &'de [u8]) -> Result<T> {
    let mut stream = serde_json::Deserializer::from_slice(*reader).into_iter::<T>();

    match stream.next() {
        Some(Ok(value)) => {
            *reader = &reader[stream.byte_offset()..];
            Ok(value)
        }
        Some(Err(e)) => Err(Error::input(e)),
        None => Err(Error::input("Expected a JSON value, found end of stream")),
    }
}

#[cfg(test)]
fn collect(input: &'static str, opts: Options) -> Result<Vec<Value<'static>>> {
    let mut reader = RecordReader::new(input.as_bytes(), opts)?;
    let mut out = vec![];

    while let Some(value) = reader.next()? {
        out.push(value.into_static());
    }

    Ok(out)
}

#[test]
fn reads_single_document() {
    let rows = collect(r#"{"a": {"b": 1}}"#, Options::default()).unwrap();

    assert_eq!(rows, vec![crate::value!({"a": {"b": 1}})]);
}

#[test]
fn reads_ndjson() {
    let rows = collect("{\"a\": 1}\n{\"a\": 2}\n\n{\"a\": 3}\n", Options::default()).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2], crate::value!({"a": 3}));
}

#[test]
fn reads_top_level_array() {
    let rows = collect(r#" [ {"a": 1} , {"a": {"b": 2}} ] "#, Options::default()).unwrap();

    assert_eq!(rows, vec![crate::value!({"a": 1}), crate::value!({"a": {"b": 2}})]);
}

#[test]
fn empty_inputs_have_no_records() {
    assert!(collect("", Options::default()).unwrap().is_empty());
    assert!(collect("  \n ", Options::default()).unwrap().is_empty());
    assert!(collect("[]", Options::default()).unwrap().is_empty());
}

#[test]
fn flattens_records_when_asked() {
    let opts = Options::flattening(flatten::Options::default());
    let rows = collect(r#"[{"a": {"b": {"c": 1}}, "d": 1}, 5]"#, opts).unwrap();

    assert_eq!(rows, vec![crate::value!({"a.b.c": 1, "d": 1}), Value::Int(5)]);
}

#[test]
fn rejects_missing_comma() {
    let err = collect(r#"[{"a": 1} {"a": 2}]"#, Options::default()).unwrap_err();

    assert!(matches!(err, Error::InputError(_)));
    assert!(err.to_string().contains("Expected `,` or `]`"));
}

#[test]
fn rejects_unterminated_array() {
    let err = collect(r#"[{"a": 1}"#, Options::default()).unwrap_err();

    assert!(matches!(err, Error::InputError(_)));
}

#[test]
fn reset_rewinds() {
    let mut reader = RecordReader::new(&b"[1, 2]"[..], Options::default()).unwrap();

    assert_eq!(reader.next().unwrap(), Some(Value::Int(1)));
    reader.reset();
    assert_eq!(reader.next().unwrap(), Some(Value::Int(1)));
    assert_eq!(reader.next().unwrap(), Some(Value::Int(2)));
    assert_eq!(reader.next().unwrap(), None);
}

#[test]
fn options_from_json() {
    let opts: Options = serde_json::from_str(r#"{"flatten": {"separator": "_"}}"#).unwrap();

    assert_eq!(opts.flatten.unwrap().separator, "_");
    assert!(serde_json::from_str::<Options>("{}").unwrap().flatten.is_none());
}
