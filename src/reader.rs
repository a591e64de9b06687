use std::borrow::Cow;
use std::io::Read;

use crate::{error::Result, flatten, ReaderOptions};
use indexmap::map::IndexMap;

pub type Map<K, V> = IndexMap<K, V>;
pub type Object<'a> = Map<Cow<'a, str>, Value<'a>>;

#[macro_export]
macro_rules! value {
    ($($json:tt)+) => {{
        $crate::serde_json::from_str::<$crate::Value>(stringify!($($json)+)).unwrap()
    }};
}

/// A JSON-shaped value. `Object` is the only variant the flattener descends
/// into by default; everything else is a leaf.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
#[serde(untagged)]
pub enum Value<'a> {
    #[default]
    Null,
    Bool(bool),
    String(Cow<'a, str>),
    Int(i64),
    Float(f64),
    Array(Vec<Value<'a>>),
    Object(Object<'a>),
}

impl<'a> Value<'a> {
    pub fn is_object(&self) -> bool {
        self.as_object().is_some()
    }

    pub fn as_object(&self) -> Option<&Object<'a>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        self.as_array().is_some()
    }

    pub fn as_array(&self) -> Option<&Vec<Value<'a>>> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&Cow<'a, str>> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Flattens an object value, anything else is returned as is.
    pub fn flatten_object(self, opts: &flatten::Options) -> Self {
        match self {
            Value::Object(map) => Value::Object(flatten::flatten_with(map, opts)),
            other => other,
        }
    }

    pub fn unwrap_object(&self) -> Result<&Object<'a>> {
        match self {
            Value::Object(map) => Ok(map),
            _ => Err("Expected value to be an object".into()),
        }
    }

    pub fn into_static(self) -> Value<'static> {
        match self {
            Value::Null => Value::Null,
            Value::Bool(v) => Value::Bool(v),
            Value::Int(v) => Value::Int(v),
            Value::Float(v) => Value::Float(v),
            Value::String(s) => Value::String(Cow::Owned(s.into_owned())),
            Value::Array(values) => {
                Value::Array(values.into_iter().map(Value::into_static).collect())
            }
            Value::Object(object) => Value::Object(
                object
                    .into_iter()
                    .map(|(k, v)| (Cow::Owned(k.into_owned()), v.into_static()))
                    .collect(),
            ),
        }
    }
}

impl<'a> From<Object<'a>> for Value<'a> {
    fn from(object: Object<'a>) -> Self {
        Value::Object(object)
    }
}

pub trait ValueReader: Send + Sync {
    fn next(&mut self) -> Result<Option<Value<'_>>>;

    fn reset(&mut self);
}

impl<T: ValueReader + ?Sized> ValueReader for Box<T> {
    fn next(&mut self) -> Result<Option<Value<'_>>> {
        (**self).next()
    }
    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Opens `path` for reading, `-` reads all of stdin up front.
pub fn new_reader(path: &str, options: ReaderOptions) -> Result<Box<dyn ValueReader>> {
    let ReaderOptions::Json(opts) = options;

    if path == "-" {
        let mut data = Vec::new();
        std::io::stdin().lock().read_to_end(&mut data)?;
        tracing::debug!(bytes = data.len(), "read input from stdin");
        return Ok(
            Box::new(crate::json::reader::RecordReader::new(data, opts)?) as Box<dyn ValueReader>,
        );
    }

    let input_file = std::fs::File::open(path)?;

    // Mapping a zero-length file is not portable.
    if input_file.metadata()?.len() == 0 {
        tracing::debug!(path, "input file is empty");
        return Ok(Box::new(crate::json::reader::RecordReader::new(
            Vec::<u8>::new(),
            opts,
        )?) as Box<dyn ValueReader>);
    }

    let data = unsafe { memmap2::Mmap::map(&input_file)? };
    tracing::debug!(path, bytes = data.len(), "mapped input file");

    Ok(Box::new(crate::json::reader::RecordReader::new(data, opts)?) as Box<dyn ValueReader>)
}

#[test]
fn value_accessors() {
    let v = value!({"a": 1, "b": [true, null], "c": 1.5, "d": "x"});
    let object = v.as_object().unwrap();

    assert_eq!(object["a"].as_int(), Some(1));
    assert!(object["b"].is_array());
    assert_eq!(object["c"].as_float(), Some(1.5));
    assert_eq!(object["d"].as_string().map(|s| s.as_ref()), Some("x"));
    assert!(object["b"].as_array().unwrap()[1].is_null());
    assert!(Value::Int(1).unwrap_object().is_err());
}

#[test]
fn flatten_object_leaves_non_objects_alone() {
    let opts = flatten::Options::default();
    assert_eq!(Value::Int(3).flatten_object(&opts), Value::Int(3));
    assert_eq!(
        value!([{"a": {"b": 1}}]).flatten_object(&opts),
        value!([{"a": {"b": 1}}])
    );
    assert_eq!(
        value!({"a": {"b": 1}}).flatten_object(&opts),
        value!({"a.b": 1})
    );
}

#[test]
fn into_static_keeps_content() {
    let owned = {
        let text = String::from(r#"{"k": ["v", {"n": 2}]}"#);
        let borrowed: Value = serde_json::from_str(&text).unwrap();
        borrowed.into_static()
    };
    assert_eq!(owned, value!({"k": ["v", {"n": 2}]}));
}
