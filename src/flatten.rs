//! Collapses nested objects into a single level keyed by joined paths.
//!
//! `{"a": {"b": {"c": 1}}, "d": 1}` becomes `{"a.b.c": 1, "d": 1}`. Every leaf
//! reachable from the root lands under the path of keys leading to it, empty
//! objects vanish and `null` is kept as a leaf. Keys come out in depth-first
//! order. If two paths collide the later value wins and the key stays where
//! it was first inserted.
//!
//! `Value` trees own their children, so the input is acyclic and the walk
//! always terminates.

use std::borrow::Cow;

use crate::reader::{Object, Value};

pub const DEFAULT_SEPARATOR: &str = ".";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
pub enum ArrayMode {
    /// Arrays are values like any other leaf.
    #[default]
    #[serde(rename = "leaf")]
    Leaf,
    /// Arrays are walked like objects keyed by element index.
    #[serde(rename = "index")]
    Index,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct Options {
    pub prefix: Option<String>,
    pub separator: String,
    pub arrays: ArrayMode,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            prefix: None,
            separator: DEFAULT_SEPARATOR.to_string(),
            arrays: ArrayMode::default(),
        }
    }
}

impl Options {
    pub fn with_prefix<T: Into<String>>(mut self, prefix: T) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_separator<T: Into<String>>(mut self, separator: T) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_arrays(mut self, arrays: ArrayMode) -> Self {
        self.arrays = arrays;
        self
    }

    fn descends_into(&self, value: &Value) -> bool {
        match value {
            Value::Object(_) => true,
            Value::Array(_) => self.arrays == ArrayMode::Index,
            _ => false,
        }
    }
}

pub fn flatten(object: Object<'_>) -> Object<'_> {
    flatten_with(object, &Options::default())
}

pub fn flatten_prefixed<'a>(object: Object<'a>, prefix: &str) -> Object<'a> {
    flatten_with(object, &Options::default().with_prefix(prefix))
}

pub fn flatten_with<'a>(object: Object<'a>, opts: &Options) -> Object<'a> {
    let prefix = opts.prefix.as_deref().filter(|p| !p.is_empty());

    if prefix.is_none() && !object.values().any(|value| opts.descends_into(value)) {
        return object;
    }

    let mut dest = Object::new();
    dest.reserve(object.len());
    insert_object(&mut dest, prefix.map(Cow::Borrowed), object, opts);
    dest
}

fn join<'a>(prefix: &Option<Cow<str>>, key: Cow<'a, str>, separator: &str) -> Cow<'a, str> {
    match prefix {
        None => key,
        Some(prefix) => Cow::Owned(format!("{}{}{}", prefix, separator, key)),
    }
}

fn insert_object<'a>(
    dest: &mut Object<'a>,
    prefix: Option<Cow<str>>,
    object: Object<'a>,
    opts: &Options,
) {
    for (k, value) in object {
        let key = join(&prefix, k, &opts.separator);
        insert_value(dest, key, value, opts);
    }
}

fn insert_array<'a>(
    dest: &mut Object<'a>,
    prefix: Cow<str>,
    values: Vec<Value<'a>>,
    opts: &Options,
) {
    let prefix = Some(prefix);

    for (idx, value) in values.into_iter().enumerate() {
        let key = join(&prefix, Cow::Owned(idx.to_string()), &opts.separator);
        insert_value(dest, key, value, opts);
    }
}

fn insert_value<'a>(dest: &mut Object<'a>, key: Cow<'a, str>, value: Value<'a>, opts: &Options) {
    match value {
        Value::Object(object) => insert_object(dest, Some(key), object, opts),
        Value::Array(values) if opts.arrays == ArrayMode::Index => {
            insert_array(dest, key, values, opts)
        }
        other => {
            dest.insert(key, other);
        }
    }
}

#[cfg(test)]
fn keys(object: &Object) -> Vec<String> {
    object.keys().map(|k| k.to_string()).collect()
}

#[cfg(test)]
fn flat(value: Value<'static>) -> Object<'static> {
    match value {
        Value::Object(object) => flatten(object),
        other => panic!("expected an object, got {:?}", other),
    }
}

#[test]
fn nested_paths() {
    let out = flat(crate::value!({"a": {"b": {"c": 1}}, "d": 1}));

    assert_eq!(Value::Object(out), crate::value!({"a.b.c": 1, "d": 1}));
}

#[test]
fn empty_input() {
    assert!(flatten(Object::new()).is_empty());
    assert!(flat(crate::value!({})).is_empty());
}

#[test]
fn empty_nested_objects_vanish() {
    let out = flat(crate::value!({"x": {"y": {}}, "z": 2}));

    assert_eq!(Value::Object(out), crate::value!({"z": 2}));
}

#[test]
fn null_is_a_leaf() {
    let out = flat(crate::value!({"a": null, "b": {"c": null}}));

    assert_eq!(Value::Object(out), crate::value!({"a": null, "b.c": null}));
}

#[test]
fn flat_input_is_unchanged() {
    let input = crate::value!({"s": "x", "n": 1.5, "b": false, "l": [1, {"k": 2}]});
    let out = flat(input.clone());

    assert_eq!(Value::Object(out), input);
}

#[test]
fn depth_first_key_order() {
    let out = flat(crate::value!({"b": {"y": 1, "x": {"q": 2}}, "a": 3, "c": {"z": 4}}));

    assert_eq!(keys(&out), ["b.y", "b.x.q", "a", "c.z"]);
    assert!(out.values().all(|v| !v.is_object()));
}

#[test]
fn prefix_is_applied_to_every_key() {
    let object = flat_object(crate::value!({"a": {"b": 1}, "c": 2}));
    let out = flatten_prefixed(object, "root");

    assert_eq!(keys(&out), ["root.a.b", "root.c"]);
}

#[test]
fn empty_prefix_means_none() {
    let object = flat_object(crate::value!({"a": {"b": 1}}));
    let out = flatten_prefixed(object, "");

    assert_eq!(keys(&out), ["a.b"]);
}

#[test]
fn custom_separator() {
    let object = flat_object(crate::value!({"a": {"b": {"c": true}}}));
    let opts = Options::default().with_separator("/").with_prefix("doc");
    let out = flatten_with(object, &opts);

    assert_eq!(keys(&out), ["doc/a/b/c"]);
}

#[test]
fn arrays_are_leaves_by_default() {
    let out = flat(crate::value!({"a": {"list": [{"b": 1}, 2]}}));

    assert_eq!(Value::Object(out), crate::value!({"a.list": [{"b": 1}, 2]}));
}

#[test]
fn arrays_by_index() {
    let object = flat_object(crate::value!({"a": [{"b": 1}, 2, []], "c": []}));
    let out = flatten_with(object, &Options::default().with_arrays(ArrayMode::Index));

    assert_eq!(Value::Object(out), crate::value!({"a.0.b": 1, "a.1": 2}));
}

#[test]
fn top_level_array_values_trigger_walk_in_index_mode() {
    let object = flat_object(crate::value!({"a": [1, 2]}));
    let out = flatten_with(object, &Options::default().with_arrays(ArrayMode::Index));

    assert_eq!(keys(&out), ["a.0", "a.1"]);
}

#[test]
fn collisions_last_write_wins() {
    let out = flat(crate::value!({"a.b": 1, "z": 0, "a": {"b": 2}}));

    assert_eq!(keys(&out), ["a.b", "z"]);
    assert_eq!(out["a.b"], Value::Int(2));
}

#[test]
fn every_leaf_appears_once() {
    let out = flat(crate::value!({
        "server": {"host": "localhost", "ports": {"http": 80, "https": 443}},
        "debug": false,
        "owner": {"name": null}
    }));

    assert_eq!(out.len(), 5);
    assert_eq!(out["server.host"], Value::String("localhost".into()));
    assert_eq!(out["server.ports.http"], Value::Int(80));
    assert_eq!(out["server.ports.https"], Value::Int(443));
    assert_eq!(out["debug"], Value::Bool(false));
    assert_eq!(out["owner.name"], Value::Null);
}

#[test]
fn options_from_json() {
    let opts: Options = serde_json::from_str(r#"{"separator": "_", "arrays": "index"}"#).unwrap();

    assert_eq!(opts.prefix, None);
    assert_eq!(opts.separator, "_");
    assert_eq!(opts.arrays, ArrayMode::Index);
    assert_eq!(serde_json::from_str::<Options>("{}").unwrap(), Options::default());
}

#[cfg(test)]
fn flat_object(value: Value<'static>) -> Object<'static> {
    match value {
        Value::Object(object) => object,
        other => panic!("expected an object, got {:?}", other),
    }
}
