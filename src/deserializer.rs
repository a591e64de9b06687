use crate::reader::{Object, Value};
use core::fmt;

use serde::{
    de::{MapAccess, SeqAccess, Visitor},
    Deserialize,
};
use std::borrow::Cow;

impl<'de> Deserialize<'de> for Value<'de> {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value<'de>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid JSON value")
            }

            #[inline]
            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            #[inline]
            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Int(value))
            }

            // Integers past i64::MAX keep their magnitude as floats.
            #[inline]
            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(match i64::try_from(value) {
                    Ok(v) => Value::Int(v),
                    Err(_) => Value::Float(value as f64),
                })
            }

            #[inline]
            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Float(value))
            }

            #[inline]
            fn visit_borrowed_str<E>(self, value: &'de str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Value::String(Cow::Borrowed(value)))
            }

            // Strings with escapes can't borrow from the input.
            #[inline]
            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Value::String(Cow::Owned(value.to_owned())))
            }

            // JSON `null`.
            #[inline]
            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            #[inline]
            fn visit_seq<V>(self, mut visitor: V) -> Result<Self::Value, V::Error>
            where
                V: SeqAccess<'de>,
            {
                let mut vec = Vec::with_capacity(visitor.size_hint().unwrap_or(0));

                while let Some(elem) = visitor.next_element()? {
                    vec.push(elem);
                }

                Ok(Value::Array(vec))
            }

            // A repeated key keeps its first position and takes the last value.
            fn visit_map<V>(self, mut visitor: V) -> Result<Self::Value, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut map = Object::with_capacity(visitor.size_hint().unwrap_or(0));
                while let Some((key, value)) = visitor.next_entry::<Cow<'de, str>, Value<'de>>()? {
                    map.insert(key, value);
                }

                Ok(Value::Object(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[test]
fn deserialize_preserves_key_order() {
    let value: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
    let keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(|k| k.as_ref())
        .collect();

    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn deserialize_scalars() {
    let value: Value =
        serde_json::from_str(r#"[null, true, -3, 18446744073709551615, 2.5, "s"]"#).unwrap();

    assert_eq!(
        value,
        Value::Array(vec![
            Value::Null,
            Value::Bool(true),
            Value::Int(-3),
            Value::Float(18446744073709551615u64 as f64),
            Value::Float(2.5),
            Value::String("s".into()),
        ])
    );
}

#[test]
fn duplicate_keys_last_write_wins() {
    let value: Value = serde_json::from_str(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
    let object = value.as_object().unwrap();

    assert_eq!(object.len(), 2);
    assert_eq!(object.get_index(0), Some((&Cow::Borrowed("a"), &Value::Int(3))));
}

#[test]
fn strings_borrow_unless_escaped() {
    let value: Value = serde_json::from_str(r#"["plain", "tab\there", null]"#).unwrap();
    let items = value.as_array().unwrap();

    assert!(matches!(items[0], Value::String(Cow::Borrowed("plain"))));
    assert!(matches!(items[1], Value::String(Cow::Owned(ref s)) if s == "tab\there"));
    assert!(items[2].is_null());
}
