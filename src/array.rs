//! Slice helpers whose callbacks see the element, its index and the whole
//! slice.

use crate::{Error, Result, Value};

pub fn filter<T, F>(items: &[T], mut predicate: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T, usize, &[T]) -> bool,
{
    let mut out = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        if predicate(item, idx, items) {
            out.push(item.clone());
        }
    }

    out
}

pub fn map<T, U, F>(items: &[T], mut f: F) -> Vec<U>
where
    F: FnMut(&T, usize, &[T]) -> U,
{
    let mut out = Vec::with_capacity(items.len());

    for (idx, item) in items.iter().enumerate() {
        out.push(f(item, idx, items));
    }

    out
}

/// Largest value strictly below the maximum, found in one pass.
///
/// Returns `None` for fewer than two items or when every item equals the
/// maximum. Items that do not compare (NaN) are skipped.
pub fn second_largest<T>(items: &[T]) -> Option<T>
where
    T: PartialOrd + Clone,
{
    if items.len() < 2 {
        return None;
    }

    let mut largest: Option<&T> = None;
    let mut second: Option<&T> = None;

    for item in items {
        if item.partial_cmp(item).is_none() {
            continue;
        }

        match largest {
            None => largest = Some(item),
            Some(max) if item > max => {
                second = largest;
                largest = Some(item);
            }
            Some(max) if item < max => {
                if second.map_or(true, |s| item > s) {
                    second = Some(item);
                }
            }
            Some(_) => {}
        }
    }

    second.cloned()
}

/// `second_largest` over JSON numbers. All-integer input stays integral,
/// anything mixed with floats is compared as floats. Returns `Value::Null`
/// when there is no second largest.
pub fn second_largest_number<'a>(values: &[Value<'a>]) -> Result<Value<'a>> {
    if values.iter().all(|v| v.as_int().is_some()) {
        let ints = map(values, |v, _, _| v.as_int().unwrap_or_default());
        return Ok(second_largest(&ints).map_or(Value::Null, Value::Int));
    }

    let floats = values
        .iter()
        .map(|v| {
            v.as_float().ok_or_else(|| {
                Error::input(format!(
                    "Expected a number, found {}",
                    serde_json::to_string(v).unwrap_or_default()
                ))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(second_largest(&floats).map_or(Value::Null, Value::Float))
}

#[test]
fn filter_keeps_matching_in_order() {
    let nums = [23, 5, 43, 78, 0];

    assert_eq!(filter(&nums, |n, _, _| *n > 5), vec![23, 43, 78]);
    assert!(filter(&nums, |_, _, _| false).is_empty());
    assert!(filter::<i32, _>(&[], |_, _, _| true).is_empty());
}

#[test]
fn filter_sees_index_and_slice() {
    let words = ["a", "b", "c", "d"];
    let odd = filter(&words, |_, idx, all| idx % 2 == 1 && all.len() == 4);

    assert_eq!(odd, vec!["b", "d"]);
}

#[test]
fn map_transforms_every_element() {
    let nums = [2, 4, 6, 8];

    assert_eq!(map(&nums, |n, _, _| n * 4), vec![8, 16, 24, 32]);
    assert_eq!(
        map(&nums, |n, idx, all| format!("{}/{}:{}", idx, all.len(), n)),
        vec!["0/4:2", "1/4:4", "2/4:6", "3/4:8"]
    );
}

#[test]
fn second_largest_of_distinct() {
    assert_eq!(second_largest(&[2, 4, 6, 8]), Some(6));
    assert_eq!(second_largest(&[8, 2, 6, 4]), Some(6));
    assert_eq!(second_largest(&[-5, -1, -3]), Some(-3));
}

#[test]
fn second_largest_needs_two_values() {
    assert_eq!(second_largest(&[8]), None);
    assert_eq!(second_largest::<i32>(&[]), None);
    assert_eq!(second_largest(&[7, 7, 7]), None);
}

#[test]
fn second_largest_ignores_duplicate_maximum() {
    assert_eq!(second_largest(&[8, 8, 3, 8]), Some(3));
    assert_eq!(second_largest(&[1.5, f64::NAN, 0.5]), Some(0.5));
}

#[test]
fn second_largest_number_keeps_integers() {
    let numbers = crate::value!([2, 4, 6, 8]);
    let numbers = numbers.as_array().unwrap();

    assert_eq!(second_largest_number(numbers).unwrap(), Value::Int(6));
    assert_eq!(serde_json::to_string(&second_largest_number(numbers).unwrap()).unwrap(), "6");
}

#[test]
fn second_largest_number_mixed_and_missing() {
    let mixed = crate::value!([1, 2.5, 2]);
    assert_eq!(second_largest_number(mixed.as_array().unwrap()).unwrap(), Value::Float(2.0));

    let single = crate::value!([8]);
    assert_eq!(second_largest_number(single.as_array().unwrap()).unwrap(), Value::Null);
    assert_eq!(second_largest_number(&[]).unwrap(), Value::Null);
}

#[test]
fn second_largest_number_rejects_non_numbers() {
    let values = crate::value!([1, "two"]);
    let err = second_largest_number(values.as_array().unwrap()).unwrap_err();

    assert!(matches!(err, Error::InputError(_)));
}
