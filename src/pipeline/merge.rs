//! Merge functions and the ordered fold.
//!
//! The default merge is shallow: top-level keys of the later document win,
//! nested objects and arrays are replaced wholesale. [`deep`] is available
//! for callers that want recursive object merging.

use serde_json::Value;

/// Shallow merge: later top-level keys overwrite earlier ones.
///
/// Non-object inputs are replaced by the later value.
pub fn shallow(base: Value, next: Value) -> Value {
    match (base, next) {
        (Value::Object(mut base), Value::Object(next)) => {
            for (key, value) in next {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        (_, next) => next,
    }
}

/// Recursive merge: objects merge key-by-key, everything else (arrays
/// included) is replaced by the later value.
pub fn deep(base: Value, next: Value) -> Value {
    match (base, next) {
        (Value::Object(mut base), Value::Object(next)) => {
            for (key, value) in next {
                match base.get_mut(&key) {
                    Some(slot) => {
                        let merged = deep(slot.take(), value);
                        *slot = merged;
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Object(base)
        }
        (_, next) => next,
    }
}

/// Fold parsed documents in resolution order, seeded with the first.
///
/// Returns `None` for an empty input set; the group driver treats that as
/// a no-op.
pub fn reduce<I, F>(values: I, merge: F) -> Option<Value>
where
    I: IntoIterator<Item = Value>,
    F: Fn(Value, Value) -> Value,
{
    let mut values = values.into_iter();
    let first = values.next()?;
    Some(values.fold(first, |acc, value| merge(acc, value)))
}
