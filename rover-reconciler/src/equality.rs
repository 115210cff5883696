//! Structural equality over property values.
//!
//! Used by `prepare_update` to skip commits whose property bags only differ
//! by identity. The comparison is bounded: once it descends past
//! [`MAX_COMPARE_DEPTH`] levels the values are reported as different, which
//! keeps it total on cyclic `Shared` values.

use crate::value::{PropValue, Props};
use std::collections::HashMap;
use std::rc::Rc;

/// Deepest nesting level that is still compared. Anything below it counts as
/// "not equal".
pub const MAX_COMPARE_DEPTH: usize = 100;

/// Compare two values starting from the top level
pub fn is_same(a: &PropValue, b: &PropValue) -> bool {
    is_same_at_depth(a, b, 0)
}

/// Compare two values that sit `depth` levels below the root of the comparison
pub fn is_same_at_depth(a: &PropValue, b: &PropValue, depth: usize) -> bool {
    if depth > MAX_COMPARE_DEPTH {
        return false;
    }

    match (a, b) {
        (PropValue::Nil, PropValue::Nil) => true,
        (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
        (PropValue::Int(a), PropValue::Int(b)) => a == b,
        (PropValue::Float(a), PropValue::Float(b)) => same_number(*a, *b),
        (PropValue::Int(a), PropValue::Float(b)) | (PropValue::Float(b), PropValue::Int(a)) => {
            same_number(*a as f64, *b)
        }
        (PropValue::String(a), PropValue::String(b)) => a == b,
        (PropValue::Date(a), PropValue::Date(b)) => a == b,
        (PropValue::Callback(a), PropValue::Callback(b)) => a.ptr_eq(b),
        (PropValue::List(a), PropValue::List(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .zip(b)
                    .all(|(a, b)| is_same_at_depth(a, b, depth + 1))
        }
        (PropValue::Set(a), PropValue::Set(b)) => {
            a.len() == b.len() && contains_all(a, b, depth) && contains_all(b, a, depth)
        }
        (PropValue::Map(a), PropValue::Map(b)) | (PropValue::Object(a), PropValue::Object(b)) => {
            same_entries(a, b, depth)
        }
        (PropValue::Shared(a), PropValue::Shared(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            is_same_at_depth(&a.borrow(), &b.borrow(), depth + 1)
        }
        _ => false,
    }
}

/// Symmetric comparison of two bags: a key present in only one of them is a
/// difference, whatever its value.
pub fn props_equal(old: &Props, new: &Props) -> bool {
    same_entries(old, new, 0)
}

fn same_number(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        true
    } else {
        a == b
    }
}

fn contains_all(needles: &[PropValue], haystack: &[PropValue], depth: usize) -> bool {
    needles.iter().all(|needle| {
        haystack
            .iter()
            .any(|candidate| is_same_at_depth(needle, candidate, depth + 1))
    })
}

fn same_entries<K>(a: &HashMap<K, PropValue>, b: &HashMap<K, PropValue>, depth: usize) -> bool
where
    K: std::hash::Hash + Eq,
{
    if a.len() != b.len() {
        return false;
    }

    a.iter().all(|(key, value)| match b.get(key) {
        Some(other) => is_same_at_depth(value, other, depth + 1),
        None => false,
    })
}
