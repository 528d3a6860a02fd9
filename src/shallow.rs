//! Shallow equality used to skip redundant repaints.
//!
//! Shared values (`Arc`) compare by pointer, plain values by `==`. Callers are
//! expected to hand over a new `Arc` whenever the contents change.

use std::sync::Arc;

pub trait ShallowEq {
    fn shallow_eq(&self, other: &Self) -> bool;
}

impl<T: ?Sized> ShallowEq for Arc<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: ShallowEq> ShallowEq for Option<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.shallow_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}

macro_rules! shallow_by_value {
    ($($t:ty),*) => {
        $(impl ShallowEq for $t {
            fn shallow_eq(&self, other: &Self) -> bool {
                self == other
            }
        })*
    };
}

shallow_by_value!(bool, u32, u64, usize, f32, String);
