//! The POD coercion view: a uniform numeric façade over the boxed primitive
//! types.
//!
//! Any boxed numeric primitive collapses to either a 64-bit integer or a
//! double. Mixed-kind operations promote to double; all-integer operations
//! stay integral, including truncating division. Results are re-boxed as
//! `i64` or `f64` regardless of the input widths.

use std::{any::TypeId, cmp::Ordering};

use crate::{
    exception::{ErrorKind, Exception},
    value::BoxedValue,
};

/// A numeric primitive collapsed to 64-bit form plus its is-float flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PodView {
    Int(i64),
    Float(f64),
}

impl PodView {
    /// Builds a view over a boxed numeric primitive.
    ///
    /// Accepts bool, char, the signed and unsigned integers of widths
    /// 8/16/32/64, the native-width integers, and both float widths.
    /// Anything else is a bad-cast error.
    pub fn from_boxed(value: &BoxedValue) -> Result<Self, Exception> {
        let info = value.type_info();
        let id = info.id();

        macro_rules! as_int {
            ($($ty:ty),*) => {
                $(
                    if id == TypeId::of::<$ty>() {
                        return Ok(Self::Int(value.clone_as::<$ty>()? as i64));
                    }
                )*
            };
        }

        as_int!(i64, i32, i16, i8, u64, u32, u16, u8, isize, usize);
        if id == TypeId::of::<f64>() {
            return Ok(Self::Float(value.clone_as::<f64>()?));
        }
        if id == TypeId::of::<f32>() {
            return Ok(Self::Float(f64::from(value.clone_as::<f32>()?)));
        }
        if id == TypeId::of::<bool>() {
            return Ok(Self::Int(i64::from(value.clone_as::<bool>()?)));
        }
        if id == TypeId::of::<char>() {
            return Ok(Self::Int(i64::from(u32::from(value.clone_as::<char>()?))));
        }
        Err(Exception::new(
            ErrorKind::BadBoxedCast,
            format!("{} is not a numeric type", info.short_name()),
        ))
    }

    /// True iff the boxed value is one of the numeric primitives.
    pub fn supports(value: &BoxedValue) -> bool {
        Self::from_boxed(value).is_ok()
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Float(_))
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Self::Int(v) => v,
            Self::Float(v) => v as i64,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// Truthiness for conditions: non-zero is true.
    pub fn truthy(self) -> bool {
        match self {
            Self::Int(v) => v != 0,
            Self::Float(v) => v != 0.0,
        }
    }

    pub fn add(self, other: Self) -> Result<Self, Exception> {
        Ok(match (self, other) {
            (Self::Int(a), Self::Int(b)) => Self::Int(a.wrapping_add(b)),
            (a, b) => Self::Float(a.as_f64() + b.as_f64()),
        })
    }

    pub fn sub(self, other: Self) -> Result<Self, Exception> {
        Ok(match (self, other) {
            (Self::Int(a), Self::Int(b)) => Self::Int(a.wrapping_sub(b)),
            (a, b) => Self::Float(a.as_f64() - b.as_f64()),
        })
    }

    pub fn mul(self, other: Self) -> Result<Self, Exception> {
        Ok(match (self, other) {
            (Self::Int(a), Self::Int(b)) => Self::Int(a.wrapping_mul(b)),
            (a, b) => Self::Float(a.as_f64() * b.as_f64()),
        })
    }

    /// Division: truncating when both operands are integral, where a zero
    /// divisor is an error; IEEE semantics otherwise.
    pub fn div(self, other: Self) -> Result<Self, Exception> {
        match (self, other) {
            (Self::Int(_), Self::Int(0)) => Err(Exception::eval("division by zero")),
            (Self::Int(a), Self::Int(b)) => Ok(Self::Int(a.wrapping_div(b))),
            (a, b) => Ok(Self::Float(a.as_f64() / b.as_f64())),
        }
    }

    pub fn neg(self) -> Self {
        match self {
            Self::Int(v) => Self::Int(v.wrapping_neg()),
            Self::Float(v) => Self::Float(-v),
        }
    }

    /// Ordering between two views, promoting to double when either is a
    /// float. `None` only when a NaN is involved.
    pub fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    /// Re-boxes the view as `i64` or `f64`.
    pub fn rebox(self) -> BoxedValue {
        match self {
            Self::Int(v) => BoxedValue::new(v),
            Self::Float(v) => BoxedValue::new(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod(value: &BoxedValue) -> PodView {
        PodView::from_boxed(value).unwrap()
    }

    #[test]
    fn integer_widths_collapse_to_i64() {
        assert_eq!(pod(&BoxedValue::new(3_u8)), PodView::Int(3));
        assert_eq!(pod(&BoxedValue::new(-3_i16)), PodView::Int(-3));
        assert_eq!(pod(&BoxedValue::new(7_usize)), PodView::Int(7));
        assert!(!pod(&BoxedValue::new(7_usize)).is_float());
    }

    #[test]
    fn bool_and_char_coerce_to_int() {
        assert_eq!(pod(&BoxedValue::new(true)), PodView::Int(1));
        assert_eq!(pod(&BoxedValue::new('A')), PodView::Int(65));
    }

    #[test]
    fn mixed_arithmetic_promotes_to_float() {
        let result = pod(&BoxedValue::new(1_i64)).add(pod(&BoxedValue::new(0.5_f64))).unwrap();
        assert_eq!(result, PodView::Float(1.5));
        assert!(result.is_float());
    }

    #[test]
    fn integer_division_truncates() {
        let result = PodView::Int(7).div(PodView::Int(2)).unwrap();
        assert_eq!(result, PodView::Int(3));
        let result = PodView::Int(-7).div(PodView::Int(2)).unwrap();
        assert_eq!(result, PodView::Int(-3));
    }

    #[test]
    fn integer_division_by_zero_is_an_error() {
        let err = PodView::Int(1).div(PodView::Int(0)).unwrap_err();
        assert!(err.reason().contains("division by zero"));
    }

    #[test]
    fn float_division_by_zero_follows_ieee() {
        let result = PodView::Float(1.0).div(PodView::Int(0)).unwrap();
        assert_eq!(result, PodView::Float(f64::INFINITY));
    }

    #[test]
    fn comparison_promotes() {
        assert_eq!(PodView::Int(1).compare(PodView::Float(1.0)), Some(Ordering::Equal));
        assert_eq!(PodView::Int(2).compare(PodView::Int(3)), Some(Ordering::Less));
        assert_eq!(PodView::Float(f64::NAN).compare(PodView::Int(0)), None);
    }

    #[test]
    fn non_numeric_is_a_bad_cast() {
        let err = PodView::from_boxed(&BoxedValue::new(String::from("x"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadBoxedCast);
    }
}
