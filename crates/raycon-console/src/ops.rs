//! Arithmetic on [`Argument`]s: type promotion, broadcasting, and the
//! per-kind element rules.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::argument::{Argument, ArgumentKind, element_as_f64, format_f32, format_f64};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// Operator character as written in a statement.
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

/// Apply `op` element-wise after promoting both sides to their common kind.
///
/// A scalar on the right is always broadcast over a vector on the left. A
/// scalar on the left is broadcast only when it already has the common kind;
/// if it would need promotion the left operand is returned unchanged. Any
/// other length mismatch also returns the left operand unchanged.
pub fn apply(lhs: &Argument, rhs: &Argument, op: BinaryOp) -> Argument {
    if lhs.is_none() {
        return rhs.clone();
    }
    if rhs.is_none() {
        return lhs.clone();
    }

    let kind = lhs.kind().common(rhs.kind());
    let left = lhs.convert(kind);
    let right = rhs.convert(kind);
    let (m, n) = (left.len(), right.len());

    let pairs: Vec<(&str, &str)> = if m == n {
        left.elements()
            .iter()
            .zip(right.elements())
            .map(|(a, b)| (a.as_str(), b.as_str()))
            .collect()
    } else if n == 1 {
        let b = right.elements()[0].as_str();
        left.elements().iter().map(|a| (a.as_str(), b)).collect()
    } else if m == 1 && lhs.kind() == kind {
        let a = left.elements()[0].as_str();
        right.elements().iter().map(|b| (a, b.as_str())).collect()
    } else {
        return lhs.clone();
    };

    let elements = pairs
        .into_iter()
        .map(|(a, b)| combine(kind, op, a, b))
        .collect();
    let origin = format!("{} {} {}", lhs.origin(), op.symbol(), rhs.origin());
    Argument::new(kind, elements, origin)
}

fn division_by_zero(a: &str, b: &str) -> String {
    format!("Division by zero: {a}/{b}")
}

macro_rules! integer_op {
    ($ty:ty, $op:expr, $a:expr, $b:expr) => {{
        match ($a.parse::<$ty>(), $b.parse::<$ty>()) {
            (Ok(x), Ok(y)) => match $op {
                BinaryOp::Add => x.wrapping_add(y).to_string(),
                BinaryOp::Sub => x.wrapping_sub(y).to_string(),
                BinaryOp::Mul => x.wrapping_mul(y).to_string(),
                BinaryOp::Div if y == 0 => division_by_zero($a, $b),
                BinaryOp::Div => x.wrapping_div(y).to_string(),
            },
            _ => $a.to_string(),
        }
    }};
}

macro_rules! float_op {
    ($ty:ty, $format:expr, $op:expr, $a:expr, $b:expr) => {{
        match ($a.parse::<$ty>(), $b.parse::<$ty>()) {
            (Ok(x), Ok(y)) => match $op {
                BinaryOp::Add => $format(x + y),
                BinaryOp::Sub => $format(x - y),
                BinaryOp::Mul => $format(x * y),
                BinaryOp::Div if y == 0.0 => division_by_zero($a, $b),
                BinaryOp::Div => $format(x / y),
            },
            _ => $a.to_string(),
        }
    }};
}

fn combine(kind: ArgumentKind, op: BinaryOp, a: &str, b: &str) -> String {
    match kind {
        ArgumentKind::Bool => bool_op(op, a, b),
        ArgumentKind::Int32 => integer_op!(i32, op, a, b),
        ArgumentKind::Int64 => integer_op!(i64, op, a, b),
        ArgumentKind::UInt64 => integer_op!(u64, op, a, b),
        ArgumentKind::Float => float_op!(f32, format_f32, op, a, b),
        ArgumentKind::Double => float_op!(f64, format_f64, op, a, b),
        ArgumentKind::String if op == BinaryOp::Add => format!("{a}{b}"),
        ArgumentKind::String | ArgumentKind::Unknown | ArgumentKind::None => a.to_string(),
    }
}

/// Bool elements act like flags rather than numbers.
fn bool_op(op: BinaryOp, a: &str, b: &str) -> String {
    let (Some(x), Some(y)) = (element_as_f64(a), element_as_f64(b)) else {
        return a.to_string();
    };
    match op {
        BinaryOp::Add if x > 0.0 || y > 0.0 => "1".to_string(),
        BinaryOp::Sub if y > 0.0 => "0".to_string(),
        BinaryOp::Mul if y == 0.0 => "0".to_string(),
        BinaryOp::Div if y == 0.0 => division_by_zero(a, b),
        _ => a.to_string(),
    }
}

/// Negate numeric elements. Bool elements become Int32. Unsigned values
/// become Int64 when every element fits, otherwise Double. Other kinds are
/// returned unchanged.
pub fn negate(arg: &Argument) -> Argument {
    let kind = match arg.kind() {
        ArgumentKind::Bool => ArgumentKind::Int32,
        ArgumentKind::UInt64 => {
            let fits = arg
                .elements()
                .iter()
                .all(|e| e.parse::<u64>().is_ok_and(|v| v <= i64::MAX as u64));
            if fits {
                ArgumentKind::Int64
            } else {
                ArgumentKind::Double
            }
        },
        k => k,
    };
    let promoted = arg.convert(kind);
    let elements = promoted
        .elements()
        .iter()
        .map(|e| negate_element(kind, e).unwrap_or_else(|| e.clone()))
        .collect();
    Argument::new(kind, elements, format!("-{}", arg.origin()))
}

fn negate_element(kind: ArgumentKind, e: &str) -> Option<String> {
    match kind {
        ArgumentKind::Int32 => e.parse::<i32>().ok().map(|v| v.wrapping_neg().to_string()),
        ArgumentKind::Int64 => e.parse::<i64>().ok().map(|v| v.wrapping_neg().to_string()),
        ArgumentKind::Float => e.parse::<f32>().ok().map(|v| format_f32(-v)),
        ArgumentKind::Double => e.parse::<f64>().ok().map(|v| format_f64(-v)),
        _ => None,
    }
}

impl Add for &Argument {
    type Output = Argument;

    fn add(self, rhs: &Argument) -> Argument {
        apply(self, rhs, BinaryOp::Add)
    }
}

impl Sub for &Argument {
    type Output = Argument;

    fn sub(self, rhs: &Argument) -> Argument {
        apply(self, rhs, BinaryOp::Sub)
    }
}

impl Mul for &Argument {
    type Output = Argument;

    fn mul(self, rhs: &Argument) -> Argument {
        apply(self, rhs, BinaryOp::Mul)
    }
}

impl Div for &Argument {
    type Output = Argument;

    fn div(self, rhs: &Argument) -> Argument {
        apply(self, rhs, BinaryOp::Div)
    }
}

impl Neg for &Argument {
    type Output = Argument;

    fn neg(self) -> Argument {
        negate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i32]) -> Argument {
        Argument::new(
            ArgumentKind::Int32,
            values.iter().map(i32::to_string).collect(),
            "ints",
        )
    }

    #[test]
    fn same_length_elementwise() {
        let r = &ints(&[1, 2, 3]) + &ints(&[10, 20, 30]);
        assert_eq!(r.elements(), ["11", "22", "33"]);
        assert_eq!(r.kind(), ArgumentKind::Int32);
    }

    #[test]
    fn left_scalar_broadcasts() {
        let r = &ints(&[2]) + &ints(&[1, 2, 3]);
        assert_eq!(r, ints(&[3, 4, 5]).with_origin("ints + ints"));
    }

    #[test]
    fn right_scalar_broadcasts() {
        let r = &ints(&[1, 2, 3]) + &ints(&[2]);
        assert_eq!(r.elements(), ["3", "4", "5"]);
    }

    #[test]
    fn promoted_left_scalar_does_not_broadcast() {
        // The literal `1` is a Bool; against an Int32 vector it would need
        // promotion, so the left operand comes back untouched.
        let one = Argument::from_literal("1");
        let r = &one + &ints(&[1, 2, 3]);
        assert_eq!(r, one);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn mismatched_vectors_return_left() {
        let left = ints(&[1, 2]);
        let r = &left + &ints(&[1, 2, 3]);
        assert_eq!(r, left);
    }

    #[test]
    fn int_plus_float_promotes() {
        let r = &Argument::from_literal("2") + &Argument::from_literal("0.5");
        assert_eq!(r.kind(), ArgumentKind::Float);
        assert_eq!(r.elements(), ["2.5"]);
    }

    #[test]
    fn division_by_zero_is_inline() {
        let r = &ints(&[10]) / &ints(&[0]);
        assert_eq!(r.len(), 1);
        assert!(r.elements()[0].contains("Division by zero"));
        assert_eq!(r.elements()[0], "Division by zero: 10/0");
    }

    #[test]
    fn division_by_zero_only_poisons_its_element() {
        let r = &ints(&[10, 20, 30]) / &ints(&[2, 0, 3]);
        assert_eq!(r.elements()[0], "5");
        assert_eq!(r.elements()[1], "Division by zero: 20/0");
        assert_eq!(r.elements()[2], "10");
    }

    #[test]
    fn float_division_by_zero_is_inline() {
        let r = &Argument::from_literal("1.5") / &Argument::from_literal("0.0");
        assert_eq!(r.elements(), ["Division by zero: 1.5/0.0"]);
    }

    #[test]
    fn string_concatenates_and_ignores_other_ops() {
        let a = Argument::string("ray");
        let b = Argument::string("tracer");
        assert_eq!((&a + &b).elements(), ["raytracer"]);
        assert_eq!((&a - &b).elements(), ["ray"]);
        assert_eq!((&a * &b).elements(), ["ray"]);
    }

    #[test]
    fn string_pulls_numbers_to_text() {
        let r = &Argument::string("bounces=") + &Argument::from_literal("4");
        assert_eq!(r.kind(), ArgumentKind::String);
        assert_eq!(r.elements(), ["bounces=4"]);
    }

    #[test]
    fn bool_rules() {
        let t = Argument::from_literal("true");
        let f = Argument::from_literal("false");
        assert_eq!((&f + &t).elements(), ["1"]);
        assert_eq!((&f + &f).elements(), ["0"]);
        assert_eq!((&t - &t).elements(), ["0"]);
        assert_eq!((&t - &f).elements(), ["1"]);
        assert_eq!((&t * &f).elements(), ["0"]);
        assert_eq!((&t * &t).elements(), ["1"]);
        assert!((&t / &f).elements()[0].starts_with("Division by zero"));
    }

    #[test]
    fn none_is_identity() {
        let a = ints(&[4]);
        assert_eq!(&Argument::none() + &a, a);
        assert_eq!(&a - &Argument::none(), a);
    }

    #[test]
    fn origin_describes_operation() {
        let a = Argument::from_literal("2").with_origin("Speed");
        let b = Argument::from_literal("3");
        assert_eq!((&a * &b).origin(), "Speed * 3");
    }

    #[test]
    fn integer_overflow_wraps() {
        let r = &ints(&[i32::MAX]) + &ints(&[1]);
        assert_eq!(r.elements(), [i32::MIN.to_string()]);
    }

    #[test]
    fn negate_numbers() {
        assert_eq!((-&ints(&[3, -4])).elements(), ["-3", "4"]);
        assert_eq!((-&Argument::from_literal("2.5")).elements(), ["-2.5"]);
        let big = Argument::from_literal("18446744073709551615");
        assert_eq!((-&big).kind(), ArgumentKind::Double);
        let small = Argument::new(ArgumentKind::UInt64, vec!["5".into()], "u");
        let neg = -&small;
        assert_eq!(neg.kind(), ArgumentKind::Int64);
        assert_eq!(neg.elements(), ["-5"]);
    }

    #[test]
    fn negate_bool_literals_as_integers() {
        let one = -&Argument::from_literal("1");
        assert_eq!(one.kind(), ArgumentKind::Int32);
        assert_eq!(one.elements(), ["-1"]);
        assert_eq!((-&Argument::from_literal("0")).elements(), ["0"]);
        assert_eq!((-&Argument::from_literal("true")).elements(), ["-1"]);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn add_then_sub_restores_int32(
                pairs in proptest::collection::vec((any::<i32>(), any::<i32>()), 1..6),
            ) {
                let (xs, ys): (Vec<i32>, Vec<i32>) = pairs.into_iter().unzip();
                let a = ints(&xs);
                let b = ints(&ys);
                let back = &(&a + &b) - &b;
                prop_assert_eq!(back.elements(), a.elements());
            }

            #[test]
            fn add_then_sub_restores_int64(x in any::<i64>(), y in any::<i64>()) {
                let a = Argument::new(ArgumentKind::Int64, vec![x.to_string()], "a");
                let b = Argument::new(ArgumentKind::Int64, vec![y.to_string()], "b");
                let back = &(&a + &b) - &b;
                prop_assert_eq!(back.elements(), a.elements());
            }

            #[test]
            fn right_scalar_broadcast_matches_length(
                xs in proptest::collection::vec(-1000i32..1000, 2..8),
                k in -1000i32..1000,
            ) {
                let r = &ints(&xs) + &ints(&[k]);
                prop_assert_eq!(r.len(), xs.len());
                for (e, x) in r.elements().iter().zip(&xs) {
                    prop_assert_eq!(e.clone(), (x + k).to_string());
                }
            }
        }
    }
}
