//! Conversion between [`Argument`]s and native Rust values.
//!
//! Scalars require exactly one element; fixed-size arrays (`[f32; 3]` for a
//! position, `[f32; 2]` for a resolution) require exactly `N` elements.

use raycon_types::error::CommandError;

use crate::argument::{
    Argument, ArgumentKind, bool_element, element_as_f64, format_f32, format_f64,
    parse_bool_token,
};

/// Read a native value out of an argument.
pub trait FromArgument: Sized {
    fn from_argument(arg: &Argument) -> Result<Self, CommandError>;
}

/// Materialize a native value as an argument.
pub trait ToArgument {
    fn to_argument(&self, origin: &str) -> Argument;
}

/// A native type that can back a console variable.
pub trait ConsoleValue: FromArgument + ToArgument + 'static {}

impl<T: FromArgument + ToArgument + 'static> ConsoleValue for T {}

/// A single-element native value.
pub trait Scalar: Sized {
    const KIND: ArgumentKind;

    fn parse_element(element: &str) -> Option<Self>;

    fn format_element(&self) -> String;
}

fn conversion_error(expected: String, arg: &Argument) -> CommandError {
    let found = if arg.is_none() {
        "nothing".to_string()
    } else if arg.len() > 1 {
        format!("({arg})")
    } else {
        arg.to_string()
    };
    CommandError::Conversion { expected, found }
}

fn scalar_from_argument<T: Scalar>(arg: &Argument) -> Result<T, CommandError> {
    match arg.elements() {
        [single] => {
            T::parse_element(single).ok_or_else(|| conversion_error(T::KIND.to_string(), arg))
        },
        _ => Err(conversion_error(T::KIND.to_string(), arg)),
    }
}

macro_rules! scalar_argument {
    ($($ty:ty),*) => {
        $(
            impl FromArgument for $ty {
                fn from_argument(arg: &Argument) -> Result<Self, CommandError> {
                    scalar_from_argument(arg)
                }
            }

            impl ToArgument for $ty {
                fn to_argument(&self, origin: &str) -> Argument {
                    Argument::new(<$ty as Scalar>::KIND, vec![self.format_element()], origin)
                }
            }
        )*
    };
}

scalar_argument!(bool, i32, i64, u64, f32, f64, String);

impl<T: Scalar, const N: usize> FromArgument for [T; N] {
    fn from_argument(arg: &Argument) -> Result<Self, CommandError> {
        let expected = || format!("{}[{N}]", T::KIND);
        if arg.len() != N {
            return Err(conversion_error(expected(), arg));
        }
        let parsed: Vec<T> = arg
            .elements()
            .iter()
            .map(|e| T::parse_element(e))
            .collect::<Option<_>>()
            .ok_or_else(|| conversion_error(expected(), arg))?;
        parsed
            .try_into()
            .map_err(|_| conversion_error(expected(), arg))
    }
}

impl<T: Scalar, const N: usize> ToArgument for [T; N] {
    fn to_argument(&self, origin: &str) -> Argument {
        Argument::new(
            T::KIND,
            self.iter().map(Scalar::format_element).collect(),
            origin,
        )
    }
}

impl Scalar for bool {
    const KIND: ArgumentKind = ArgumentKind::Bool;

    fn parse_element(element: &str) -> Option<Self> {
        parse_bool_token(element).or_else(|| element_as_f64(element).map(|v| v != 0.0))
    }

    fn format_element(&self) -> String {
        bool_element(*self)
    }
}

/// Integers also accept integral floats (`2.0`) and Bool elements.
macro_rules! integer_scalar {
    ($ty:ty, $kind:expr) => {
        impl Scalar for $ty {
            const KIND: ArgumentKind = $kind;

            fn parse_element(element: &str) -> Option<Self> {
                if let Ok(v) = element.parse::<$ty>() {
                    return Some(v);
                }
                let v = element_as_f64(element)?;
                if v.fract() != 0.0 || v < <$ty>::MIN as f64 || v > <$ty>::MAX as f64 {
                    return None;
                }
                Some(v as $ty)
            }

            fn format_element(&self) -> String {
                self.to_string()
            }
        }
    };
}

integer_scalar!(i32, ArgumentKind::Int32);
integer_scalar!(i64, ArgumentKind::Int64);
integer_scalar!(u64, ArgumentKind::UInt64);

impl Scalar for f32 {
    const KIND: ArgumentKind = ArgumentKind::Float;

    fn parse_element(element: &str) -> Option<Self> {
        element_as_f64(element).map(|v| v as f32)
    }

    fn format_element(&self) -> String {
        format_f32(*self)
    }
}

impl Scalar for f64 {
    const KIND: ArgumentKind = ArgumentKind::Double;

    fn parse_element(element: &str) -> Option<Self> {
        element_as_f64(element)
    }

    fn format_element(&self) -> String {
        format_f64(*self)
    }
}

impl Scalar for String {
    const KIND: ArgumentKind = ArgumentKind::String;

    fn parse_element(element: &str) -> Option<Self> {
        Some(element.to_string())
    }

    fn format_element(&self) -> String {
        self.clone()
    }
}
