//! Dynamically typed console values.
//!
//! An [`Argument`] is a kind tag over string-encoded elements. A single
//! element is a scalar; two or more elements form a vector (a 2D/3D point,
//! a color). All elements of one argument share its kind.

use std::fmt;

use raycon_types::error::CommandError;

use crate::convert::FromArgument;

/// The type tag of an [`Argument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    None,
    Bool,
    Int32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
    Unknown,
}

impl ArgumentKind {
    /// Numeric promotion rank. Higher ranks win in [`ArgumentKind::common`].
    fn rank(self) -> Option<u8> {
        match self {
            Self::Bool => Some(0),
            Self::Int32 => Some(1),
            Self::Int64 => Some(2),
            Self::UInt64 => Some(3),
            Self::Float => Some(4),
            Self::Double => Some(5),
            Self::None | Self::String | Self::Unknown => None,
        }
    }

    /// Whether this kind takes part in numeric promotion (Bool included).
    pub fn is_numeric(self) -> bool {
        self.rank().is_some()
    }

    /// The kind both operands of a binary operation are converted to.
    ///
    /// `Double > Float > UInt64 > Int64 > Int32 > Bool`. String and Unknown
    /// only combine with themselves and pull a numeric partner to their own
    /// kind; Unknown wins over String.
    pub fn common(self, other: Self) -> Self {
        match (self, other) {
            (Self::None, k) | (k, Self::None) => k,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            (Self::String, _) | (_, Self::String) => Self::String,
            (a, b) => {
                if a.rank() >= b.rank() {
                    a
                } else {
                    b
                }
            },
        }
    }

    /// Human-readable kind name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bool => "Bool",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dynamically typed, possibly multi-element console value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    kind: ArgumentKind,
    elements: Vec<String>,
    origin: String,
}

impl Argument {
    /// Build an argument from already-encoded elements.
    ///
    /// An empty element list always produces a `None` argument.
    pub fn new(kind: ArgumentKind, elements: Vec<String>, origin: impl Into<String>) -> Self {
        if elements.is_empty() || kind == ArgumentKind::None {
            return Self::none();
        }
        Self {
            kind,
            elements,
            origin: origin.into(),
        }
    }

    /// The empty value: no kind, no elements.
    pub fn none() -> Self {
        Self {
            kind: ArgumentKind::None,
            elements: Vec::new(),
            origin: String::new(),
        }
    }

    /// A single-element String argument.
    pub fn string(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind: ArgumentKind::String,
            origin: text.clone(),
            elements: vec![text],
        }
    }

    /// Classify a literal token, narrowest kind first.
    ///
    /// Order: Bool (`true/false/on/off/yes/no`, `1`, `0`), Int32, Int64,
    /// UInt64, Float, Double, then String.
    pub fn from_literal(token: &str) -> Self {
        let (kind, element) = classify_literal(token);
        Self {
            kind,
            elements: vec![element],
            origin: token.to_string(),
        }
    }

    /// Concatenate several arguments into one vector of their common kind.
    pub fn concat(parts: &[Argument], origin: impl Into<String>) -> Self {
        let kind = parts
            .iter()
            .fold(ArgumentKind::None, |acc, a| acc.common(a.kind));
        let elements = parts
            .iter()
            .flat_map(|a| a.convert(kind).elements)
            .collect();
        Self::new(kind, elements, origin)
    }

    /// Element kind.
    pub fn kind(&self) -> ArgumentKind {
        self.kind
    }

    /// Element values in their canonical text form.
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Source text this value was produced from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when there are no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True for the empty `None` value.
    pub fn is_none(&self) -> bool {
        self.kind == ArgumentKind::None
    }

    /// Replace the origin text.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Replace the kind tag without touching the elements.
    pub(crate) fn with_kind(mut self, kind: ArgumentKind) -> Self {
        if !self.is_none() {
            self.kind = kind;
        }
        self
    }

    /// Prefix the first element, e.g. `"Speed = "` on the set path.
    pub(crate) fn prefix_front(&mut self, prefix: &str) {
        if let Some(front) = self.elements.first_mut() {
            front.insert_str(0, prefix);
        }
    }

    /// Elements joined with `", "`, the form used in statements.
    pub fn to_argument_text(&self) -> String {
        self.elements.join(", ")
    }

    /// Convert into a native value.
    pub fn to<T: FromArgument>(&self) -> Result<T, CommandError> {
        T::from_argument(self)
    }

    /// Re-encode every element as `kind`.
    ///
    /// Elements that cannot be read in the source kind (for example an
    /// inline division diagnostic) are carried over as text.
    pub fn convert(&self, kind: ArgumentKind) -> Argument {
        if kind == self.kind || self.is_none() {
            return self.clone();
        }
        let elements = self
            .elements
            .iter()
            .map(|e| convert_element(e, kind))
            .collect();
        Self {
            kind,
            elements,
            origin: self.origin.clone(),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_argument_text())
    }
}

// ---------------------------------------------------------------------------
// Element encoding
// ---------------------------------------------------------------------------

/// Float formatting that keeps a trailing `.0` on integral values.
pub(crate) fn format_f32(v: f32) -> String {
    format!("{v:?}")
}

/// Double formatting that keeps a trailing `.0` on integral values.
pub(crate) fn format_f64(v: f64) -> String {
    format!("{v:?}")
}

/// Parse a boolean word or `1`/`0`.
pub(crate) fn parse_bool_token(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Whether a token is shaped like a number (so `inf`, `nan` stay words).
fn looks_numeric(token: &str) -> bool {
    let rest = token.strip_prefix(['+', '-']).unwrap_or(token);
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Significant digits in the mantissa, leading zeros excluded.
fn significant_digits(token: &str) -> usize {
    let mantissa = token.split(['e', 'E']).next().unwrap_or(token);
    mantissa
        .chars()
        .filter(char::is_ascii_digit)
        .skip_while(|&c| c == '0')
        .count()
}

fn classify_literal(token: &str) -> (ArgumentKind, String) {
    if let Some(b) = parse_bool_token(token) {
        return (ArgumentKind::Bool, bool_element(b));
    }
    if looks_numeric(token) {
        if let Ok(v) = token.parse::<i32>() {
            return (ArgumentKind::Int32, v.to_string());
        }
        if let Ok(v) = token.parse::<i64>() {
            return (ArgumentKind::Int64, v.to_string());
        }
        if let Ok(v) = token.parse::<u64>() {
            return (ArgumentKind::UInt64, v.to_string());
        }
        if let Ok(v) = token.parse::<f64>()
            && v.is_finite()
        {
            if significant_digits(token) <= 7 && v.abs() <= f64::from(f32::MAX) {
                return (ArgumentKind::Float, format_f32(v as f32));
            }
            return (ArgumentKind::Double, format_f64(v));
        }
    }
    (ArgumentKind::String, token.to_string())
}

/// Canonical Bool element text.
pub(crate) fn bool_element(b: bool) -> String {
    (if b { "1" } else { "0" }).to_string()
}

/// Read an element as a number regardless of its encoded kind.
pub(crate) fn element_as_f64(s: &str) -> Option<f64> {
    s.parse::<f64>()
        .ok()
        .or_else(|| parse_bool_token(s).map(|b| if b { 1.0 } else { 0.0 }))
}

fn convert_element(s: &str, kind: ArgumentKind) -> String {
    let converted = match kind {
        ArgumentKind::None | ArgumentKind::String | ArgumentKind::Unknown => None,
        ArgumentKind::Bool => element_as_f64(s).map(|v| bool_element(v != 0.0)),
        ArgumentKind::Int32 => s
            .parse::<i32>()
            .ok()
            .or_else(|| element_as_f64(s).map(|v| v as i32))
            .map(|v| v.to_string()),
        ArgumentKind::Int64 => s
            .parse::<i64>()
            .ok()
            .or_else(|| element_as_f64(s).map(|v| v as i64))
            .map(|v| v.to_string()),
        ArgumentKind::UInt64 => s
            .parse::<u64>()
            .ok()
            .or_else(|| element_as_f64(s).map(|v| v as u64))
            .map(|v| v.to_string()),
        ArgumentKind::Float => element_as_f64(s).map(|v| format_f32(v as f32)),
        ArgumentKind::Double => element_as_f64(s).map(format_f64),
    };
    converted.unwrap_or_else(|| s.to_string())
}
