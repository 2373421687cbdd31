//! Metadata values of an MRtrix header and their coercion from text.
//!
//! Every raw value goes through a fixed sequence of attempts: integer, then
//! floating point, then plain text. A value containing commas is split first
//! and the attempts are made on the whole list at once, so a list is either
//! all integers, all floats or all text.

use std::fmt;

/// A single metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Signed integer.
    Int(i64),
    /// Double precision floating point number.
    Float(f64),
    /// Anything else, kept verbatim.
    Text(String),
}

impl Scalar {
    /// Coerce a raw string into a scalar: integer, float or text, in that order.
    pub fn parse(raw: &str) -> Scalar {
        if let Some(v) = parse_int(raw) {
            Scalar::Int(v)
        } else if let Some(v) = parse_float(raw) {
            Scalar::Float(v)
        } else {
            Scalar::Text(raw.to_owned())
        }
    }

    /// The value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Scalar::Int(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a floating point number. Integers are converted.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Scalar::Int(v) => Some(v as f64),
            Scalar::Float(v) => Some(v),
            Scalar::Text(_) => None,
        }
    }

    /// The value as text, if it was kept as text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            // `Debug` keeps the decimal point, so the value reads back as a float
            Scalar::Float(v) => write!(f, "{:?}", v),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl<'a> From<&'a str> for Scalar {
    fn from(v: &'a str) -> Self {
        Scalar::Text(v.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

/// The value of a metadata key.
///
/// `List` comes from a single comma separated line, `MultiLine` from the same
/// key appearing on several lines. Both are sequences, but they are kept apart
/// so that a header can be written back with the same line structure.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single value.
    Scalar(Scalar),
    /// A comma separated list on one line.
    List(Vec<Scalar>),
    /// One value per header line, in line order. Elements are never `MultiLine`.
    MultiLine(Vec<Value>),
}

impl Value {
    /// Coerce the raw text of one header line (without the line terminator).
    pub fn parse(raw: &str) -> Value {
        if !raw.contains(',') {
            return Value::Scalar(Scalar::parse(raw));
        }
        let pieces: Vec<&str> = raw.split(',').collect();
        if let Some(ints) = pieces.iter().map(|p| parse_int(p)).collect::<Option<Vec<_>>>() {
            Value::List(ints.into_iter().map(Scalar::Int).collect())
        } else if let Some(floats) = pieces
            .iter()
            .map(|p| parse_float(p))
            .collect::<Option<Vec<_>>>()
        {
            Value::List(floats.into_iter().map(Scalar::Float).collect())
        } else {
            Value::List(pieces.into_iter().map(Scalar::from).collect())
        }
    }

    /// Fold a new line's value into this one: the first repetition wraps both
    /// into a `MultiLine` sequence, later ones are appended to it.
    pub fn accumulate(self, next: Value) -> Value {
        match self {
            Value::MultiLine(mut lines) => {
                lines.push(next);
                Value::MultiLine(lines)
            }
            first => Value::MultiLine(vec![first, next]),
        }
    }

    /// Whether the value was assembled from repeated header lines.
    pub fn is_multi_line(&self) -> bool {
        match self {
            Value::MultiLine(_) => true,
            _ => false,
        }
    }

    /// The single scalar, if this is one.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The text of a single text scalar.
    pub fn as_text(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// All scalars of the value in order, regardless of how the value was laid
    /// out over lines and commas.
    pub fn elements(&self) -> Vec<&Scalar> {
        match self {
            Value::Scalar(s) => vec![s],
            Value::List(items) => items.iter().collect(),
            Value::MultiLine(lines) => lines.iter().flat_map(Value::elements).collect(),
        }
    }

    /// The value of each header line this value spans.
    pub fn lines(&self) -> Vec<&Value> {
        match self {
            Value::MultiLine(lines) => lines.iter().collect(),
            single => vec![single],
        }
    }
}

/// Formats a single-line value as it would appear after `key: `.
/// `MultiLine` values are formatted with one line per element, without keys;
/// use `lines()` to write them back properly.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{}", s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::MultiLine(lines) => {
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{}", line)?;
                }
                Ok(())
            }
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<Vec<Scalar>> for Value {
    fn from(items: Vec<Scalar>) -> Self {
        Value::List(items)
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}
