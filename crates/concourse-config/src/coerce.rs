//! Range- and kind-safe conversion of document numbers into numeric leaves.
//!
//! Floating targets accept any number. Integral targets accept only integral
//! values that survive the narrowing unchanged; nothing is ever truncated.

use serde_json::Number;

use crate::error::{ParseError, ParseErrorKind};
use crate::types::LeafKind;
use crate::value::ConfigValue;

/// -2^63 and 2^63, both exactly representable as f64.
const I64_LOWER: f64 = i64::MIN as f64;
const I64_UPPER: f64 = -(i64::MIN as f64);

/// The numeric representation the document parser produced.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Source {
    Int(i64),
    /// Only above `i64::MAX`; anything smaller comes through as `Int`.
    UInt(u64),
    Float(f64),
}

impl Source {
    fn of(number: &Number) -> Self {
        if let Some(i) = number.as_i64() {
            Source::Int(i)
        } else if let Some(u) = number.as_u64() {
            Source::UInt(u)
        } else {
            Source::Float(number.as_f64().unwrap_or(f64::NAN))
        }
    }
}

/// Convert `number` into the numeric leaf `target`.
pub fn coerce_number(number: &Number, target: LeafKind) -> Result<ConfigValue, ParseError> {
    let source = Source::of(number);
    let out_of_range = || {
        ParseError::new(ParseErrorKind::OutOfRange {
            target,
            value: number.to_string(),
        })
    };

    match target {
        LeafKind::F64 => Ok(ConfigValue::F64(match source {
            Source::Int(i) => i as f64,
            Source::UInt(u) => u as f64,
            Source::Float(f) => f,
        })),
        LeafKind::F32 => Ok(ConfigValue::F32(match source {
            Source::Int(i) => i as f32,
            Source::UInt(u) => u as f32,
            Source::Float(f) => f as f32,
        })),
        LeafKind::I8 | LeafKind::I16 | LeafKind::I32 | LeafKind::I64 => {
            let wide = match source {
                Source::Int(i) => i,
                Source::UInt(_) => return Err(out_of_range()),
                Source::Float(f) if !f.is_finite() || f.fract() != 0.0 => {
                    return Err(ParseError::new(ParseErrorKind::NotAnInteger {
                        target,
                        value: number.to_string(),
                    }));
                }
                Source::Float(f) if !(I64_LOWER..I64_UPPER).contains(&f) => {
                    return Err(out_of_range());
                }
                Source::Float(f) => f as i64,
            };
            narrow(wide, target).ok_or_else(out_of_range)
        }
        LeafKind::Bool | LeafKind::Str => Err(ParseError::new(ParseErrorKind::UnexpectedShape {
            expected: target.name().to_string(),
            found: "number",
        })),
    }
}

/// Narrow to the target width; `None` if the value does not round-trip.
fn narrow(wide: i64, target: LeafKind) -> Option<ConfigValue> {
    match target {
        LeafKind::I8 => i8::try_from(wide).ok().map(ConfigValue::I8),
        LeafKind::I16 => i16::try_from(wide).ok().map(ConfigValue::I16),
        LeafKind::I32 => i32::try_from(wide).ok().map(ConfigValue::I32),
        LeafKind::I64 => Some(ConfigValue::I64(wide)),
        _ => None,
    }
}
