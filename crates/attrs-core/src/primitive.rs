//! # Primitive Kinds — The Scalar Coercion Table
//!
//! Defines `PrimitiveKind`, the closed set of primitive attribute types, and
//! [`coerce_scalar`], the conversion from any scalar into a given kind.
//!
//! ## Failure Policy
//!
//! A conversion that cannot interpret its input raises a
//! [`ConversionError`]. This applies uniformly to every kind: there is no
//! branch that substitutes a zero value for unparseable text.
//!
//! ## Absent Input
//!
//! `Scalar::Null` coerces to the kind's zero value: `""` for strings and
//! symbols, `0` / `0.0` for numbers, `false` for booleans, and `Null` for
//! date, date/time, and `any`.
//!
//! ## Idempotence
//!
//! For every kind `k` and scalar `s`, if `coerce_scalar(k, s)` succeeds with
//! `t`, then `coerce_scalar(k, t)` returns `t` unchanged.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::config::EngineConfig;
use crate::error::ConversionError;
use crate::scalar::Scalar;
use crate::temporal;

/// Closed set of primitive attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// UTF-8 text.
    String,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit float.
    Float,
    /// Boolean.
    Boolean,
    /// Symbolic name.
    Symbol,
    /// Calendar date.
    Date,
    /// UTC instant.
    DateTime,
    /// Untyped: every value passes through unchanged.
    Any,
}

impl PrimitiveKind {
    /// Returns all primitive kinds in canonical order.
    pub fn all() -> &'static [PrimitiveKind] {
        &[
            Self::String,
            Self::Integer,
            Self::Float,
            Self::Boolean,
            Self::Symbol,
            Self::Date,
            Self::DateTime,
            Self::Any,
        ]
    }

    /// Returns the snake_case identifier for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Symbol => "symbol",
            Self::Date => "date",
            Self::DateTime => "date_time",
            Self::Any => "any",
        }
    }

    /// The value an absent input coerces to.
    pub fn zero(&self) -> Scalar {
        match self {
            Self::String => Scalar::String(String::new()),
            Self::Symbol => Scalar::Symbol(String::new()),
            Self::Integer => Scalar::Integer(0),
            Self::Float => Scalar::Float(0.0),
            Self::Boolean => Scalar::Bool(false),
            Self::Date | Self::DateTime | Self::Any => Scalar::Null,
        }
    }

    /// Whether `scalar` is already of this kind, so coercion is a no-op.
    pub fn accepts(&self, scalar: &Scalar) -> bool {
        matches!(
            (self, scalar),
            (Self::Any, _)
                | (Self::String, Scalar::String(_))
                | (Self::Integer, Scalar::Integer(_))
                | (Self::Float, Scalar::Float(_))
                | (Self::Boolean, Scalar::Bool(_))
                | (Self::Symbol, Scalar::Symbol(_))
                | (Self::Date, Scalar::Date(_))
                | (Self::DateTime, Scalar::DateTime(_))
        )
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrimitiveKind {
    type Err = String;

    /// Parse a primitive kind from its identifier. `datetime` and `time`
    /// are accepted as aliases of `date_time`, `bool` of `boolean`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "integer" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            "boolean" | "bool" => Ok(Self::Boolean),
            "symbol" => Ok(Self::Symbol),
            "date" => Ok(Self::Date),
            "date_time" | "datetime" | "time" => Ok(Self::DateTime),
            "any" => Ok(Self::Any),
            other => Err(format!("unknown primitive kind: {other:?}")),
        }
    }
}

/// Coerce a scalar into the given primitive kind.
///
/// # Errors
///
/// Returns [`ConversionError`] when the input cannot be interpreted as the
/// target kind (non-numeric text for a number, an unrecognized boolean word,
/// an unparseable date, a non-finite float for either numeric kind).
pub fn coerce_scalar(
    kind: PrimitiveKind,
    value: Scalar,
    config: &EngineConfig,
) -> Result<Scalar, ConversionError> {
    if value.is_null() {
        return Ok(kind.zero());
    }
    match kind {
        PrimitiveKind::String => return to_string(value, config),
        PrimitiveKind::Float => return to_float(value),
        _ => {}
    }
    if kind.accepts(&value) {
        return Ok(value);
    }
    match kind {
        PrimitiveKind::String => to_string(value, config),
        PrimitiveKind::Symbol => to_symbol(value),
        PrimitiveKind::Integer => to_integer(value),
        PrimitiveKind::Float => to_float(value),
        PrimitiveKind::Boolean => to_boolean(value),
        PrimitiveKind::Date => to_date(value),
        PrimitiveKind::DateTime => to_datetime(value),
        PrimitiveKind::Any => Ok(value),
    }
}

fn to_string(value: Scalar, config: &EngineConfig) -> Result<Scalar, ConversionError> {
    let text = match value {
        Scalar::String(s) | Scalar::Symbol(s) if config.trim_strings => s.trim().to_string(),
        Scalar::String(s) | Scalar::Symbol(s) => s,
        other => other.to_string(),
    };
    Ok(Scalar::String(text))
}

fn to_symbol(value: Scalar) -> Result<Scalar, ConversionError> {
    match value {
        Scalar::String(s) => Ok(Scalar::Symbol(s)),
        Scalar::Integer(_) | Scalar::Float(_) | Scalar::Bool(_) => {
            Ok(Scalar::Symbol(value.to_string()))
        }
        other => Err(unsupported(PrimitiveKind::Symbol, &other)),
    }
}

fn to_integer(value: Scalar) -> Result<Scalar, ConversionError> {
    let kind = PrimitiveKind::Integer;
    match value {
        Scalar::Float(f) => truncate(f)
            .map(Scalar::Integer)
            .ok_or_else(|| ConversionError::new(kind, "float", format!("{f} is out of range"))),
        Scalar::Bool(b) => Ok(Scalar::Integer(i64::from(b))),
        Scalar::DateTime(dt) => Ok(Scalar::Integer(dt.timestamp())),
        Scalar::String(ref s) => {
            let t = s.trim();
            if let Ok(n) = t.parse::<i64>() {
                return Ok(Scalar::Integer(n));
            }
            t.parse::<f64>()
                .ok()
                .and_then(truncate)
                .map(Scalar::Integer)
                .ok_or_else(|| ConversionError::new(kind, "string", format!("{s:?} is not a number")))
        }
        other => Err(unsupported(kind, &other)),
    }
}

/// Only finite floats are stored: JSON has no encoding for NaN or the
/// infinities, so they could not survive a flatten and rebuild.
fn to_float(value: Scalar) -> Result<Scalar, ConversionError> {
    let kind = PrimitiveKind::Float;
    match value {
        Scalar::Float(f) => finite(f, "float"),
        Scalar::Integer(n) => Ok(Scalar::Float(n as f64)),
        Scalar::Bool(b) => Ok(Scalar::Float(if b { 1.0 } else { 0.0 })),
        Scalar::String(ref s) => match s.trim().parse::<f64>() {
            Ok(f) => finite(f, "string"),
            Err(_) => Err(ConversionError::new(kind, "string", format!("{s:?} is not a number"))),
        },
        other => Err(unsupported(kind, &other)),
    }
}

fn finite(f: f64, found: &'static str) -> Result<Scalar, ConversionError> {
    if f.is_finite() {
        Ok(Scalar::Float(f))
    } else {
        Err(ConversionError::new(PrimitiveKind::Float, found, format!("{f} is not finite")))
    }
}

fn to_boolean(value: Scalar) -> Result<Scalar, ConversionError> {
    let kind = PrimitiveKind::Boolean;
    match value {
        Scalar::Integer(1) => Ok(Scalar::Bool(true)),
        Scalar::Integer(0) => Ok(Scalar::Bool(false)),
        Scalar::Float(f) if f == 1.0 => Ok(Scalar::Bool(true)),
        Scalar::Float(f) if f == 0.0 => Ok(Scalar::Bool(false)),
        Scalar::String(ref s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Ok(Scalar::Bool(true)),
            "false" | "f" | "no" | "n" | "off" | "0" => Ok(Scalar::Bool(false)),
            _ => Err(ConversionError::new(
                kind,
                "string",
                format!("{s:?} is not a boolean word"),
            )),
        },
        Scalar::Integer(n) => Err(ConversionError::new(
            kind,
            "integer",
            format!("{n} is neither 0 nor 1"),
        )),
        other => Err(unsupported(kind, &other)),
    }
}

fn to_date(value: Scalar) -> Result<Scalar, ConversionError> {
    let kind = PrimitiveKind::Date;
    match value {
        Scalar::DateTime(dt) => Ok(Scalar::Date(dt.date_naive())),
        Scalar::String(ref s) => temporal::parse_date(s)
            .map(Scalar::Date)
            .map_err(|reason| ConversionError::new(kind, "string", reason)),
        other => Err(unsupported(kind, &other)),
    }
}

fn to_datetime(value: Scalar) -> Result<Scalar, ConversionError> {
    let kind = PrimitiveKind::DateTime;
    match value {
        Scalar::Date(d) => Ok(Scalar::DateTime(temporal::midnight_utc(d))),
        Scalar::Integer(secs) => temporal::from_epoch_secs(secs)
            .map(Scalar::DateTime)
            .map_err(|reason| ConversionError::new(kind, "integer", reason)),
        Scalar::String(ref s) => temporal::parse_datetime(s)
            .map(Scalar::DateTime)
            .map_err(|reason| ConversionError::new(kind, "string", reason)),
        other => Err(unsupported(kind, &other)),
    }
}

/// Truncate toward zero, rejecting non-finite and out-of-range floats.
fn truncate(f: f64) -> Option<i64> {
    let t = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

fn unsupported(kind: PrimitiveKind, value: &Scalar) -> ConversionError {
    ConversionError::new(
        kind,
        value.kind_name(),
        format!("no conversion from {} to {kind}", value.kind_name()),
    )
}
