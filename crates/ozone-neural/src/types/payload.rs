// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tagged payload values carried by signals
//!
//! Values keep their native representation; the typed accessors convert on
//! read and return `None` when no sensible conversion exists, leaving the
//! "type default" fallback to the caller.

use core::fmt;

/// A single payload entry value
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    Text(String),
    Int(i64),
    Float(f32),
    Bool(bool),
}

impl PayloadValue {
    /// Text rendering (every value has one)
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PayloadValue::Int(v) => Some(*v),
            PayloadValue::Float(v) if v.is_finite() => Some(*v as i64),
            PayloadValue::Float(_) => None,
            PayloadValue::Bool(v) => Some(i64::from(*v)),
            PayloadValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
            }
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            PayloadValue::Float(v) => Some(*v),
            PayloadValue::Int(v) => Some(*v as f32),
            PayloadValue::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            PayloadValue::Text(s) => s.trim().parse::<f32>().ok(),
        }
    }

    /// Truthiness: `"true"`/`"1"` for text, non-zero for numbers
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PayloadValue::Bool(v) => Some(*v),
            PayloadValue::Int(v) => Some(*v != 0),
            PayloadValue::Float(v) => Some(*v != 0.0),
            PayloadValue::Text(s) => {
                let s = s.trim();
                Some(s.eq_ignore_ascii_case("true") || s == "1")
            }
        }
    }
}

impl fmt::Display for PayloadValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadValue::Text(s) => f.write_str(s),
            PayloadValue::Int(v) => write!(f, "{}", v),
            PayloadValue::Float(v) => write!(f, "{}", v),
            PayloadValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        PayloadValue::Text(value.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        PayloadValue::Text(value)
    }
}

impl From<&String> for PayloadValue {
    fn from(value: &String) -> Self {
        PayloadValue::Text(value.clone())
    }
}

impl From<i64> for PayloadValue {
    fn from(value: i64) -> Self {
        PayloadValue::Int(value)
    }
}

impl From<i32> for PayloadValue {
    fn from(value: i32) -> Self {
        PayloadValue::Int(i64::from(value))
    }
}

impl From<u32> for PayloadValue {
    fn from(value: u32) -> Self {
        PayloadValue::Int(i64::from(value))
    }
}

impl From<f32> for PayloadValue {
    fn from(value: f32) -> Self {
        PayloadValue::Float(value)
    }
}

impl From<f64> for PayloadValue {
    fn from(value: f64) -> Self {
        PayloadValue::Float(value as f32)
    }
}

impl From<bool> for PayloadValue {
    fn from(value: bool) -> Self {
        PayloadValue::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_parses_on_read() {
        let v = PayloadValue::from("0.75");
        assert_eq!(v.as_float(), Some(0.75));
        assert_eq!(v.as_int(), Some(0));
        assert_eq!(PayloadValue::from("42").as_int(), Some(42));
    }

    #[test]
    fn test_unparseable_text_yields_none() {
        let v = PayloadValue::from("high");
        assert_eq!(v.as_float(), None);
        assert_eq!(v.as_int(), None);
        assert_eq!(v.as_bool(), Some(false));
    }

    #[test]
    fn test_bool_conversions() {
        assert_eq!(PayloadValue::from("1").as_bool(), Some(true));
        assert_eq!(PayloadValue::from("TRUE").as_bool(), Some(true));
        assert_eq!(PayloadValue::Int(0).as_bool(), Some(false));
        assert_eq!(PayloadValue::Bool(true).as_float(), Some(1.0));
    }

    #[test]
    fn test_text_rendering() {
        assert_eq!(PayloadValue::Int(7).as_text(), "7");
        assert_eq!(PayloadValue::Float(0.5).as_text(), "0.5");
        assert_eq!(PayloadValue::Bool(false).as_text(), "false");
    }
}
