//! Cell values
//!
//! [`Value`] is an owned cell (filter literals, coercion output), [`ValueRef`]
//! is a borrowed view of a cell stored inside a [`RecordSet`](crate::RecordSet).

use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// An owned cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Text(String),
    /// Year-granularity date, always stored as January 1st
    Date(NaiveDate),
    Bool(bool),
    Int(i64),
    /// Only used for literals; columns never hold floats
    Float(f64),
}

impl Value {
    /// Build a year-granularity date
    pub fn year(year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, 1, 1).map(Value::Date)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_ref(&self) -> ValueRef<'_> {
        match self {
            Value::Null => ValueRef::Null,
            Value::Text(s) => ValueRef::Text(s),
            Value::Date(d) => ValueRef::Date(*d),
            Value::Bool(b) => ValueRef::Bool(*b),
            Value::Int(i) => ValueRef::Int(*i),
            Value::Float(f) => ValueRef::Float(*f),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        self.as_ref().as_f64()
    }

    /// Convert a JSON scalar into a literal.
    ///
    /// Integral numbers become `Int`, other numbers `Float`. Arrays and
    /// objects are not scalars and are rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(Error::UnknownCondition(format!("unsupported number {}", n)))
                }
            }
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            other => Err(Error::UnknownCondition(format!(
                "expected a scalar literal, got {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}

/// A borrowed cell value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    Null,
    Text(&'a str),
    Date(NaiveDate),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl<'a> ValueRef<'a> {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, ValueRef::Null)
    }

    pub fn to_value(&self) -> Value {
        match *self {
            ValueRef::Null => Value::Null,
            ValueRef::Text(s) => Value::Text(s.to_string()),
            ValueRef::Date(d) => Value::Date(d),
            ValueRef::Bool(b) => Value::Bool(b),
            ValueRef::Int(i) => Value::Int(i),
            ValueRef::Float(f) => Value::Float(f),
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            ValueRef::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            ValueRef::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Year component of a date cell
    pub fn year(&self) -> Option<i32> {
        match *self {
            ValueRef::Date(d) => Some(d.year()),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match *self {
            ValueRef::Int(i) => Some(i as f64),
            ValueRef::Float(f) => Some(f),
            _ => None,
        }
    }

    /// Type-sensitive equality against a literal. Null never matches.
    pub fn eq_literal(&self, literal: &Value) -> bool {
        match (*self, literal) {
            (ValueRef::Null, _) | (_, Value::Null) => false,
            (ValueRef::Text(a), Value::Text(b)) => a == b.as_str(),
            (ValueRef::Date(a), Value::Date(b)) => a == *b,
            (ValueRef::Bool(a), Value::Bool(b)) => a == *b,
            (ValueRef::Int(a), Value::Int(b)) => a == *b,
            (ValueRef::Int(_) | ValueRef::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_f64() == literal.as_f64()
            }
            _ => false,
        }
    }

    /// Native ordering against a literal, `None` when the types are not comparable
    pub fn cmp_literal(&self, literal: &Value) -> Option<Ordering> {
        match (*self, literal) {
            (ValueRef::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (ValueRef::Int(_) | ValueRef::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_f64()?.partial_cmp(&literal.as_f64()?)
            }
            (ValueRef::Text(a), Value::Text(b)) => Some(a.cmp(b.as_str())),
            (ValueRef::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (ValueRef::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Text rendering used by substring matching. Dates render as the year.
    pub fn render(&self) -> Option<Cow<'a, str>> {
        match *self {
            ValueRef::Null => None,
            ValueRef::Text(s) => Some(Cow::Borrowed(s)),
            ValueRef::Date(d) => Some(Cow::Owned(format!("{:04}", d.year()))),
            ValueRef::Bool(b) => Some(Cow::Owned(b.to_string())),
            ValueRef::Int(i) => Some(Cow::Owned(i.to_string())),
            ValueRef::Float(f) => Some(Cow::Owned(f.to_string())),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match *self {
            ValueRef::Null => serde_json::Value::Null,
            ValueRef::Text(s) => serde_json::Value::String(s.to_string()),
            ValueRef::Date(d) => serde_json::Value::String(format!("{:04}", d.year())),
            ValueRef::Bool(b) => serde_json::Value::Bool(b),
            ValueRef::Int(i) => serde_json::Value::from(i),
            ValueRef::Float(f) => serde_json::Value::from(f),
        }
    }
}

impl fmt::Display for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_never_equals() {
        assert!(!ValueRef::Null.eq_literal(&Value::Null));
        assert!(!ValueRef::Text("a").eq_literal(&Value::Null));
    }

    #[test]
    fn test_type_sensitive_equality() {
        assert!(ValueRef::Text("1999").eq_literal(&Value::text("1999")));
        assert!(!ValueRef::Text("1999").eq_literal(&Value::Int(1999)));
        assert!(ValueRef::Int(120).eq_literal(&Value::Float(120.0)));
        assert!(!ValueRef::Bool(true).eq_literal(&Value::Int(1)));
    }

    #[test]
    fn test_cmp_literal() {
        assert_eq!(ValueRef::Int(5).cmp_literal(&Value::Int(7)), Some(Ordering::Less));
        assert_eq!(ValueRef::Int(5).cmp_literal(&Value::Float(4.5)), Some(Ordering::Greater));
        assert_eq!(ValueRef::Text("b").cmp_literal(&Value::text("a")), Some(Ordering::Greater));
        assert_eq!(ValueRef::Text("b").cmp_literal(&Value::Int(1)), None);
    }

    #[test]
    fn test_render_date_as_year() {
        let date = Value::year(1977).unwrap();
        assert_eq!(date.as_ref().render().unwrap(), "1977");
        assert_eq!(date.as_ref().year(), Some(1977));
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Value::from_json(&json!(3)).unwrap(), Value::Int(3));
        assert_eq!(Value::from_json(&json!(2.5)).unwrap(), Value::Float(2.5));
        assert_eq!(Value::from_json(&json!("x")).unwrap(), Value::text("x"));
        assert_eq!(Value::from_json(&json!(null)).unwrap(), Value::Null);
        assert!(matches!(
            Value::from_json(&json!([1])),
            Err(Error::UnknownCondition(_))
        ));
    }
}
