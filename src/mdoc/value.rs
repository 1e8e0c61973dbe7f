//! # Element Values
//!
//! The value carried by an `IssuerSignedItem`. Conversion to CBOR applies the
//! mdoc conventions: calendar dates use tag 1004, instants use tag 1000, and
//! maps keep their insertion order.

use chrono::{DateTime, NaiveDate, Utc};
use ciborium::Value;
use serde::{Deserialize, Serialize};

use crate::cbor::{self, TAG_DATE_TIME, TAG_FULL_DATE};
use crate::error::{Error, Result};

/// A data element value.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum ElementValue {
    /// UTF-8 text.
    Text(String),

    /// Boolean.
    Bool(bool),

    /// Unsigned integer.
    Uint(u64),

    /// Negative (or signed) integer.
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Byte string, e.g. a portrait image.
    Bytes(Vec<u8>),

    /// Calendar date, `#6.1004`.
    FullDate(NaiveDate),

    /// Instant, `#6.1000`.
    DateTime(DateTime<Utc>),

    /// Array of values.
    Array(Vec<ElementValue>),

    /// Map with text keys, in insertion order.
    Map(Vec<(String, ElementValue)>),
}

impl From<ElementValue> for Value {
    fn from(value: ElementValue) -> Self {
        match value {
            ElementValue::Text(text) => Self::Text(text),
            ElementValue::Bool(b) => Self::Bool(b),
            ElementValue::Uint(n) => Self::Integer(n.into()),
            ElementValue::Int(n) => Self::Integer(n.into()),
            ElementValue::Float(f) => Self::Float(f),
            ElementValue::Bytes(bytes) => Self::Bytes(bytes),
            ElementValue::FullDate(date) => cbor::full_date(date),
            ElementValue::DateTime(instant) => cbor::date_time(&instant),
            ElementValue::Array(items) => Self::Array(items.into_iter().map(Into::into).collect()),
            ElementValue::Map(entries) => {
                Self::Map(entries.into_iter().map(|(k, v)| (Self::Text(k), v.into())).collect())
            }
        }
    }
}

impl TryFrom<Value> for ElementValue {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let element = match value {
            Value::Text(text) => Self::Text(text),
            Value::Bool(b) => Self::Bool(b),
            Value::Integer(n) => u64::try_from(n).map_or_else(
                |_| {
                    i64::try_from(n)
                        .map(Self::Int)
                        .map_err(|_| Error::Encoding("integer out of range".to_string()))
                },
                |n| Ok(Self::Uint(n)),
            )?,
            Value::Float(f) => Self::Float(f),
            Value::Bytes(bytes) => Self::Bytes(bytes),
            tagged @ Value::Tag(TAG_FULL_DATE, _) => Self::FullDate(cbor::parse_full_date(tagged)?),
            tagged @ Value::Tag(TAG_DATE_TIME, _) => Self::DateTime(cbor::parse_date_time(tagged)?),
            Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::try_from).collect::<Result<_>>()?)
            }
            Value::Map(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| Ok((cbor::into_text(k, "map key")?, Self::try_from(v)?)))
                    .collect::<Result<_>>()?,
            ),
            other => return Err(Error::Encoding(format!("unsupported element value: {other:?}"))),
        };
        Ok(element)
    }
}

/// Convert a JSON value, e.g. from a dataset stored by the host application.
///
/// JSON `null` has no element representation and is rejected.
impl TryFrom<serde_json::Value> for ElementValue {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        let element = match value {
            serde_json::Value::Null => {
                return Err(Error::Encoding("null is not a valid element value".to_string()));
            }
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Self::Uint(u)
                } else if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::try_from).collect::<Result<_>>()?)
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter().map(|(k, v)| Ok((k, Self::try_from(v)?))).collect::<Result<_>>()?,
            ),
        };
        Ok(element)
    }
}

impl From<&str> for ElementValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ElementValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ElementValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u32> for ElementValue {
    fn from(value: u32) -> Self {
        Self::Uint(value.into())
    }
}

impl From<u64> for ElementValue {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<i64> for ElementValue {
    fn from(value: i64) -> Self {
        u64::try_from(value).map_or(Self::Int(value), Self::Uint)
    }
}

impl From<Vec<u8>> for ElementValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<NaiveDate> for ElementValue {
    fn from(value: NaiveDate) -> Self {
        Self::FullDate(value)
    }
}

impl From<DateTime<Utc>> for ElementValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<Vec<Self>> for ElementValue {
    fn from(value: Vec<Self>) -> Self {
        Self::Array(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cbor::to_vec;

    #[test]
    fn map_keeps_insertion_order() {
        let value = ElementValue::Map(vec![
            ("zeta".to_string(), 1u64.into()),
            ("alpha".to_string(), true.into()),
        ]);
        let bytes = to_vec(&value).unwrap();

        // map(2) "zeta" 1 "alpha" true
        assert_eq!(hex::encode(bytes), "a2647a6574610165616c706861f5");
    }

    #[test]
    fn negative_integer() {
        let bytes = to_vec(&ElementValue::from(-3i64)).unwrap();
        assert_eq!(bytes, vec![0x22]);
        assert_eq!(ElementValue::from(7i64), ElementValue::Uint(7));
    }

    #[test]
    fn from_json() {
        let value = ElementValue::try_from(json!({"code": "B", "limits": [1, -2], "valid": true}))
            .expect("should convert");
        assert_eq!(
            value,
            ElementValue::Map(vec![
                ("code".to_string(), "B".into()),
                ("limits".to_string(), ElementValue::Array(vec![1u64.into(), (-2i64).into()])),
                ("valid".to_string(), true.into()),
            ])
        );
    }

    #[test]
    fn null_rejected() {
        let err = ElementValue::try_from(json!({"code": null})).expect_err("should fail");
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn decode_dates() {
        let date = NaiveDate::from_ymd_opt(1985, 6, 1).unwrap();
        let value = ElementValue::try_from(Value::from(ElementValue::FullDate(date))).unwrap();
        assert_eq!(value, ElementValue::FullDate(date));
    }
}
