//! # CBOR
//!
//! CBOR helper functions and types.
//!
//! All maps and arrays are emitted with definite lengths and integers use their
//! shortest form. Map key order is the order in which entries are supplied, so
//! types that need a fixed field order build a [`Value::Map`] by hand.

use std::io::Cursor;
use std::ops::Deref;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use ciborium::value::Integer;
use ciborium::Value;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tag for embedded CBOR data items (`#6.24(bstr)`).
pub const TAG_ENCODED_CBOR: u64 = 24;

/// Tag for an RFC 3339 date-time string (`tdate`).
pub const TAG_DATE_TIME: u64 = 1000;

/// Tag for an RFC 3339 full-date string (`full-date`).
pub const TAG_FULL_DATE: u64 = 1004;

/// Serialize a value to a CBOR byte vector.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if the value cannot be serialized.
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize,
{
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)?;
    Ok(buf)
}

/// Deserialize a value from a CBOR byte slice.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if the bytes are not valid CBOR for `T`.
pub fn from_slice<T>(slice: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    Ok(ciborium::from_reader(Cursor::new(&slice))?)
}

/// Wrap types that require tagging with tag 24.
///
/// The inner value is encoded to bytes, and those bytes are emitted as a byte
/// string under tag 24.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag24<T>(pub T);

impl<T> Deref for Tag24<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Serialize> Tag24<T> {
    /// The tagged value: `#6.24(bstr .cbor T)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the inner value cannot be serialized.
    pub fn to_value(&self) -> Result<Value> {
        Ok(Value::Tag(TAG_ENCODED_CBOR, Box::new(Value::Bytes(to_vec(&self.0)?))))
    }
}

impl<T: DeserializeOwned> TryFrom<Value> for Tag24<T> {
    type Error = Error;

    fn try_from(v: Value) -> Result<Self> {
        let Value::Tag(TAG_ENCODED_CBOR, value) = v else {
            return Err(Error::Encoding(format!("not a tag24: {v:?}")));
        };
        let Value::Bytes(bytes) = *value else {
            return Err(Error::Encoding("tag24 content is not a byte string".to_string()));
        };
        Ok(Self(from_slice(&bytes)?))
    }
}

impl<T: Serialize> Serialize for Tag24<T> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.to_value().map_err(ser::Error::custom)?.serialize(s)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Tag24<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        value.try_into().map_err(de::Error::custom)
    }
}

/// Encode a calendar date as `#6.1004("YYYY-MM-DD")`.
#[must_use]
pub fn full_date(date: NaiveDate) -> Value {
    Value::Tag(TAG_FULL_DATE, Box::new(Value::Text(date.format("%Y-%m-%d").to_string())))
}

/// Encode an instant as `#6.1000("YYYY-MM-DDTHH:MM:SSZ")`, truncated to whole
/// seconds.
#[must_use]
pub fn date_time(instant: &DateTime<Utc>) -> Value {
    Value::Tag(
        TAG_DATE_TIME,
        Box::new(Value::Text(instant.to_rfc3339_opts(SecondsFormat::Secs, true))),
    )
}

/// Decode a `#6.1004` full-date.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if the value is not a tagged full-date.
pub fn parse_full_date(value: Value) -> Result<NaiveDate> {
    let Value::Tag(TAG_FULL_DATE, inner) = value else {
        return Err(Error::Encoding(format!("expected full-date, found {value:?}")));
    };
    let text = into_text(*inner, "full-date")?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|e| Error::Encoding(e.to_string()))
}

/// Decode a `#6.1000` date-time.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if the value is not a tagged date-time.
pub fn parse_date_time(value: Value) -> Result<DateTime<Utc>> {
    let Value::Tag(TAG_DATE_TIME, inner) = value else {
        return Err(Error::Encoding(format!("expected date-time, found {value:?}")));
    };
    let text = into_text(*inner, "date-time")?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// Entries of a decoded CBOR map, removed by key as they are read.
pub(crate) struct MapFields {
    entries: Vec<(Value, Value)>,
    context: &'static str,
}

impl MapFields {
    pub(crate) fn new(value: Value, context: &'static str) -> Result<Self> {
        match value {
            Value::Map(entries) => Ok(Self { entries, context }),
            other => Err(Error::Encoding(format!("{context} is not a map: {other:?}"))),
        }
    }

    /// Remove the entry with text key `key`.
    pub(crate) fn take(&mut self, key: &str) -> Result<Value> {
        self.take_optional(key)
            .ok_or_else(|| Error::Encoding(format!("{} is missing `{key}`", self.context)))
    }

    pub(crate) fn take_optional(&mut self, key: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| matches!(k, Value::Text(t) if t == key))?;
        Some(self.entries.remove(pos).1)
    }

    /// Remove the entry with integer label `label`.
    pub(crate) fn take_label(&mut self, label: i64) -> Result<Value> {
        let label_int = Integer::from(label);
        let Some(pos) = self.entries.iter().position(|(k, _)| k.as_integer() == Some(label_int))
        else {
            return Err(Error::Encoding(format!("{} is missing label {label}", self.context)));
        };
        Ok(self.entries.remove(pos).1)
    }
}

pub(crate) fn into_text(value: Value, what: &str) -> Result<String> {
    match value {
        Value::Text(text) => Ok(text),
        other => Err(Error::Encoding(format!("{what} is not text: {other:?}"))),
    }
}

pub(crate) fn into_bytes(value: Value, what: &str) -> Result<Vec<u8>> {
    match value {
        Value::Bytes(bytes) => Ok(bytes),
        other => Err(Error::Encoding(format!("{what} is not a byte string: {other:?}"))),
    }
}

pub(crate) fn into_array(value: Value, what: &str) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(Error::Encoding(format!("{what} is not an array: {other:?}"))),
    }
}

pub(crate) fn into_u64(value: &Value, what: &str) -> Result<u64> {
    value
        .as_integer()
        .and_then(|i| u64::try_from(i).ok())
        .ok_or_else(|| Error::Encoding(format!("{what} is not an unsigned integer: {value:?}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn tag24_wraps_encoded_bytes() {
        let tagged = Tag24(String::from("some data"));
        let bytes = to_vec(&tagged).expect("should serialize");

        // tag(24), bytes(10), text(9) "some data"
        assert_eq!(hex::encode(&bytes), "d8184a69736f6d652064617461");

        let decoded: Tag24<String> = from_slice(&bytes).expect("should deserialize");
        assert_eq!(decoded, tagged);
    }

    #[test]
    fn tag24_lost_outside_cbor() {
        // JSON has no tags, so the wrapper does not survive a JSON round trip
        let original = Tag24(String::from("some data"));
        let json = serde_json::to_vec(&original).expect("should serialize");
        assert!(serde_json::from_slice::<Tag24<String>>(&json).is_err());
    }

    #[test]
    fn full_date_encoding() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date");
        let bytes = to_vec(&full_date(date)).expect("should serialize");

        // tag(1004), text(10) "2024-02-29"
        assert_eq!(hex::encode(&bytes), "d903ec6a323032342d30322d3239");
        assert_eq!(parse_full_date(from_slice(&bytes).unwrap()).unwrap(), date);
    }

    #[test]
    fn date_time_truncates_seconds() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::milliseconds(987);
        let Value::Tag(tag, text) = date_time(&instant) else {
            panic!("should be tagged");
        };
        assert_eq!(tag, TAG_DATE_TIME);
        assert_eq!(*text, Value::Text("2025-01-02T03:04:05Z".to_string()));
    }

    #[test]
    fn definite_lengths() {
        let value = Value::Map(vec![(
            Value::Text("a".to_string()),
            Value::Array(vec![Value::Integer(1.into()), Value::Integer(500.into())]),
        )]);
        let bytes = to_vec(&value).unwrap();

        // map(1) text "a" array(2) 1 500
        assert_eq!(hex::encode(bytes), "a1616182011901f4");
    }
}
