//! Validity window of the Mobile Security Object.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use ciborium::Value;

use crate::cbor::{self, MapFields};
use crate::error::{Error, Result};

/// Contains information related to the validity of the MSO and its signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidityInfo {
    /// Time the MSO was signed.
    pub signed: DateTime<Utc>,

    /// The timestamp before which the MSO is not yet valid.
    pub valid_from: DateTime<Utc>,

    /// The timestamp after which the MSO is no longer valid.
    pub valid_until: DateTime<Utc>,
}

impl ValidityInfo {
    /// Validity starting at `now` (truncated to whole seconds) and lasting
    /// `ttl_minutes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] when the expiry cannot be represented.
    pub fn new(now: DateTime<Utc>, ttl_minutes: u64) -> Result<Self> {
        let signed = now.trunc_subsecs(0);
        let ttl = i64::try_from(ttl_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .ok_or_else(|| Error::Encoding(format!("ttl of {ttl_minutes} minutes is too large")))?;
        let valid_until = signed
            .checked_add_signed(ttl)
            .ok_or_else(|| Error::Encoding(format!("ttl of {ttl_minutes} minutes is too large")))?;

        Ok(Self {
            signed,
            valid_from: signed,
            valid_until,
        })
    }
}

impl From<ValidityInfo> for Value {
    fn from(info: ValidityInfo) -> Self {
        Self::Map(vec![
            (Self::Text("signed".to_string()), cbor::date_time(&info.signed)),
            (Self::Text("validFrom".to_string()), cbor::date_time(&info.valid_from)),
            (Self::Text("validUntil".to_string()), cbor::date_time(&info.valid_until)),
        ])
    }
}

impl TryFrom<Value> for ValidityInfo {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let mut fields = MapFields::new(value, "validityInfo")?;
        Ok(Self {
            signed: cbor::parse_date_time(fields.take("signed")?)?,
            valid_from: cbor::parse_date_time(fields.take("validFrom")?)?,
            valid_until: cbor::parse_date_time(fields.take("validUntil")?)?,
        })
    }
}
