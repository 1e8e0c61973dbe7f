//! # Documents
//!
//! Concrete document types and their schemas. Documents are deserialized
//! from the JSON dataset held by the host application, where field names are
//! snake_case and dates use the `dd-MM-yyyy` format.

mod driving_licence;
mod example;

pub use self::driving_licence::{
    Code, DrivingLicenceDocument, DrivingPrivilege, GB_NAMESPACE, MDL_DOC_TYPE,
};
pub use self::example::{ExampleDocument, EXAMPLE_DOC_TYPE, FISHING_NAMESPACE};

/// Namespace for the ISO/IEC 18013-5 data elements.
pub const ISO_NAMESPACE: &str = "org.iso.18013.5.1";

/// Input format for dates.
const DATE_FORMAT: &str = "%d-%m-%Y";

/// Deserialize a `dd-MM-yyyy` date.
mod dmy_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&text, super::DATE_FORMAT)
            .map_err(|e| de::Error::custom(format!("invalid date {text}: {e}")))
    }
}

/// Deserialize standard base64 into bytes.
mod base64_bytes {
    use base64ct::{Base64, Encoding};
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Base64::decode_vec(&text).map_err(de::Error::custom)
    }
}
