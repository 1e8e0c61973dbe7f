//! # Issuance Errors
//!
//! Errors returned while building an mdoc credential. Each variant names the
//! stage of the pipeline that failed so callers can map them to a response.

use thiserror::Error;

/// Result type for mdoc issuance.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the issuance pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// A document field could not be read, or a required field was empty.
    #[error("unable to read {namespace}/{field}: {reason}")]
    SchemaAccess {
        /// Namespace the field belongs to.
        namespace: String,

        /// Element identifier (camelCase field name).
        field: String,

        /// Underlying cause.
        reason: String,
    },

    /// The holder's public key is not on the P-256 curve.
    #[error("unsupported curve: {0}")]
    UnsupportedCurve(String),

    /// A value could not be encoded to (or decoded from) CBOR.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The key service failed, or returned a signature that could not be
    /// transcoded.
    #[error("signing error: {0}")]
    Signing(String),

    /// The signing certificate could not be retrieved or parsed.
    #[error("certificate error: {0}")]
    Certificate(String),
}

impl Error {
    pub(crate) fn schema_access(
        namespace: &str, field: &str, reason: impl ToString,
    ) -> Self {
        Self::SchemaAccess {
            namespace: namespace.to_string(),
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<ciborium::ser::Error<std::io::Error>> for Error {
    fn from(e: ciborium::ser::Error<std::io::Error>) -> Self {
        Self::Encoding(e.to_string())
    }
}

impl From<ciborium::de::Error<std::io::Error>> for Error {
    fn from(e: ciborium::de::Error<std::io::Error>) -> Self {
        Self::Encoding(e.to_string())
    }
}

impl From<coset::CoseError> for Error {
    fn from(e: coset::CoseError) -> Self {
        Self::Encoding(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_access_message() {
        let err = Error::schema_access("org.iso.18013.5.1", "familyName", "value missing");
        assert_eq!(err.to_string(), "unable to read org.iso.18013.5.1/familyName: value missing");
    }
}
