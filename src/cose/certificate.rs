//! X.509 certificate of the document-signing key.

use der::asn1::AnyRef;
use der::{Decode, Tag, Tagged};

use crate::error::{Error, Result};

const PEM_LABEL: &str = "CERTIFICATE";

/// A DER encoded X.509 certificate, carried in the `x5chain` header of the
/// issuer signature.
///
/// Only the outer structure is checked: the bytes must be a single ASN.1
/// SEQUENCE with no trailing data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Certificate(Vec<u8>);

impl Certificate {
    /// Wrap DER bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Certificate`] if the bytes are not a DER SEQUENCE.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self> {
        let der = der.into();
        let any = AnyRef::from_der(&der).map_err(|e| Error::Certificate(e.to_string()))?;
        if any.tag() != Tag::Sequence {
            return Err(Error::Certificate(format!("expected SEQUENCE, found {}", any.tag())));
        }
        Ok(Self(der))
    }

    /// Parse a PEM `CERTIFICATE` block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Certificate`] if the text is not PEM, has a different
    /// label, or does not contain a DER SEQUENCE.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let (label, der) = der::pem::decode_vec(pem.trim().as_bytes())
            .map_err(|e| Error::Certificate(e.to_string()))?;
        if label != PEM_LABEL {
            return Err(Error::Certificate(format!("unexpected PEM label {label}")));
        }
        Self::from_der(der)
    }

    /// The DER bytes.
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.0
    }
}
