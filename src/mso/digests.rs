//! Value digests: the hash of every issuer-signed item, keyed by namespace
//! and digest ID.

use std::collections::BTreeMap;

use ciborium::Value;
use sha2::{Digest as _, Sha256};

use crate::cbor;
use crate::error::{Error, Result};
use crate::mdoc::NameSpaces;
use crate::mso::{Digest, DigestIds, ValueDigests};

/// Digest algorithm used by the MSO.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// SHA-256
    #[default]
    Sha256,
}

impl DigestAlgorithm {
    /// Identifier used in the MSO.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
        }
    }

    /// Hash `data` with this algorithm.
    #[must_use]
    pub fn digest(&self, data: &[u8]) -> Digest {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
        }
    }
}

impl TryFrom<&str> for DigestAlgorithm {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "SHA-256" => Ok(Self::Sha256),
            other => Err(Error::Encoding(format!("unsupported digest algorithm: {other}"))),
        }
    }
}

/// Compute the digest of every item in `name_spaces`.
///
/// Each digest covers the tag-24 wrapped item bytes exactly as they appear in
/// the credential.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if an item cannot be serialized or a digest ID
/// is repeated within a namespace.
pub fn value_digests(
    name_spaces: &NameSpaces, algorithm: DigestAlgorithm,
) -> Result<ValueDigests> {
    let mut value_digests = ValueDigests::new();

    for (name_space, items) in name_spaces.iter() {
        let mut digests = DigestIds::new();
        for item in items {
            let digest = algorithm.digest(&item.to_tagged_bytes()?);
            if digests.insert(item.digest_id, digest).is_some() {
                return Err(Error::Encoding(format!(
                    "digest id {} repeated in {name_space}",
                    item.digest_id
                )));
            }
        }
        value_digests.insert(name_space.to_string(), digests);
    }

    Ok(value_digests)
}

pub(super) fn digest_ids_to_value(digests: DigestIds) -> Value {
    Value::Map(
        digests
            .into_iter()
            .map(|(id, digest)| (Value::Integer(id.into()), Value::Bytes(digest)))
            .collect(),
    )
}

pub(super) fn digest_ids_from_value(value: Value) -> Result<DigestIds> {
    let Value::Map(entries) = value else {
        return Err(Error::Encoding("digest ids are not a map".to_string()));
    };
    let mut digests = BTreeMap::new();
    for (id, digest) in entries {
        let id = cbor::into_u64(&id, "digest id")?;
        let id = u32::try_from(id)
            .map_err(|_| Error::Encoding(format!("digest id {id} out of range")))?;
        digests.insert(id, cbor::into_bytes(digest, "digest")?);
    }
    Ok(digests)
}
