//! # Mobile Security Object (MSO)
//!
//! The MSO is used to provide Issuer data authentication for the associated
//! `mdoc`. It contains a digest of every issuer-signed item, the holder's
//! device key, and the validity window of the credential. The MSO is the
//! payload of the issuer's `COSE_Sign1` signature.
//!
//! See ISO/IEC 18013-5, 9.1.2.4 Signing method and structure for MSO.

mod digest_id;
mod digests;
mod validity;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ciborium::Value;
use serde::{Deserialize, Serialize};
use tracing::instrument;

pub use self::digest_id::DigestIdGenerator;
pub use self::digests::{value_digests, DigestAlgorithm};
pub use self::validity::ValidityInfo;
use crate::cbor::{self, MapFields};
use crate::cose::{CoseKey, EcPublicKey};
use crate::error::{Error, Result};
use crate::mdoc::{NameSpace, NameSpaces};
use crate::provider::Clock;

/// Digests of every item, keyed by namespace and then digest ID.
pub type ValueDigests = BTreeMap<NameSpace, DigestIds>;

/// Digests of one namespace's items, ordered by digest ID.
pub type DigestIds = BTreeMap<DigestId, Digest>;

/// `DigestID` is an unsigned integer used to match the hashes in the MSO to
/// the data elements in the mdoc response.
///
/// The Digest ID must be unique within a namespace with no correlation between
/// ID's for the same namespace/element in different MSO's.
pub type DigestId = u32;

/// A value digest.
pub type Digest = Vec<u8>;

/// The only supported MSO version.
pub const MSO_VERSION: &str = "1.0";

/// An mdoc digital signature is generated over the mobile security object (MSO).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct MobileSecurityObject {
    /// Version of the `MobileSecurityObject`. Must be 1.0.
    pub version: String,

    /// Message digest algorithm used.
    pub digest_algorithm: DigestAlgorithm,

    /// An ordered set of value digests for each data element in each name space.
    pub value_digests: ValueDigests,

    /// Device key information.
    pub device_key_info: DeviceKeyInfo,

    /// The document type of the document being signed.
    pub doc_type: String,

    /// Validity information for the MSO.
    pub validity_info: ValidityInfo,

    /// Where the credential's revocation status is published.
    pub status: Status,
}

/// Used to hold the mdoc authentication public key and information related to
/// this key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceKeyInfo {
    /// Holder's device key as an untagged `COSE_Key`.
    pub device_key: CoseKey,

    /// Key authorizations.
    pub key_authorizations: KeyAuthorizations,
}

/// Namespaces the device key is authorized to present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyAuthorizations {
    /// Authorized namespaces.
    pub name_spaces: Vec<NameSpace>,
}

/// Credential status entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    /// Position of the credential in the published status list.
    pub status_list: StatusListInfo,
}

/// Index and location of a credential's entry in a status list, as allocated
/// by the status list service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusListInfo {
    /// Index into the status list.
    pub idx: u64,

    /// URI of the published status list.
    pub uri: String,
}

/// Builds the Mobile Security Object for a set of issuer-signed items.
#[derive(Debug)]
pub struct MsoFactory<'a, C: Clock + ?Sized> {
    clock: &'a C,
}

impl<'a, C: Clock + ?Sized> MsoFactory<'a, C> {
    /// Create a factory reading the signing time from `clock`.
    pub const fn new(clock: &'a C) -> Self {
        Self { clock }
    }

    /// Build the MSO for `name_spaces`, binding it to the holder's
    /// `device_key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCurve`] if `device_key` is not a P-256 key,
    /// or [`Error::Encoding`] if digests or validity cannot be computed.
    #[instrument(level = "debug", skip(self, name_spaces, device_key))]
    pub fn build(
        &self, name_spaces: &NameSpaces, device_key: &EcPublicKey, status: &StatusListInfo,
        doc_type: &str, ttl_minutes: u64,
    ) -> Result<MobileSecurityObject> {
        tracing::debug!("MsoFactory::build");

        let digest_algorithm = DigestAlgorithm::Sha256;
        let value_digests = value_digests(name_spaces, digest_algorithm)?;
        let device_key_info = DeviceKeyInfo {
            device_key: CoseKey::try_from(device_key)?,
            key_authorizations: KeyAuthorizations {
                name_spaces: name_spaces.names().map(ToString::to_string).collect(),
            },
        };
        let validity_info = ValidityInfo::new(self.clock.now(), ttl_minutes)?;

        Ok(MobileSecurityObject {
            version: MSO_VERSION.to_string(),
            digest_algorithm,
            value_digests,
            device_key_info,
            doc_type: doc_type.to_string(),
            validity_info,
            status: Status {
                status_list: status.clone(),
            },
        })
    }
}

impl MobileSecurityObject {
    /// True when `now` falls inside the validity window.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.validity_info.valid_from <= now && now <= self.validity_info.valid_until
    }
}

/// Serialize the MSO with its fields in wire order.
impl From<MobileSecurityObject> for Value {
    fn from(mso: MobileSecurityObject) -> Self {
        let value_digests = mso
            .value_digests
            .into_iter()
            .map(|(ns, digests)| (Self::Text(ns), digests::digest_ids_to_value(digests)))
            .collect();

        Self::Map(vec![
            (Self::Text("version".to_string()), Self::Text(mso.version)),
            (
                Self::Text("digestAlgorithm".to_string()),
                Self::Text(mso.digest_algorithm.as_str().to_string()),
            ),
            (Self::Text("valueDigests".to_string()), Self::Map(value_digests)),
            (Self::Text("deviceKeyInfo".to_string()), mso.device_key_info.into()),
            (Self::Text("docType".to_string()), Self::Text(mso.doc_type)),
            (Self::Text("validityInfo".to_string()), mso.validity_info.into()),
            (Self::Text("status".to_string()), mso.status.into()),
        ])
    }
}

impl TryFrom<Value> for MobileSecurityObject {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let mut fields = MapFields::new(value, "MobileSecurityObject")?;

        let version = cbor::into_text(fields.take("version")?, "version")?;
        if version != MSO_VERSION {
            return Err(Error::Encoding(format!("unsupported MSO version {version}")));
        }
        let algorithm = cbor::into_text(fields.take("digestAlgorithm")?, "digestAlgorithm")?;

        let Value::Map(entries) = fields.take("valueDigests")? else {
            return Err(Error::Encoding("valueDigests is not a map".to_string()));
        };
        let mut value_digests = ValueDigests::new();
        for (ns, digests) in entries {
            value_digests.insert(
                cbor::into_text(ns, "namespace")?,
                digests::digest_ids_from_value(digests)?,
            );
        }

        Ok(Self {
            version,
            digest_algorithm: DigestAlgorithm::try_from(algorithm.as_str())?,
            value_digests,
            device_key_info: fields.take("deviceKeyInfo")?.try_into()?,
            doc_type: cbor::into_text(fields.take("docType")?, "docType")?,
            validity_info: fields.take("validityInfo")?.try_into()?,
            status: fields.take("status")?.try_into()?,
        })
    }
}

impl From<DeviceKeyInfo> for Value {
    fn from(info: DeviceKeyInfo) -> Self {
        let name_spaces = info.key_authorizations.name_spaces.into_iter().map(Self::Text).collect();
        Self::Map(vec![
            (Self::Text("deviceKey".to_string()), info.device_key.into()),
            (
                Self::Text("keyAuthorizations".to_string()),
                Self::Map(vec![(Self::Text("nameSpaces".to_string()), Self::Array(name_spaces))]),
            ),
        ])
    }
}

impl TryFrom<Value> for DeviceKeyInfo {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let mut fields = MapFields::new(value, "deviceKeyInfo")?;
        let device_key = fields.take("deviceKey")?.try_into()?;

        let key_authorizations = match fields.take_optional("keyAuthorizations") {
            Some(value) => {
                let mut auth = MapFields::new(value, "keyAuthorizations")?;
                let name_spaces = match auth.take_optional("nameSpaces") {
                    Some(list) => cbor::into_array(list, "nameSpaces")?
                        .into_iter()
                        .map(|ns| cbor::into_text(ns, "namespace"))
                        .collect::<Result<_>>()?,
                    None => Vec::new(),
                };
                KeyAuthorizations { name_spaces }
            }
            None => KeyAuthorizations::default(),
        };

        Ok(Self {
            device_key,
            key_authorizations,
        })
    }
}

/// `{ "status_list": { "idx": uint, "uri": tstr } }`
impl From<Status> for Value {
    fn from(status: Status) -> Self {
        Self::Map(vec![(
            Self::Text("status_list".to_string()),
            Self::Map(vec![
                (Self::Text("idx".to_string()), Self::Integer(status.status_list.idx.into())),
                (Self::Text("uri".to_string()), Self::Text(status.status_list.uri)),
            ]),
        )])
    }
}

impl TryFrom<Value> for Status {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let mut fields = MapFields::new(value, "status")?;
        let mut list = MapFields::new(fields.take("status_list")?, "status_list")?;
        Ok(Self {
            status_list: StatusListInfo {
                idx: cbor::into_u64(&list.take("idx")?, "idx")?,
                uri: cbor::into_text(list.take("uri")?, "uri")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::cose::Curve;
    use crate::mdoc::IssuerSignedItem;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn device_key() -> EcPublicKey {
        EcPublicKey::new(Curve::P256, vec![0x01; 32], vec![0x02; 32])
    }

    fn name_spaces() -> NameSpaces {
        let mut name_spaces = NameSpaces::default();
        for (ns, id, name) in [
            ("org.iso.18013.5.1", 12, "family_name"),
            ("org.iso.18013.5.1", 4, "given_name"),
            ("org.iso.18013.5.1.GB", 20, "title"),
        ] {
            name_spaces.push(ns, IssuerSignedItem {
                digest_id: id,
                random: vec![0x5a; 16],
                element_identifier: name.to_string(),
                element_value: "x".into(),
            });
        }
        name_spaces
    }

    fn status() -> StatusListInfo {
        StatusListInfo {
            idx: 7,
            uri: "https://status.example.com/t/1".to_string(),
        }
    }

    #[test]
    fn builds_mso() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        let clock = FixedClock(now);
        let mso = MsoFactory::new(&clock)
            .build(&name_spaces(), &device_key(), &status(), "org.iso.18013.5.1.mDL", 60)
            .expect("should build");

        assert_eq!(mso.version, "1.0");
        assert_eq!(mso.digest_algorithm, DigestAlgorithm::Sha256);
        assert_eq!(mso.doc_type, "org.iso.18013.5.1.mDL");
        let ids: Vec<_> = mso.value_digests["org.iso.18013.5.1"].keys().copied().collect();
        assert_eq!(ids, vec![4, 12]);
        assert_eq!(
            mso.device_key_info.key_authorizations.name_spaces,
            vec!["org.iso.18013.5.1", "org.iso.18013.5.1.GB"]
        );
        assert_eq!(mso.validity_info.signed, now);
        assert!(mso.is_valid_at(now + chrono::Duration::minutes(30)));
        assert!(!mso.is_valid_at(now + chrono::Duration::minutes(61)));
    }

    #[test]
    fn wire_key_order() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());
        let mso = MsoFactory::new(&clock)
            .build(&name_spaces(), &device_key(), &status(), "org.iso.18013.5.1.mDL", 60)
            .unwrap();

        let Value::Map(entries) = Value::from(mso.clone()) else { panic!("should be a map") };
        let keys: Vec<_> = entries.iter().filter_map(|(k, _)| k.as_text()).collect();
        assert_eq!(
            keys,
            vec![
                "version",
                "digestAlgorithm",
                "valueDigests",
                "deviceKeyInfo",
                "docType",
                "validityInfo",
                "status"
            ]
        );

        let bytes = cbor::to_vec(&mso).unwrap();
        let decoded: MobileSecurityObject = cbor::from_slice(&bytes).unwrap();
        assert_eq!(decoded, mso);
    }

    #[test]
    fn status_encoding() {
        let value = Value::from(Status {
            status_list: StatusListInfo {
                idx: 3,
                uri: "u".to_string(),
            },
        });
        let bytes = cbor::to_vec(&value).unwrap();

        // {"status_list": {"idx": 3, "uri": "u"}}
        assert_eq!(hex::encode(bytes), "a16b7374617475735f6c697374a26369647803637572696175");
    }

    #[test]
    fn non_p256_key_rejected() {
        let clock = FixedClock(Utc::now());
        let key = EcPublicKey::new(Curve::P384, vec![1; 48], vec![2; 48]);
        let err = MsoFactory::new(&clock)
            .build(&name_spaces(), &key, &status(), "org.iso.18013.5.1.mDL", 60)
            .expect_err("should fail");
        assert!(matches!(err, Error::UnsupportedCurve(_)));
    }
}
