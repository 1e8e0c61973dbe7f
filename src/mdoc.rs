//! # Issuer-signed mdoc
//!
//! Data elements returned by the issuer, grouped by namespace, together with
//! the `COSE_Sign1` over the Mobile Security Object.
//!
//! See ISO/IEC 18013-5, 8.3.2.1.2.2 Device retrieval mdoc response.

mod value;

use base64ct::{Base64UrlUnpadded, Encoding};
use ciborium::Value;
use coset::{AsCborValue, CoseSign1};
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};

pub use self::value::ElementValue;
use crate::cbor::{self, MapFields, Tag24};
use crate::error::{Error, Result};
use crate::mso::{DigestId, MobileSecurityObject};

/// Namespace identifier, e.g. `org.iso.18013.5.1`.
pub type NameSpace = String;

/// Length of the per-item salt in bytes.
pub const SALT_LEN: usize = 16;

/// Issuer-signed data element.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct IssuerSignedItem {
    /// Id of the digest as added to the MSO `value_digests` parameter.
    pub digest_id: DigestId,

    /// Random salt for issuer data authentication.
    pub random: Vec<u8>,

    /// Data element identifier. For example, `family_name`.
    pub element_identifier: String,

    /// Data element value. For example, `Smith`.
    pub element_value: ElementValue,
}

impl IssuerSignedItem {
    /// The item as it appears in the credential and as it is hashed:
    /// `#6.24(bstr .cbor IssuerSignedItem)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the item cannot be serialized.
    pub fn to_tagged_bytes(&self) -> Result<Vec<u8>> {
        cbor::to_vec(&Tag24(self))
    }
}

/// Serialize `IssuerSignedItem` with its fields in wire order.
impl From<IssuerSignedItem> for Value {
    fn from(item: IssuerSignedItem) -> Self {
        Self::Map(vec![
            (Self::Text("digestID".to_string()), Self::Integer(item.digest_id.into())),
            (Self::Text("random".to_string()), Self::Bytes(item.random)),
            (Self::Text("elementIdentifier".to_string()), Self::Text(item.element_identifier)),
            (Self::Text("elementValue".to_string()), item.element_value.into()),
        ])
    }
}

impl TryFrom<Value> for IssuerSignedItem {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let mut fields = MapFields::new(value, "IssuerSignedItem")?;
        let digest_id = cbor::into_u64(&fields.take("digestID")?, "digestID")?;
        Ok(Self {
            digest_id: DigestId::try_from(digest_id)
                .map_err(|_| Error::Encoding(format!("digestID {digest_id} out of range")))?,
            random: cbor::into_bytes(fields.take("random")?, "random")?,
            element_identifier: cbor::into_text(
                fields.take("elementIdentifier")?,
                "elementIdentifier",
            )?,
            element_value: fields.take("elementValue")?.try_into()?,
        })
    }
}

/// Issuer-signed items grouped by namespace. Namespaces keep the order in
/// which they were first added.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NameSpaces(Vec<(NameSpace, Vec<IssuerSignedItem>)>);

impl NameSpaces {
    /// Append `item` to `name_space`, adding the namespace if it is new.
    pub fn push(&mut self, name_space: &str, item: IssuerSignedItem) {
        if let Some((_, items)) = self.0.iter_mut().find(|(ns, _)| ns == name_space) {
            items.push(item);
        } else {
            self.0.push((name_space.to_string(), vec![item]));
        }
    }

    /// Items for `name_space`, if present.
    #[must_use]
    pub fn get(&self, name_space: &str) -> Option<&[IssuerSignedItem]> {
        self.0.iter().find(|(ns, _)| ns == name_space).map(|(_, items)| items.as_slice())
    }

    /// Namespace identifiers in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(ns, _)| ns.as_str())
    }

    /// Iterate over `(namespace, items)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[IssuerSignedItem])> {
        self.0.iter().map(|(ns, items)| (ns.as_str(), items.as_slice()))
    }

    /// Number of namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no namespace has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `{ namespace => [ #6.24(bstr .cbor IssuerSignedItem), ... ] }`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if an item cannot be serialized.
    pub fn to_value(&self) -> Result<Value> {
        let mut entries = Vec::with_capacity(self.0.len());
        for (name_space, items) in &self.0 {
            let tagged = items.iter().map(|item| Tag24(item).to_value()).collect::<Result<_>>()?;
            entries.push((Value::Text(name_space.clone()), Value::Array(tagged)));
        }
        Ok(Value::Map(entries))
    }
}

impl TryFrom<Value> for NameSpaces {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let Value::Map(entries) = value else {
            return Err(Error::Encoding("nameSpaces is not a map".to_string()));
        };
        let mut name_spaces = Self::default();
        for (key, items) in entries {
            let name_space = cbor::into_text(key, "namespace")?;
            let items = cbor::into_array(items, "namespace items")?
                .into_iter()
                .map(|item| Tag24::<IssuerSignedItem>::try_from(item).map(|t| t.0))
                .collect::<Result<Vec<_>>>()?;
            name_spaces.0.push((name_space, items));
        }
        Ok(name_spaces)
    }
}

/// Data elements (claims) returned by the Issuer along with the issuer's
/// signature over their digests.
#[derive(Clone, Debug)]
pub struct IssuerSigned {
    /// Returned data elements for each namespace (`IssuerNameSpaces` element).
    pub name_spaces: NameSpaces,

    /// The mobile security object (MSO) for issuer data authentication.
    /// `COSE_Sign1` with a payload of `MobileSecurityObjectBytes`.
    pub issuer_auth: CoseSign1,
}

impl IssuerSigned {
    /// `{ "nameSpaces": ..., "issuerAuth": COSE_Sign1 }`, with `issuerAuth`
    /// as an untagged four-element array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if any part cannot be serialized.
    pub fn to_value(&self) -> Result<Value> {
        Ok(Value::Map(vec![
            (Value::Text("nameSpaces".to_string()), self.name_spaces.to_value()?),
            (Value::Text("issuerAuth".to_string()), self.issuer_auth.clone().to_cbor_value()?),
        ]))
    }

    /// Serialize to CBOR bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if any part cannot be serialized.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        cbor::to_vec(&self.to_value()?)
    }

    /// Deserialize from CBOR bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the bytes are not an `IssuerSigned`
    /// structure.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        cbor::from_slice::<Value>(bytes)?.try_into()
    }

    /// Decode the Mobile Security Object carried as the `issuerAuth` payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the payload is missing or malformed.
    pub fn mso(&self) -> Result<MobileSecurityObject> {
        let Some(payload) = &self.issuer_auth.payload else {
            return Err(Error::Encoding("issuerAuth has no payload".to_string()));
        };
        let Tag24(mso) = cbor::from_slice::<Tag24<MobileSecurityObject>>(payload)?;
        Ok(mso)
    }
}

impl TryFrom<Value> for IssuerSigned {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let mut fields = MapFields::new(value, "IssuerSigned")?;
        Ok(Self {
            name_spaces: fields.take("nameSpaces")?.try_into()?,
            issuer_auth: CoseSign1::from_cbor_value(fields.take("issuerAuth")?)?,
        })
    }
}

impl Serialize for IssuerSigned {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.to_value().map_err(ser::Error::custom)?.serialize(s)
    }
}

impl<'de> Deserialize<'de> for IssuerSigned {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer)?.try_into().map_err(de::Error::custom)
    }
}

/// Decode a credential produced by [`crate::issuer::MdocBuilder`]: base64url
/// (no padding) over the CBOR-encoded `IssuerSigned` structure.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if the text is not base64url or the bytes are
/// not an `IssuerSigned` structure.
pub fn decode_credential(encoded: &str) -> Result<IssuerSigned> {
    let bytes = Base64UrlUnpadded::decode_vec(encoded)
        .map_err(|e| Error::Encoding(format!("invalid base64url: {e}")))?;
    IssuerSigned::from_slice(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(digest_id: DigestId, name: &str, value: impl Into<ElementValue>) -> IssuerSignedItem {
        IssuerSignedItem {
            digest_id,
            random: vec![0x11; SALT_LEN],
            element_identifier: name.to_string(),
            element_value: value.into(),
        }
    }

    #[test]
    fn item_field_order() {
        let bytes = cbor::to_vec(&item(7, "family_name", "Smith")).unwrap();

        // map(4) "digestID" 7 "random" bstr(16)...
        let expected = concat!(
            "a4",
            "686469676573744944", "07",
            "6672616e646f6d", "50", "11111111111111111111111111111111",
            "71656c656d656e744964656e746966696572", "6b66616d696c795f6e616d65",
            "6c656c656d656e7456616c7565", "65536d697468",
        );
        assert_eq!(hex::encode(bytes), expected);
    }

    #[test]
    fn tagged_item_bytes() {
        let item = item(1, "age_over_18", true);
        let tagged = item.to_tagged_bytes().unwrap();
        let plain = cbor::to_vec(&item).unwrap();

        // tag(24) then a byte string header sized to the plain encoding
        assert_eq!(&tagged[..2], &[0xd8, 0x18]);
        assert_eq!(&tagged[tagged.len() - plain.len()..], plain.as_slice());
    }

    #[test]
    fn namespaces_keep_insertion_order() {
        let mut name_spaces = NameSpaces::default();
        name_spaces.push("org.iso.18013.5.1.GB", item(3, "title", "Mr"));
        name_spaces.push("org.iso.18013.5.1", item(4, "family_name", "Smith"));
        name_spaces.push("org.iso.18013.5.1.GB", item(5, "welsh_licence", false));

        assert_eq!(
            name_spaces.names().collect::<Vec<_>>(),
            vec!["org.iso.18013.5.1.GB", "org.iso.18013.5.1"]
        );
        assert_eq!(name_spaces.get("org.iso.18013.5.1.GB").map(<[_]>::len), Some(2));

        let decoded = NameSpaces::try_from(name_spaces.to_value().unwrap()).unwrap();
        assert_eq!(decoded, name_spaces);
    }

    #[test]
    fn bad_base64() {
        assert!(matches!(decode_credential("not base64!"), Err(Error::Encoding(_))));
    }
}
