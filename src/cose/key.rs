//! # COSE Key
//!
//! The holder's device key as received from the wallet, and its `COSE_Key`
//! encoding for the MSO.
//!
//! Only EC2 keys on P-256 can be bound to a credential.

use std::fmt;

use base64ct::{Base64UrlUnpadded, Encoding};
use ciborium::Value;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{EncodedPoint, FieldBytes, PublicKey};
use serde::{Deserialize, Serialize};

use crate::cbor::{self, MapFields};
use crate::cose::fixed::to_fixed_bytes;
use crate::error::{Error, Result};

// COSE_Key labels and values (RFC 9053)
const KTY: i64 = 1;
const CRV: i64 = -1;
const X: i64 = -2;
const Y: i64 = -3;
const KTY_EC2: i64 = 2;
const CRV_P256: i64 = 1;

/// Coordinate size for P-256.
const P256_BITS: usize = 256;

/// Named elliptic curves a holder key may claim to be on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curve {
    /// NIST P-256 (secp256r1).
    P256,

    /// NIST P-384 (secp384r1).
    P384,

    /// NIST P-521 (secp521r1).
    P521,

    /// secp256k1.
    Secp256k1,
}

impl Curve {
    /// Field size in bits.
    #[must_use]
    pub const fn field_size(&self) -> usize {
        match self {
            Self::P256 | Self::Secp256k1 => 256,
            Self::P384 => 384,
            Self::P521 => 521,
        }
    }

    /// JOSE curve name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
            Self::Secp256k1 => "secp256k1",
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<&str> for Curve {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        match name {
            "P-256" => Ok(Self::P256),
            "P-384" => Ok(Self::P384),
            "P-521" => Ok(Self::P521),
            "secp256k1" => Ok(Self::Secp256k1),
            other => Err(Error::UnsupportedCurve(other.to_string())),
        }
    }
}

/// An elliptic curve public key as affine coordinates.
///
/// Coordinates are big-endian unsigned integers and may be shorter or longer
/// than the curve's field size (for example, with leading zeros stripped or a
/// sign byte prepended).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcPublicKey {
    /// Curve the key is on.
    pub curve: Curve,

    /// Affine X coordinate.
    pub x: Vec<u8>,

    /// Affine Y coordinate.
    pub y: Vec<u8>,
}

impl EcPublicKey {
    /// Create a key from its coordinates.
    #[must_use]
    pub const fn new(curve: Curve, x: Vec<u8>, y: Vec<u8>) -> Self {
        Self { curve, x, y }
    }
}

impl From<&PublicKey> for EcPublicKey {
    fn from(key: &PublicKey) -> Self {
        // uncompressed points always carry both coordinates
        let point = key.to_encoded_point(false);
        Self {
            curve: Curve::P256,
            x: point.x().map_or_else(Vec::new, |x| x.to_vec()),
            y: point.y().map_or_else(Vec::new, |y| y.to_vec()),
        }
    }
}

/// Public key in JWK format, as sent by a wallet in a proof of possession.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PublicKeyJwk {
    /// Key type. Must be `EC`.
    pub kty: String,

    /// Curve name, e.g. `P-256`.
    pub crv: String,

    /// Base64url encoded X coordinate.
    pub x: String,

    /// Base64url encoded Y coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl TryFrom<&PublicKeyJwk> for EcPublicKey {
    type Error = Error;

    fn try_from(jwk: &PublicKeyJwk) -> Result<Self> {
        if jwk.kty != "EC" {
            return Err(Error::UnsupportedCurve(format!("key type {} is not EC", jwk.kty)));
        }
        let curve = Curve::try_from(jwk.crv.as_str())?;
        let Some(y) = &jwk.y else {
            return Err(Error::Encoding("EC key has no y coordinate".to_string()));
        };

        let decode = |coord: &str| {
            Base64UrlUnpadded::decode_vec(coord)
                .map_err(|e| Error::Encoding(format!("invalid coordinate: {e}")))
        };
        Ok(Self::new(curve, decode(&jwk.x)?, decode(y)?))
    }
}

/// Implements an EC2 P-256 [`COSE_Key`] as defined in [RFC9052].
///
/// [RFC9052]: https://www.rfc-editor.org/rfc/rfc9052.html#name-key-objects
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
#[allow(clippy::module_name_repetitions)]
pub struct CoseKey {
    /// Public key X, exactly 32 bytes.
    x: Vec<u8>,

    /// Public key Y, exactly 32 bytes.
    y: Vec<u8>,
}

impl CoseKey {
    /// X coordinate.
    #[must_use]
    pub fn x(&self) -> &[u8] {
        &self.x
    }

    /// Y coordinate.
    #[must_use]
    pub fn y(&self) -> &[u8] {
        &self.y
    }

    /// The key as a P-256 public key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCurve`] if the point is not on P-256.
    pub fn to_public_key(&self) -> Result<PublicKey> {
        let point = EncodedPoint::from_affine_coordinates(
            FieldBytes::from_slice(&self.x),
            FieldBytes::from_slice(&self.y),
            false,
        );
        Option::<PublicKey>::from(PublicKey::from_encoded_point(&point))
            .ok_or_else(|| Error::UnsupportedCurve("point is not on P-256".to_string()))
    }
}

/// Convert the holder's key, fitting each coordinate to 32 bytes.
impl TryFrom<&EcPublicKey> for CoseKey {
    type Error = Error;

    fn try_from(key: &EcPublicKey) -> Result<Self> {
        if key.curve != Curve::P256 || key.curve.field_size() != P256_BITS {
            return Err(Error::UnsupportedCurve(format!(
                "{} ({} bit field) is not P-256",
                key.curve,
                key.curve.field_size()
            )));
        }
        Ok(Self {
            x: to_fixed_bytes(&key.x, P256_BITS),
            y: to_fixed_bytes(&key.y, P256_BITS),
        })
    }
}

/// Serialize `COSE_Key` to CBOR.
impl From<CoseKey> for Value {
    fn from(key: CoseKey) -> Self {
        // kty: 1, Ec2: 2, crv: -1, P-256: 1, x: -2, y: -3
        Self::Map(vec![
            (Self::Integer(KTY.into()), Self::Integer(KTY_EC2.into())),
            (Self::Integer(CRV.into()), Self::Integer(CRV_P256.into())),
            (Self::Integer(X.into()), Self::Bytes(key.x)),
            (Self::Integer(Y.into()), Self::Bytes(key.y)),
        ])
    }
}

/// Deserialize `COSE_Key` from CBOR.
impl TryFrom<Value> for CoseKey {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let mut fields = MapFields::new(value, "COSE_Key")?;

        let kty = fields.take_label(KTY)?;
        let crv = fields.take_label(CRV)?;
        if kty.as_integer() != Some(KTY_EC2.into()) || crv.as_integer() != Some(CRV_P256.into()) {
            return Err(Error::UnsupportedCurve(format!("kty {kty:?}, crv {crv:?}")));
        }

        let x = cbor::into_bytes(fields.take_label(X)?, "x")?;
        let y = cbor::into_bytes(fields.take_label(Y)?, "y")?;
        if x.len() != P256_BITS / 8 || y.len() != P256_BITS / 8 {
            return Err(Error::Encoding("P-256 coordinates must be 32 bytes".to_string()));
        }
        Ok(Self { x, y })
    }
}
