use anyhow::{anyhow, bail, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use mdoc_issuer::cose::{Curve, EcPublicKey, PublicKeyJwk};
use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;

pub const ISSUER_KEY_ID: &str = "ff275b92-0def-4dfc-b0f6-87c96b26c6c7";
pub const ISSUER_KEY_ARN: &str =
    "arn:aws:kms:eu-west-2:123456789012:key/ff275b92-0def-4dfc-b0f6-87c96b26c6c7";
const ISSUER_SECRET: &str = "cu2Li9ru1khgy5Z084ALTeM2BlqynJnNm0WuKrY-R9I";
const HOLDER_SECRET: &str = "T84fiv8a1gniC_uNqOdijsDjE6IQmaugOXhIvG2oGno";

/// Self-signed certificate for the issuer's document-signing key.
pub const DOCUMENT_SIGNER_PEM: &str = "-----BEGIN CERTIFICATE-----
MIIB5DCCAYugAwIBAgIUU8NnHMUZMYrMwnSipY+4I+DIPuwwCgYIKoZIzj0EAwIw
SDELMAkGA1UEBhMCR0IxFzAVBgNVBAoMDkV4YW1wbGUgSXNzdWVyMSAwHgYDVQQD
DBdFeGFtcGxlIERvY3VtZW50IFNpZ25lcjAeFw0yNjEwMTkxMzI0MTBaFw0zNjEw
MTYxMzI0MTBaMEgxCzAJBgNVBAYTAkdCMRcwFQYDVQQKDA5FeGFtcGxlIElzc3Vl
cjEgMB4GA1UEAwwXRXhhbXBsZSBEb2N1bWVudCBTaWduZXIwWTATBgcqhkjOPQIB
BggqhkjOPQMBBwNCAATeRao6pXM/1B7gwYEXIWoMKGN0CQXHiRbxgnFO4wI7LVHn
d3Z1dNHzAKfbtaKK1qsDqqMAcF90ycXmbUpl/sSVo1MwUTAdBgNVHQ4EFgQUYyF/
QBNphjFt3sIBjIJqSiWSKaUwHwYDVR0jBBgwFoAUYyF/QBNphjFt3sIBjIJqSiWS
KaUwDwYDVR0TAQH/BAUwAwEB/zAKBggqhkjOPQQDAgNHADBEAiAuDosbY4uuUfUW
1iaeFJT/YwLxk0FguVXkyWyWJXkI9wIgXn2mJWCOoQsECg75jb2H8AvqdqCiYD4G
Yu8dyyAJDLg=
-----END CERTIFICATE-----
";

fn signing_key(secret: &str) -> Result<SigningKey> {
    let decoded = Base64UrlUnpadded::decode_vec(secret)?;
    SigningKey::from_slice(&decoded).map_err(|e| anyhow!("invalid secret key: {e}"))
}

/// Stand-in for the key service holding the document-signing key.
#[derive(Default, Clone, Debug)]
pub struct IssuerKeystore;

impl IssuerKeystore {
    /// Sign a SHA-256 digest, returning an ASN.1/DER signature as a cloud key
    /// service would.
    pub fn try_sign(key_id: &str, digest: &[u8]) -> Result<Vec<u8>> {
        if key_id != ISSUER_KEY_ID {
            bail!("key {key_id} not found");
        }
        let signature: Signature = signing_key(ISSUER_SECRET)?.sign_prehash(digest)?;
        Ok(signature.to_der().as_bytes().to_vec())
    }

    /// # Panics
    ///
    /// Panics if the hard-coded secret is invalid.
    #[must_use]
    pub fn verifying_key() -> VerifyingKey {
        VerifyingKey::from(&signing_key(ISSUER_SECRET).expect("valid issuer key"))
    }
}

/// The wallet's device key.
#[derive(Default, Clone, Debug)]
pub struct HolderKeystore;

impl HolderKeystore {
    /// # Panics
    ///
    /// Panics if the hard-coded secret is invalid.
    #[must_use]
    pub fn public_key() -> PublicKey {
        PublicKey::from(signing_key(HOLDER_SECRET).expect("valid holder key").verifying_key())
    }

    #[must_use]
    pub fn ec_public_key() -> EcPublicKey {
        EcPublicKey::from(&Self::public_key())
    }

    /// The device key as sent by a wallet.
    #[must_use]
    pub fn jwk() -> PublicKeyJwk {
        let point = Self::public_key().to_encoded_point(false);
        let encode = |c: Option<&p256::FieldBytes>| c.map(|c| Base64UrlUnpadded::encode_string(c));
        PublicKeyJwk {
            kty: "EC".to_string(),
            crv: Curve::P256.name().to_string(),
            x: encode(point.x()).unwrap_or_default(),
            y: encode(point.y()),
        }
    }
}
