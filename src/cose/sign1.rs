//! # `COSE_Sign1`
//!
//! Signs the MSO with the document-signing key. The key service signs a
//! SHA-256 digest of the `Sig_structure` and returns an ASN.1/DER signature,
//! which is transcoded to the fixed-length `r || s` form COSE requires.

use ciborium::Value;
use coset::{iana, CoseSign1, CoseSign1Builder, HeaderBuilder};
use der::asn1::IntRef;
use der::{Decode, Sequence};
use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::cose::fixed::to_fixed_bytes;
use crate::cose::Certificate;
use crate::error::{Error, Result};
use crate::provider::KeyProvider;

/// Header label for an X.509 certificate chain (RFC 9360).
pub const X5CHAIN: i64 = 33;

/// ES256 signature component size.
const ES256_BITS: usize = 256;

/// `Ecdsa-Sig-Value ::= SEQUENCE { r INTEGER, s INTEGER }`
#[derive(Sequence)]
struct EcdsaSigValue<'a> {
    r: IntRef<'a>,
    s: IntRef<'a>,
}

/// Produces ES256 `COSE_Sign1` structures using a [`KeyProvider`].
#[derive(Debug)]
pub struct CoseSigner<'a, K: KeyProvider + ?Sized> {
    keys: &'a K,
    key_id: &'a str,
}

impl<'a, K: KeyProvider + ?Sized> CoseSigner<'a, K> {
    /// Sign with the key identified by `key_id`.
    pub const fn new(keys: &'a K, key_id: &'a str) -> Self {
        Self { keys, key_id }
    }

    /// Sign `payload`, attaching `certificate` in the unprotected `x5chain`
    /// header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signing`] if the key service fails or its signature
    /// cannot be transcoded.
    #[instrument(level = "debug", skip_all, fields(key_id = self.key_id))]
    pub async fn sign(&self, payload: Vec<u8>, certificate: &Certificate) -> Result<CoseSign1> {
        tracing::debug!("CoseSigner::sign");

        let protected = HeaderBuilder::new().algorithm(iana::Algorithm::ES256).build();
        let unprotected =
            HeaderBuilder::new().value(X5CHAIN, Value::Bytes(certificate.der().to_vec())).build();
        let mut sign1 = CoseSign1Builder::new()
            .protected(protected)
            .unprotected(unprotected)
            .payload(payload)
            .build();

        // ["Signature1", protected, h'', payload]
        let digest = Sha256::digest(sign1.tbs_data(b""));
        let der = self
            .keys
            .sign(self.key_id, &digest)
            .await
            .map_err(|e| {
                tracing::warn!("key service failed to sign: {e}");
                Error::Signing(format!("key service: {e}"))
            })?;
        sign1.signature = der_to_p1363(&der).inspect_err(|e| {
            tracing::warn!("unusable signature from key service: {e}");
        })?;

        Ok(sign1)
    }
}

/// Transcode an ASN.1/DER ECDSA P-256 signature to 64-byte `r || s`.
///
/// # Errors
///
/// Returns [`Error::Signing`] if `der` is not an `Ecdsa-Sig-Value`, or either
/// component is negative or wider than 32 bytes.
pub fn der_to_p1363(der: &[u8]) -> Result<Vec<u8>> {
    let sig =
        EcdsaSigValue::from_der(der).map_err(|e| Error::Signing(format!("invalid DER: {e}")))?;

    let mut p1363 = Vec::with_capacity(2 * ES256_BITS / 8);
    for (name, int) in [("r", sig.r), ("s", sig.s)] {
        let bytes = int.as_bytes();
        if bytes.first().is_some_and(|b| b & 0x80 != 0) {
            return Err(Error::Signing(format!("{name} is negative")));
        }
        let width = ES256_BITS / 8;
        if bytes.len() > width && bytes[..bytes.len() - width].iter().any(|b| *b != 0) {
            return Err(Error::Signing(format!("{name} is wider than {width} bytes")));
        }
        p1363.extend(to_fixed_bytes(bytes, ES256_BITS));
    }

    Ok(p1363)
}
