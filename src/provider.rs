//! # Issuer Provider
//!
//! Traits implemented by the host application to give the library access to
//! the document-signing key, its certificate, a clock and a source of
//! randomness.

use std::future::Future;

pub use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::RngCore;

pub use crate::cose::Certificate;

/// Issuer Provider trait.
pub trait Provider: KeyProvider + CertificateProvider + Clock + RandomSource {}

/// The `KeyProvider` trait is used to sign digests with the document-signing
/// key. Private key material never leaves the implementer.
pub trait KeyProvider: Send + Sync {
    /// Sign a SHA-256 `digest` with the ECDSA P-256 key identified by
    /// `key_id`, returning the ASN.1/DER encoded signature.
    fn sign(&self, key_id: &str, digest: &[u8]) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// The `CertificateProvider` trait returns the X.509 certificate for the
/// document-signing key.
pub trait CertificateProvider: Send + Sync {
    /// Certificate for the key identified by `key_id`.
    fn signing_certificate(
        &self, key_id: &str,
    ) -> impl Future<Output = Result<Certificate>> + Send;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Source of random bytes for salts and digest ID seeding.
pub trait RandomSource: Send + Sync {
    /// Return `len` random bytes.
    fn bytes(&self, len: usize) -> Vec<u8>;
}

/// [`Clock`] backed by the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// [`RandomSource`] backed by the operating system's CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn bytes(&self, len: usize) -> Vec<u8> {
        let mut buf = vec![0; len];
        rand::rngs::OsRng.fill_bytes(&mut buf);
        buf
    }
}
