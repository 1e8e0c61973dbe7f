use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use mdoc_issuer::provider::{
    Certificate, CertificateProvider, Clock, KeyProvider, RandomSource,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::keystore::{IssuerKeystore, DOCUMENT_SIGNER_PEM, ISSUER_KEY_ID};

#[derive(Clone, Debug)]
pub struct Provider {
    now: Option<DateTime<Utc>>,
    rng: Arc<Mutex<StdRng>>,
    key_service_offline: bool,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: None,
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
            key_service_offline: false,
        }
    }

    /// A provider with a fixed clock and seeded randomness, so that two
    /// providers created with the same arguments produce identical
    /// credentials.
    #[must_use]
    pub fn deterministic(now: DateTime<Utc>, seed: u64) -> Self {
        Self {
            now: Some(now),
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
            key_service_offline: false,
        }
    }

    /// Simulate the key service being unavailable.
    #[must_use]
    pub const fn key_service_offline(mut self) -> Self {
        self.key_service_offline = true;
        self
    }
}

impl mdoc_issuer::provider::Provider for Provider {}

impl KeyProvider for Provider {
    async fn sign(&self, key_id: &str, digest: &[u8]) -> Result<Vec<u8>> {
        if self.key_service_offline {
            bail!("key service unavailable");
        }
        IssuerKeystore::try_sign(key_id, digest)
    }
}

impl CertificateProvider for Provider {
    async fn signing_certificate(&self, key_id: &str) -> Result<Certificate> {
        if key_id != ISSUER_KEY_ID {
            bail!("no certificate for key {key_id}");
        }
        Ok(Certificate::from_pem(DOCUMENT_SIGNER_PEM)?)
    }
}

impl Clock for Provider {
    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

impl RandomSource for Provider {
    fn bytes(&self, len: usize) -> Vec<u8> {
        let mut buf = vec![0; len];
        self.rng.lock().expect("rng lock").fill_bytes(&mut buf);
        buf
    }
}
