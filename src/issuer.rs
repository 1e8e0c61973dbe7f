//! # Credential Issuance
//!
//! Assembles a signed mdoc credential from a document:
//!
//! 1. build salted, numbered items for each namespace
//! 2. digest the items into a Mobile Security Object bound to the holder's key
//! 3. sign the MSO as a `COSE_Sign1` with the document-signing key
//! 4. encode `IssuerSigned` as CBOR, then base64url without padding

use base64ct::{Base64UrlUnpadded, Encoding};
use tracing::instrument;

use crate::cbor::{self, Tag24};
use crate::config::IssuerConfig;
use crate::cose::{CoseSigner, EcPublicKey};
use crate::error::{Error, Result};
use crate::mdoc::IssuerSigned;
use crate::mso::{DigestIdGenerator, MsoFactory, StatusListInfo};
use crate::provider::Provider;
use crate::schema::{MdocDocument, NamespaceBuilder};

/// Builds mdoc credentials using the issuer's provider and configuration.
#[derive(Debug)]
pub struct MdocBuilder<'a, P: Provider> {
    provider: &'a P,
    config: &'a IssuerConfig,
}

impl<'a, P: Provider> MdocBuilder<'a, P> {
    /// Create a builder.
    pub const fn new(provider: &'a P, config: &'a IssuerConfig) -> Self {
        Self { provider, config }
    }

    /// Issue `document` to the holder of `device_key`, returning the
    /// base64url (unpadded) encoded `IssuerSigned` structure.
    ///
    /// The credential is valid for `ttl_minutes`, or for the configured
    /// lifetime when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaAccess`], [`Error::UnsupportedCurve`],
    /// [`Error::Encoding`], [`Error::Signing`] or [`Error::Certificate`]
    /// according to the stage that failed. No partial credential is returned.
    #[instrument(level = "debug", skip(self, document, device_key))]
    pub async fn build_credential<D: MdocDocument + Sync>(
        &self, document: &D, device_key: &EcPublicKey, status: &StatusListInfo,
        ttl_minutes: Option<u64>,
    ) -> Result<String> {
        tracing::debug!("MdocBuilder::build_credential");

        let issuer_signed = self.issuer_signed(document, device_key, status, ttl_minutes).await?;
        let bytes = issuer_signed.to_vec()?;
        Ok(Base64UrlUnpadded::encode_string(&bytes))
    }

    /// Build the signed `IssuerSigned` structure for `document`.
    ///
    /// # Errors
    ///
    /// As for [`Self::build_credential`].
    pub async fn issuer_signed<D: MdocDocument + Sync>(
        &self, document: &D, device_key: &EcPublicKey, status: &StatusListInfo,
        ttl_minutes: Option<u64>,
    ) -> Result<IssuerSigned> {
        // one digest ID sequence per credential
        let mut id_gen = DigestIdGenerator::new(self.provider);
        let name_spaces = NamespaceBuilder::new(&mut id_gen, self.provider).build(document)?;
        tracing::debug!("built {} namespaces", name_spaces.len());

        let ttl = ttl_minutes.unwrap_or(self.config.credential_ttl_minutes);
        let mso = MsoFactory::new(self.provider).build(
            &name_spaces,
            device_key,
            status,
            document.doc_type(),
            ttl,
        )?;
        let payload = cbor::to_vec(&Tag24(mso))?;

        let key_id = self.config.key_id()?;
        let certificate = self
            .provider
            .signing_certificate(&key_id)
            .await
            .map_err(|e| {
                tracing::warn!("no signing certificate for key {key_id}: {e}");
                Error::Certificate(e.to_string())
            })?;
        let signer = CoseSigner::new(self.provider, &key_id);
        let issuer_auth = signer.sign(payload, &certificate).await?;
        tracing::debug!("signed MSO with key {key_id}");

        Ok(IssuerSigned {
            name_spaces,
            issuer_auth,
        })
    }
}
