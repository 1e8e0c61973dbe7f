//! # Issuer Configuration
//!
//! Deployment settings for the issuer. Loaded by the host application (usually
//! from JSON or environment) and handed to [`crate::issuer::MdocBuilder`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default credential lifetime: 30 days.
pub const DEFAULT_CREDENTIAL_TTL_MINUTES: u64 = 43_200;

/// Issuer settings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerConfig {
    /// Resource name of the document-signing key held by the key service,
    /// e.g. `arn:aws:kms:eu-west-2:123456789012:key/1234abcd-...`.
    pub document_signing_key_arn: String,

    /// Credential lifetime used when the caller does not supply one.
    #[serde(default = "default_ttl")]
    pub credential_ttl_minutes: u64,
}

const fn default_ttl() -> u64 {
    DEFAULT_CREDENTIAL_TTL_MINUTES
}

impl IssuerConfig {
    /// Create a configuration for the given signing key, using the default
    /// credential lifetime.
    #[must_use]
    pub fn new(document_signing_key_arn: impl Into<String>) -> Self {
        Self {
            document_signing_key_arn: document_signing_key_arn.into(),
            credential_ttl_minutes: DEFAULT_CREDENTIAL_TTL_MINUTES,
        }
    }

    /// The key identifier: everything after `key/` in the signing key's
    /// resource name. Used to look up both the key and its certificate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Certificate`] when the resource name has no `key/`
    /// segment or the identifier is empty.
    pub fn key_id(&self) -> Result<String> {
        let Some((_, key_id)) = self.document_signing_key_arn.split_once("key/") else {
            return Err(Error::Certificate(format!(
                "no key id in {}",
                self.document_signing_key_arn
            )));
        };
        if key_id.is_empty() {
            return Err(Error::Certificate("empty key id".to_string()));
        }
        Ok(key_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn key_id_from_arn() {
        let config = IssuerConfig::new("arn:aws:kms:eu-west-2:123456789012:key/1234abcd-12ab");
        assert_eq!(config.key_id().unwrap(), "1234abcd-12ab");
    }

    #[test]
    fn missing_key_segment() {
        let config = IssuerConfig::new("arn:aws:kms:eu-west-2:123456789012:alias/issuer");
        assert!(matches!(config.key_id(), Err(Error::Certificate(_))));

        let config = IssuerConfig::new("arn:aws:kms:eu-west-2:123456789012:key/");
        assert!(matches!(config.key_id(), Err(Error::Certificate(_))));
    }

    #[test]
    fn default_ttl_applied() {
        let config: IssuerConfig = serde_json::from_value(json!({
            "documentSigningKeyArn": "arn:aws:kms:eu-west-2:1:key/abc"
        }))
        .expect("should deserialize");
        assert_eq!(config.credential_ttl_minutes, 43_200);
    }
}
