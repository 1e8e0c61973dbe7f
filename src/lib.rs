//! # mdoc Issuer
//!
//! Issuance of ISO/IEC 18013-5 mobile documents (mdocs), such as the mobile
//! driving licence.
//!
//! A document's data elements are salted, numbered and wrapped as
//! `IssuerSignedItem`s. Their digests are collected into a Mobile Security
//! Object (MSO) bound to the holder's device key, and the MSO is signed as a
//! `COSE_Sign1` using a document-signing key held by an external key service.
//! The resulting `IssuerSigned` structure is returned as base64url encoded
//! CBOR.
//!
//! Host applications implement the [`provider`] traits to supply the key
//! service, the signing certificate, a clock and randomness.

pub mod cbor;
pub mod config;
pub mod cose;
pub mod documents;
pub mod error;
pub mod issuer;
pub mod mdoc;
pub mod mso;
pub mod provider;
pub mod schema;

pub use crate::config::IssuerConfig;
pub use crate::error::{Error, Result};
pub use crate::issuer::MdocBuilder;
pub use crate::mdoc::{decode_credential, IssuerSigned};
