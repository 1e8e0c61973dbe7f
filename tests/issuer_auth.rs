//! Tests for the issuer's `COSE_Sign1` signature and failure handling.

use ciborium::Value;
use coset::iana;
use coset::Label;
use mdoc_issuer::cose::{Certificate, Curve, EcPublicKey, X5CHAIN};
use mdoc_issuer::{cbor, Error, IssuerConfig, MdocBuilder};
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::Signature;
use test_utils::issuer::Provider;
use test_utils::keystore::{
    HolderKeystore, IssuerKeystore, DOCUMENT_SIGNER_PEM, ISSUER_KEY_ARN, ISSUER_KEY_ID,
};
use test_utils::sample;

// The signature verifies with the document-signing key over the
// Sig_structure of the decoded credential.
#[tokio::test]
async fn signature_verifies() {
    test_utils::init_tracer();

    let provider = Provider::new();
    let config = IssuerConfig::new(ISSUER_KEY_ARN);
    let credential = MdocBuilder::new(&provider, &config)
        .build_credential(
            &sample::driving_licence(),
            &HolderKeystore::ec_public_key(),
            &sample::status_list(),
            None,
        )
        .await
        .expect("should issue");

    let issuer_signed = mdoc_issuer::decode_credential(&credential).expect("should decode");
    let issuer_auth = &issuer_signed.issuer_auth;

    // ["Signature1", protected, h'', payload]
    let tbs = issuer_auth.tbs_data(b"");
    let signature = Signature::from_slice(&issuer_auth.signature).expect("64 byte r || s");
    IssuerKeystore::verifying_key().verify(&tbs, &signature).expect("signature should verify");

    // tampering with the payload breaks the signature
    let mut tampered = issuer_auth.clone();
    if let Some(payload) = tampered.payload.as_mut() {
        let last = payload.len() - 1;
        payload[last] ^= 0x01;
    }
    assert!(IssuerKeystore::verifying_key().verify(&tampered.tbs_data(b""), &signature).is_err());
}

// Protected header is exactly {1: -7}; the unprotected header carries the
// certificate under label 33; the payload is the tag-24 wrapped MSO.
#[tokio::test]
async fn headers_and_payload() {
    let provider = Provider::new();
    let config = IssuerConfig::new(ISSUER_KEY_ARN);
    let issuer_signed = MdocBuilder::new(&provider, &config)
        .issuer_signed(
            &sample::example_document(),
            &HolderKeystore::ec_public_key(),
            &sample::status_list(),
            None,
        )
        .await
        .expect("should issue");

    let bytes = issuer_signed.to_vec().unwrap();
    let decoded = mdoc_issuer::IssuerSigned::from_slice(&bytes).unwrap();
    let issuer_auth = decoded.issuer_auth;

    assert_eq!(issuer_auth.protected.original_data, Some(vec![0xa1, 0x01, 0x26]));
    assert_eq!(
        issuer_auth.protected.header.alg,
        Some(coset::RegisteredLabelWithPrivate::Assigned(iana::Algorithm::ES256))
    );

    let certificate = Certificate::from_pem(DOCUMENT_SIGNER_PEM).unwrap();
    let x5chain = issuer_auth
        .unprotected
        .rest
        .iter()
        .find(|(label, _)| *label == Label::Int(X5CHAIN))
        .map(|(_, value)| value.clone());
    assert_eq!(x5chain, Some(Value::Bytes(certificate.der().to_vec())));

    let payload = issuer_auth.payload.expect("payload should be attached");
    assert_eq!(&payload[..2], &[0xd8, 0x18]);
    let Value::Tag(24, inner) = cbor::from_slice::<Value>(&payload).unwrap() else {
        panic!("payload should be tag 24");
    };
    assert!(matches!(*inner, Value::Bytes(_)));
}

#[tokio::test]
async fn key_service_failure() {
    let provider = Provider::new().key_service_offline();
    let config = IssuerConfig::new(ISSUER_KEY_ARN);

    let err = MdocBuilder::new(&provider, &config)
        .build_credential(
            &sample::driving_licence(),
            &HolderKeystore::ec_public_key(),
            &sample::status_list(),
            None,
        )
        .await
        .expect_err("should fail");
    assert!(matches!(err, Error::Signing(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn unknown_certificate() {
    let provider = Provider::new();
    let config = IssuerConfig::new("arn:aws:kms:eu-west-2:123456789012:key/unknown");

    let err = MdocBuilder::new(&provider, &config)
        .build_credential(
            &sample::driving_licence(),
            &HolderKeystore::ec_public_key(),
            &sample::status_list(),
            None,
        )
        .await
        .expect_err("should fail");
    assert!(matches!(err, Error::Certificate(_)), "unexpected error: {err}");
    assert_ne!(config.key_id().unwrap(), ISSUER_KEY_ID);
}

#[tokio::test]
async fn non_p256_device_key() {
    let provider = Provider::new();
    let config = IssuerConfig::new(ISSUER_KEY_ARN);

    // P-384 public point
    let point = hex::decode(concat!(
        "0440d64fbd83daa04e4c6c7caacfbec1480d7315ed0722a42bfb8bdb3229d429b7",
        "2445a4811583b8986cc52530c113fba204a5c4310062c124f42e6b882f04d3e798",
        "03a93cc9f610a318fabf25870d57882a05bdcd69e2dc783d8215650112a1f6",
    ))
    .unwrap();
    let device_key = EcPublicKey::new(Curve::P384, point[1..49].to_vec(), point[49..].to_vec());

    let err = MdocBuilder::new(&provider, &config)
        .build_credential(&sample::driving_licence(), &device_key, &sample::status_list(), None)
        .await
        .expect_err("should fail");
    assert!(matches!(err, Error::UnsupportedCurve(_)), "unexpected error: {err}");
}
