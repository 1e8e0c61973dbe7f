//! # COSE
//!
//! `COSE_Key` and `COSE_Sign1` support for issuer authentication, as defined
//! in [RFC9052] and profiled by ISO/IEC 18013-5.
//!
//! [RFC9052]: https://www.rfc-editor.org/rfc/rfc9052.html

mod certificate;
mod fixed;
mod key;
mod sign1;

pub use self::certificate::Certificate;
pub use self::fixed::to_fixed_bytes;
pub use self::key::{CoseKey, Curve, EcPublicKey, PublicKeyJwk};
pub use self::sign1::{der_to_p1363, CoseSigner, X5CHAIN};
