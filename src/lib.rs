//! tlvseal: signed TLV envelopes for VoIP device security
//!
//! This crate builds, parses, verifies, and transforms the binary
//! container family that binds a payload to a certificate-bearing
//! authority's signature:
//!
//! - [`Sgn`] — a signed envelope around an opaque payload (firmware)
//! - [`TrustList`] — a signed envelope around role-tagged certificate
//!   records, distributed to devices to install root trust
//! - [`EncConfig`] — a signed envelope around an AES-encrypted device
//!   configuration, with a companion pointer envelope
//!
//! All three shapes share one TLV grammar ([`tlvseal_protocol`]) and
//! one signing rule: the signature is computed over the envelope as if
//! the signature element were absent, then spliced into a reserved
//! position, so removing it recovers the exact image that was signed.
//!
//! Operations are single-threaded, synchronous transforms over
//! in-memory buffers; file drivers at the edges implement the naming
//! conventions of the ecosystem (`.sgn`, `.tlv`, `.enc.sgn`).
//!
//! # Example
//!
//! ```no_run
//! use tlvseal::{HashAlgorithm, Sgn, SignerIdentity};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tftp = SignerIdentity::from_pem_file("tftp.pem")?;
//! let signed = Sgn::sign(b"firmware".to_vec())
//!     .hash(HashAlgorithm::Sha1)
//!     .to_bytes(&tftp)?;
//!
//! assert_eq!(Sgn::strip(&signed)?, b"firmware");
//! # Ok(())
//! # }
//! ```

mod config_xml;
mod enc;
mod error;
mod identity;
mod sgn;
mod trust_list;

pub mod prelude;

pub use config_xml::DeviceConfig;
pub use enc::{
    EncBuild, EncBuilder, EncConfig, decrypt_config_file, encrypt_config_file,
};
pub use error::SealError;
pub use identity::{SignerIdentity, load_certificate_file};
pub use sgn::{Sgn, SgnBuilder, SignatureVerdict, sign_file, strip_file, verify_file};
pub use trust_list::{TrustList, TrustListBuilder, TrustListReport};

// Re-export the wire-level types that appear in the public API.
pub use tlvseal_protocol::{HashAlgorithm, RecordView, Role, SignatureModulus, TlvError};

pub use tlvseal_crypto::{Certificate, CryptoError, RsaPrivateKey, RsaPublicKey};
