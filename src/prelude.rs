//! tlvseal Prelude
//!
//! A convenient way to import the commonly used types.
//!
//! # Example
//!
//! ```no_run
//! use tlvseal::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let identity = SignerIdentity::from_pem_file("sast.pem")?;
//! let list = TrustList::build()
//!     .record(identity.certificate().clone(), Role::SigningAuthority)
//!     .hash(HashAlgorithm::Sha512)
//!     .to_bytes(&identity)?;
//! let report = TrustList::parse(&list)?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub use crate::{
    EncBuild, EncConfig, SealError, Sgn, SignatureVerdict, SignerIdentity, TrustList,
    TrustListReport, load_certificate_file,
};

// Wire-level types
pub use tlvseal_protocol::{HashAlgorithm, RecordView, Role, SignatureModulus};
