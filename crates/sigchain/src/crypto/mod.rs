mod ecc;
mod rsa;

pub use ecc::{EccKeyPair, EccSigner};
pub use self::rsa::{RsaKeyPair, RsaSigner};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Trait for producing and checking signatures over chained device payloads.
///
/// Implementations are sync — signing is CPU-bound.
/// Callers on an async runtime should use `spawn_blocking`.
pub trait Signer: Send + Sync {
    /// Sign the SHA-256 digest of `data`. Returns raw signature bytes.
    fn sign(&self, data: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Check `signature` against the SHA-256 digest of `data` using the
    /// bound public key. A malformed signature is `false`, not an error.
    fn verify(&self, data: &[u8], signature: &[u8]) -> bool;
}

/// The closed set of algorithm families a device can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    #[serde(rename = "RSA")]
    Rsa,
    #[serde(rename = "ECC")]
    Ecc,
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa => f.write_str("RSA"),
            Self::Ecc => f.write_str("ECC"),
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RSA" => Ok(Self::Rsa),
            "ECC" => Ok(Self::Ecc),
            other => Err(Error::BadInput(format!("algorithm not supported: {other}"))),
        }
    }
}

/// Builds a signer bound to a freshly generated keypair.
///
/// Key generation draws from the thread-local CSPRNG; a generation
/// failure surfaces as an internal error.
pub fn create_signer(algorithm: SignatureAlgorithm) -> Result<Box<dyn Signer>, Error> {
    match algorithm {
        SignatureAlgorithm::Rsa => Ok(Box::new(RsaSigner::generate()?)),
        SignatureAlgorithm::Ecc => Ok(Box::new(EccSigner::generate()?)),
    }
}
