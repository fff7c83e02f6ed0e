use anyhow::{Context, Result};
use p256::ecdsa::signature::{Signer as _, Verifier as _};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use p256::{PublicKey, SecretKey};

use super::Signer;

/// A NIST P-256 private/public key pair, generated together and owned by
/// one signer for its lifetime.
pub struct EccKeyPair {
    pub private: SecretKey,
    pub public: PublicKey,
}

impl EccKeyPair {
    /// Generates a fresh pair from the thread-local CSPRNG.
    pub fn generate() -> Result<Self> {
        let private = SecretKey::random(&mut rand::thread_rng());
        let public = private.public_key();
        Ok(Self { private, public })
    }

    /// Encodes the pair as two PEM blocks: `(public, private)`.
    pub fn to_pem(&self) -> Result<(String, String)> {
        let public = self
            .public
            .to_public_key_pem(LineEnding::LF)
            .context("encoding P-256 public key")?;
        let private = self
            .private
            .to_pkcs8_pem(LineEnding::LF)
            .context("encoding P-256 private key")?;
        Ok((public, private.to_string()))
    }

    /// Rebuilds the pair from a private-key PEM block, re-deriving the
    /// public key.
    pub fn from_private_pem(pem: &str) -> Result<Self> {
        let private = SecretKey::from_pkcs8_pem(pem).context("decoding P-256 private key")?;
        let public = private.public_key();
        Ok(Self { private, public })
    }
}

/// ECDSA P-256 signer with SHA-256 digest and ASN.1 DER-encoded (r,s)
/// signatures.
pub struct EccSigner {
    key_pair: EccKeyPair,
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl EccSigner {
    pub fn generate() -> Result<Self> {
        Ok(Self::from_key_pair(EccKeyPair::generate()?))
    }

    pub fn from_key_pair(key_pair: EccKeyPair) -> Self {
        let signing_key = SigningKey::from(&key_pair.private);
        let verifying_key = VerifyingKey::from(&key_pair.public);
        Self {
            key_pair,
            signing_key,
            verifying_key,
        }
    }

    pub fn key_pair(&self) -> &EccKeyPair {
        &self.key_pair
    }
}

impl Signer for EccSigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let signature: Signature = self
            .signing_key
            .try_sign(data)
            .map_err(|e| anyhow::anyhow!("ECDSA signing failed: {e}"))?;
        Ok(signature.to_der().as_bytes().to_vec())
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = Signature::from_der(signature) else {
            return false;
        };
        self.verifying_key.verify(data, &signature).is_ok()
    }
}
