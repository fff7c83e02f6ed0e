use anyhow::{Context, Result};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::signature::{SignatureEncoding, Signer as _, Verifier as _};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use super::Signer;

const RSA_KEY_BITS: usize = 2048;

/// An RSA private/public key pair, generated together and owned by one
/// signer for its lifetime.
pub struct RsaKeyPair {
    pub private: RsaPrivateKey,
    pub public: RsaPublicKey,
}

impl RsaKeyPair {
    /// Generates a fresh 2048-bit pair from the thread-local CSPRNG.
    pub fn generate() -> Result<Self> {
        let mut rng = rand::thread_rng();
        let private =
            RsaPrivateKey::new(&mut rng, RSA_KEY_BITS).context("generating RSA key")?;
        let public = private.to_public_key();
        Ok(Self { private, public })
    }

    /// Encodes the pair as two PEM blocks: `(public, private)`.
    ///
    /// Off the signing hot path; only needed once key persistence exists.
    pub fn to_pem(&self) -> Result<(String, String)> {
        let public = self
            .public
            .to_public_key_pem(LineEnding::LF)
            .context("encoding RSA public key")?;
        let private = self
            .private
            .to_pkcs8_pem(LineEnding::LF)
            .context("encoding RSA private key")?;
        Ok((public, private.to_string()))
    }

    /// Rebuilds the pair from a private-key PEM block, re-deriving the
    /// public key.
    pub fn from_private_pem(pem: &str) -> Result<Self> {
        let private = RsaPrivateKey::from_pkcs8_pem(pem).context("decoding RSA private key")?;
        let public = private.to_public_key();
        Ok(Self { private, public })
    }
}

/// RSA PKCS#1 v1.5 signer with SHA-256 digest.
pub struct RsaSigner {
    key_pair: RsaKeyPair,
    signing_key: SigningKey<Sha256>,
    verifying_key: VerifyingKey<Sha256>,
}

impl RsaSigner {
    pub fn generate() -> Result<Self> {
        Ok(Self::from_key_pair(RsaKeyPair::generate()?))
    }

    pub fn from_key_pair(key_pair: RsaKeyPair) -> Self {
        let signing_key = SigningKey::<Sha256>::new(key_pair.private.clone());
        let verifying_key = VerifyingKey::<Sha256>::new(key_pair.public.clone());
        Self {
            key_pair,
            signing_key,
            verifying_key,
        }
    }

    pub fn key_pair(&self) -> &RsaKeyPair {
        &self.key_pair
    }
}

impl Signer for RsaSigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        // SigningKey<Sha256> digests the data before padding.
        let signature = self
            .signing_key
            .try_sign(data)
            .map_err(|e| anyhow::anyhow!("RSA signing failed: {e}"))?;
        Ok(signature.to_vec())
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = Signature::try_from(signature) else {
            return false;
        };
        self.verifying_key.verify(data, &signature).is_ok()
    }
}
