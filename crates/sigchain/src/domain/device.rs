use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::crypto::{SignatureAlgorithm, Signer};

/// One signing identity: a keypair-bound signer plus the chain state
/// linking every signature to its predecessor.
///
/// The chain state is the only mutable part. `signing_guard` serializes
/// the whole read-sign-write span in the signing path; the `RwLock` on
/// the state itself only keeps readers from observing a torn pair.
pub struct SignatureDevice {
    id: String,
    algorithm: SignatureAlgorithm,
    label: String,
    signer: Box<dyn Signer>,
    chain: RwLock<ChainState>,
    signing_guard: Mutex<()>,
}

impl std::fmt::Debug for SignatureDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureDevice")
            .field("id", &self.id)
            .field("algorithm", &self.algorithm)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

struct ChainState {
    counter: u64,
    last_signature: String,
}

impl SignatureDevice {
    pub(crate) fn new(
        id: String,
        algorithm: SignatureAlgorithm,
        label: String,
        signer: Box<dyn Signer>,
    ) -> Self {
        // Seed value: the first payload needs a defined predecessor.
        let last_signature = BASE64.encode(id.as_bytes());
        Self {
            id,
            algorithm,
            label,
            signer,
            chain: RwLock::new(ChainState {
                counter: 0,
                last_signature,
            }),
            signing_guard: Mutex::new(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of completed sign calls for this device.
    pub fn signature_counter(&self) -> u64 {
        self.chain
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .counter
    }

    /// The most recent signature, base64-encoded, or the base64(id) seed
    /// if nothing has been signed yet.
    pub fn last_signature(&self) -> String {
        self.chain
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_signature
            .clone()
    }

    /// Current `(counter, last_signature)` as one consistent pair.
    pub fn signing_meta(&self) -> (u64, String) {
        let chain = self.chain.read().unwrap_or_else(PoisonError::into_inner);
        (chain.counter, chain.last_signature.clone())
    }

    /// Checks a raw signature against this device's public key.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        self.signer.verify(data, signature)
    }

    pub(crate) fn set_signing_meta(&self, counter: u64, last_signature: String) {
        let mut chain = self.chain.write().unwrap_or_else(PoisonError::into_inner);
        chain.counter = counter;
        chain.last_signature = last_signature;
    }

    /// Blocks until this device's exclusive signing guard is free. Calls
    /// for different devices never contend here.
    pub(crate) fn lock_for_signing(&self) -> MutexGuard<'_, ()> {
        self.signing_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn signer(&self) -> &dyn Signer {
        self.signer.as_ref()
    }
}
