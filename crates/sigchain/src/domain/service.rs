use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use tracing::debug;

use super::device::SignatureDevice;
use crate::crypto::{self, SignatureAlgorithm};
use crate::error::Error;

/// Storage contract for signature devices.
///
/// Implementations must be safe for concurrent use. `create` must check
/// and insert atomically so two racing creates of the same id cannot
/// both succeed, and operations on different ids must not block each
/// other behind a single global lock.
pub trait SignatureDeviceRepository: Send + Sync {
    fn create(&self, device: SignatureDevice) -> Result<Arc<SignatureDevice>, Error>;
    fn get_all(&self) -> Result<Vec<Arc<SignatureDevice>>, Error>;
    fn get_by_id(&self, id: &str) -> Result<Arc<SignatureDevice>, Error>;
    fn update_signing_meta_info(
        &self,
        id: &str,
        counter: u64,
        last_signature: String,
    ) -> Result<Arc<SignatureDevice>, Error>;
}

/// Result of one sign call. The device's chain state is the durable
/// record; this value is returned once and never stored.
#[derive(Debug, Clone, Serialize)]
pub struct Signature {
    pub signature: String,
    pub signed_data: String,
}

/// Orchestrates device creation and chained signing on top of a
/// repository and the algorithm strategies.
pub struct SignatureDeviceService {
    repo: Arc<dyn SignatureDeviceRepository>,
}

impl SignatureDeviceService {
    pub fn new(repo: Arc<dyn SignatureDeviceRepository>) -> Self {
        Self { repo }
    }

    /// Creates a device bound to a freshly generated keypair, with its
    /// chain seeded at counter 0 and `last_signature = base64(id)`.
    pub fn create(
        &self,
        id: String,
        algorithm: SignatureAlgorithm,
        label: String,
    ) -> Result<Arc<SignatureDevice>, Error> {
        if id.is_empty() {
            return Err(Error::BadInput("id must be specified".into()));
        }

        let signer = crypto::create_signer(algorithm)?;
        let device = SignatureDevice::new(id, algorithm, label, signer);
        self.repo.create(device)
    }

    pub fn get_all(&self) -> Result<Vec<Arc<SignatureDevice>>, Error> {
        self.repo.get_all()
    }

    pub fn get_by_id(&self, id: &str) -> Result<Arc<SignatureDevice>, Error> {
        if id.is_empty() {
            return Err(Error::BadInput("id must be specified".into()));
        }

        self.repo.get_by_id(id)
    }

    /// Signs `data` as the next link in the device's chain.
    ///
    /// The payload `"{counter}_{data}_{last_signature}"` commits to the
    /// device's entire signing history: payload n embeds signature n-1,
    /// which embeds payload n-1, down to the base64(id) seed. The
    /// device guard is held across the full read-sign-update span, so
    /// counters never skip or repeat and a signing failure leaves the
    /// chain untouched.
    pub fn sign(&self, device_id: &str, data: &str) -> Result<Signature, Error> {
        let device = self.get_by_id(device_id)?;

        let _guard = device.lock_for_signing();

        let (counter, last_signature) = device.signing_meta();
        let signed_data = format!("{counter}_{data}_{last_signature}");
        debug!(device_id, payload = %signed_data, "signing chained payload");

        let raw = device.signer().sign(signed_data.as_bytes())?;
        let signature = BASE64.encode(raw);

        self.repo
            .update_signing_meta_info(device_id, counter + 1, signature.clone())?;

        Ok(Signature {
            signature,
            signed_data,
        })
    }
}
