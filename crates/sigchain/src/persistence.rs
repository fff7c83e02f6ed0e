use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::{SignatureDevice, SignatureDeviceRepository};
use crate::error::Error;

/// In-memory device store over a sharded concurrent map. Operations on
/// different ids only contend on shard locks, never on a global one.
#[derive(Default)]
pub struct InMemoryDeviceRepository {
    devices: DashMap<String, Arc<SignatureDevice>>,
}

impl InMemoryDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SignatureDeviceRepository for InMemoryDeviceRepository {
    fn create(&self, device: SignatureDevice) -> Result<Arc<SignatureDevice>, Error> {
        // The entry holds the shard lock, so check-then-insert is atomic.
        match self.devices.entry(device.id().to_owned()) {
            Entry::Occupied(_) => Err(Error::Conflict(device.id().to_owned())),
            Entry::Vacant(entry) => {
                let device = Arc::new(device);
                entry.insert(Arc::clone(&device));
                Ok(device)
            }
        }
    }

    fn get_all(&self) -> Result<Vec<Arc<SignatureDevice>>, Error> {
        Ok(self
            .devices
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect())
    }

    fn get_by_id(&self, id: &str) -> Result<Arc<SignatureDevice>, Error> {
        self.devices
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::NotFound(id.to_owned()))
    }

    fn update_signing_meta_info(
        &self,
        id: &str,
        counter: u64,
        last_signature: String,
    ) -> Result<Arc<SignatureDevice>, Error> {
        let device = self.get_by_id(id)?;
        device.set_signing_meta(counter, last_signature);
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{SignatureAlgorithm, create_signer};

    fn device(id: &str) -> SignatureDevice {
        SignatureDevice::new(
            id.to_owned(),
            SignatureAlgorithm::Ecc,
            String::new(),
            create_signer(SignatureAlgorithm::Ecc).unwrap(),
        )
    }

    #[test]
    fn create_then_get_by_id() {
        let repo = InMemoryDeviceRepository::new();
        repo.create(device("device-1")).unwrap();

        let found = repo.get_by_id("device-1").unwrap();
        assert_eq!(found.id(), "device-1");
    }

    #[test]
    fn duplicate_create_is_conflict() {
        let repo = InMemoryDeviceRepository::new();
        repo.create(device("device-1")).unwrap();

        let err = repo.create(device("device-1")).unwrap_err();
        assert!(matches!(err, Error::Conflict(id) if id == "device-1"));
    }

    #[test]
    fn get_by_id_unknown_is_not_found() {
        let repo = InMemoryDeviceRepository::new();
        let err = repo.get_by_id("ghost").unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == "ghost"));
    }

    #[test]
    fn get_all_returns_every_device() {
        let repo = InMemoryDeviceRepository::new();
        assert!(repo.get_all().unwrap().is_empty());

        repo.create(device("a")).unwrap();
        repo.create(device("b")).unwrap();

        let mut ids: Vec<_> = repo
            .get_all()
            .unwrap()
            .iter()
            .map(|d| d.id().to_owned())
            .collect();
        ids.sort();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn update_overwrites_chain_fields() {
        let repo = InMemoryDeviceRepository::new();
        repo.create(device("device-1")).unwrap();

        let updated = repo
            .update_signing_meta_info("device-1", 5, "c2ln".to_owned())
            .unwrap();
        assert_eq!(updated.signature_counter(), 5);
        assert_eq!(updated.last_signature(), "c2ln");
    }

    #[test]
    fn update_unknown_is_not_found() {
        let repo = InMemoryDeviceRepository::new();
        let err = repo
            .update_signing_meta_info("ghost", 1, String::new())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
