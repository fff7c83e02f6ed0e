mod device;
mod service;

pub use device::SignatureDevice;
pub use service::{Signature, SignatureDeviceRepository, SignatureDeviceService};
