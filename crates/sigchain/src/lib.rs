pub mod crypto;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod server;

pub use crypto::{SignatureAlgorithm, Signer, create_signer};
pub use domain::{Signature, SignatureDevice, SignatureDeviceRepository, SignatureDeviceService};
pub use error::Error;
pub use persistence::InMemoryDeviceRepository;
pub use server::{AppState, router, run};
