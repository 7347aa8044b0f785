//! Persisted activation: the file store and the service that writes and checks it.

mod activator;
mod store;

pub use activator::{ActivationOutcome, Activator};
pub use store::ActivationStore;
