// Adapters layer: concrete implementations of the domain ports (http provider, progress, storage).

pub mod progress;
pub mod storage;
pub mod stripe;
