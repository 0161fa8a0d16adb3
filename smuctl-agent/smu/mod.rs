pub mod catalog;
pub mod client;
pub mod status;
pub mod transport;

pub use catalog::RegisterMapCatalog;
pub use client::{DynSmuClient, SmuClient, SmuVersion};
pub use transport::SmuTransport;
