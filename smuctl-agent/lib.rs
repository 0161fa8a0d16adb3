// Macros (must be first for visibility)
#[macro_use]
pub mod macros;

pub mod capability;
pub mod common;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod prom;
pub mod smu;
pub mod tuning;

#[cfg(test)]
pub mod testing;

pub use capability::{CpuidAccess, HardwareAccess, LinuxPlatform, MsrAccess, PciConfigAccess};
pub use common::arch::{detect, identify, CpuFamilyVariant, CpuIdentity};
pub use config::{PlatformConfig, TransportConfig};
pub use error::{Result, SmuctlError};
pub use orchestrator::{CollectorConfig, SmuCollector};
pub use prom::SmuMetricExporter;
pub use smu::{DynSmuClient, RegisterMapCatalog, SmuClient, SmuTransport, SmuVersion};
