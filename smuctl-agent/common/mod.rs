pub mod affinity;
pub mod arch;
pub mod cpuid;
pub mod pci;

pub use affinity::AffinityGuard;
pub use arch::{CpuFamilyVariant, CpuIdentity};
