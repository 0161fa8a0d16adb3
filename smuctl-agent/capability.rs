//! Privileged I/O capabilities consumed by the SMU transport and client
//!
//! The core never opens device files itself. Everything it needs from the
//! machine goes through these three traits, so the protocol can be driven
//! against [`LinuxPlatform`] in production and a scripted fake in tests.

use smuctl_raw::msr::split;
use smuctl_raw::PciDeviceAddress;

use crate::common::affinity::AffinityGuard;
use crate::common::{cpuid, pci};
use crate::config::PlatformConfig;
use crate::error::{Result, SmuctlError};

/// Output registers of one CPUID execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuidResult {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

impl From<(u32, u32, u32, u32)> for CpuidResult {
    fn from((eax, ebx, ecx, edx): (u32, u32, u32, u32)) -> Self {
        Self { eax, ebx, ecx, edx }
    }
}

/// Dword access to PCI configuration space
pub trait PciConfigAccess: Send + Sync {
    fn read_config(&self, device: PciDeviceAddress, offset: u32) -> Result<u32>;

    fn write_config(&self, device: PciDeviceAddress, offset: u32, value: u32) -> Result<()>;
}

pub trait CpuidAccess: Send + Sync {
    fn cpuid(&self, leaf: u32) -> Result<CpuidResult>;
}

pub trait MsrAccess: Send + Sync {
    /// Read an MSR on one logical processor, returned as (EAX, EDX)
    fn read_msr_on(&self, cpu: u32, register: u32) -> Result<(u32, u32)>;
}

/// Everything the SMU client needs from the machine
pub trait HardwareAccess: PciConfigAccess + CpuidAccess + MsrAccess {}

impl<T: PciConfigAccess + CpuidAccess + MsrAccess> HardwareAccess for T {}

/// Capabilities backed by `/proc/bus/pci`, `/dev/cpu/*/msr` and the CPUID instruction
#[derive(Debug, Clone, Default)]
pub struct LinuxPlatform {
    config: PlatformConfig,
}

impl LinuxPlatform {
    pub fn new(config: PlatformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

impl PciConfigAccess for LinuxPlatform {
    fn read_config(&self, device: PciDeviceAddress, offset: u32) -> Result<u32> {
        pci::Pci::instance().read32(device, offset)
    }

    fn write_config(&self, device: PciDeviceAddress, offset: u32, value: u32) -> Result<()> {
        pci::Pci::instance().write32(device, offset, value)
    }
}

impl CpuidAccess for LinuxPlatform {
    fn cpuid(&self, leaf: u32) -> Result<CpuidResult> {
        if !cpuid::is_supported() {
            return Err(SmuctlError::CpuidError(
                "CPUID is only available on x86_64".to_string(),
            ));
        }

        let _affinity = match self.config.cpuid_cpu {
            Some(cpu) => Some(AffinityGuard::new(cpu)?),
            None => None,
        };

        Ok(cpuid::cpuid(leaf, 0).into())
    }
}

impl MsrAccess for LinuxPlatform {
    fn read_msr_on(&self, cpu: u32, register: u32) -> Result<(u32, u32)> {
        let value = smuctl_raw::read_msr(cpu, register)
            .map_err(|e| SmuctlError::MsrError(e.to_string()))?;
        tracing::debug!("MSR read: CPU {} MSR 0x{:08x} = 0x{:016x}", cpu, register, value);
        Ok(split(value))
    }
}
