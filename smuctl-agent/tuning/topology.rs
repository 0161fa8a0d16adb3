//! Core counts, core enumeration and the processor brand string

use smuctl_raw::cpuid::{leaf, ComputeUnitInfo, LogicalProcessorInfo};
use smuctl_raw::RegisterLayout;

use crate::capability::{CpuidAccess, CpuidResult};
use crate::error::Result;
use crate::tuning::core_mask::{cores_per_ccx, CoreAddress, CCD_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreCount {
    pub physical: u32,
    pub logical: u32,
}

/// Physical cores from the logical count; a zero thread count yields 0
pub fn derive_core_count(logical: u32, threads_per_core: u32) -> CoreCount {
    let physical = logical.checked_div(threads_per_core).unwrap_or(0);
    CoreCount { physical, logical }
}

pub fn core_count<C: CpuidAccess + ?Sized>(cpuid: &C) -> Result<CoreCount> {
    let logical =
        LogicalProcessorInfo::from_raw(cpuid.cpuid(leaf::FEATURES)?.ebx).logical_processor_count;

    let threads_per_core = match cpuid.cpuid(leaf::COMPUTE_UNIT) {
        Ok(result) => ComputeUnitInfo::from_raw(result.ebx).threads_per_core(),
        Err(e) => {
            tracing::debug!("Compute unit leaf unavailable, assuming 1 thread per core: {}", e);
            1
        }
    };

    let count = derive_core_count(logical as u32, threads_per_core);
    tracing::debug!(
        "Cores: {} physical, {} logical ({} threads per core)",
        count.physical,
        count.logical,
        threads_per_core
    );
    Ok(count)
}

/// Assemble the brand string from the raw brand leaves
///
/// Each register holds four ASCII bytes, little-endian. NUL bytes are
/// dropped and surrounding whitespace trimmed.
pub fn decode_brand_string(leaves: &[CpuidResult]) -> String {
    let bytes: Vec<u8> = leaves
        .iter()
        .flat_map(|r| [r.eax, r.ebx, r.ecx, r.edx])
        .flat_map(u32::to_le_bytes)
        .filter(|b| *b != 0)
        .collect();

    String::from_utf8_lossy(&bytes).trim().to_string()
}

pub fn cpu_name<C: CpuidAccess + ?Sized>(cpuid: &C) -> String {
    let leaves: Vec<CpuidResult> = leaf::BRAND_STRING
        .iter()
        .filter_map(|&l| match cpuid.cpuid(l) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!("Skipping brand string leaf 0x{:08X}: {}", l, e);
                None
            }
        })
        .collect();

    decode_brand_string(&leaves)
}

/// Core layout of one package as seen by the overclock messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreTopology {
    /// Physical cores, enabled or not
    pub cores: u32,
    pub ccx_per_ccd: u32,
}

impl CoreTopology {
    pub fn new(cores: u32, ccx_per_ccd: u32) -> Result<Self> {
        cores_per_ccx(ccx_per_ccd)?;
        Ok(Self { cores, ccx_per_ccd })
    }

    pub fn cores_per_ccx(&self) -> Result<u32> {
        cores_per_ccx(self.ccx_per_ccd)
    }

    fn address_of(&self, index: u32, cores_per_ccx: u32) -> CoreAddress {
        let ccd = index / CCD_SIZE;
        CoreAddress {
            ccd,
            ccx: index / cores_per_ccx - self.ccx_per_ccd * ccd,
            core: index % cores_per_ccx,
        }
    }

    /// Cores whose bit in the fuse disable map is clear
    ///
    /// Byte `n` of `disable_map` covers cores `8n..8n+8`; a missing byte means
    /// every core it would cover is enabled.
    pub fn enabled_cores(&self, disable_map: &[u8]) -> Result<Vec<CoreAddress>> {
        let per_ccx = self.cores_per_ccx()?;

        Ok((0..self.cores)
            .filter(|i| {
                let disabled = disable_map.get((i / 8) as usize).copied().unwrap_or(0);
                (disabled >> (i % 8)) & 1 == 0
            })
            .map(|i| self.address_of(i, per_ccx))
            .collect())
    }

    /// First core of every CCX
    pub fn ccx_addresses(&self) -> Result<Vec<CoreAddress>> {
        let per_ccx = self.cores_per_ccx()?;

        Ok((0..self.cores)
            .step_by(per_ccx as usize)
            .map(|i| CoreAddress {
                core: 0,
                ..self.address_of(i, per_ccx)
            })
            .collect())
    }

    pub fn ccd_addresses(&self) -> Vec<CoreAddress> {
        (0..self.cores)
            .step_by(CCD_SIZE as usize)
            .map(|i| CoreAddress::new(i / CCD_SIZE, 0, 0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlatform;

    #[test]
    fn test_derive_core_count() {
        assert_eq!(
            derive_core_count(16, 2),
            CoreCount {
                physical: 8,
                logical: 16
            }
        );
        assert_eq!(derive_core_count(16, 0).physical, 0);
        assert_eq!(derive_core_count(16, 0).logical, 16);
    }

    #[test]
    fn test_core_count_from_cpuid() {
        let platform = FakePlatform::new().with_topology(16, 1);
        let count = core_count(&platform).unwrap();
        assert_eq!((count.physical, count.logical), (8, 16));
    }

    #[test]
    fn test_core_count_without_compute_unit_leaf() {
        let platform = FakePlatform::new()
            .with_topology(12, 1)
            .failing_cpuid(leaf::COMPUTE_UNIT);
        let count = core_count(&platform).unwrap();
        assert_eq!((count.physical, count.logical), (12, 12));
    }

    #[test]
    fn test_brand_string() {
        let platform = FakePlatform::new().with_brand("AMD Ryzen 9 3900X 12-Core Processor    ");
        assert_eq!(cpu_name(&platform), "AMD Ryzen 9 3900X 12-Core Processor");
    }

    #[test]
    fn test_brand_string_drops_nul_bytes() {
        let leaves = [CpuidResult {
            eax: u32::from_le_bytes(*b"  AM"),
            ebx: u32::from_le_bytes([b'D', 0, b' ', b'E']),
            ecx: u32::from_le_bytes(*b"PYC "),
            edx: 0,
        }];
        assert_eq!(decode_brand_string(&leaves), "AMD EPYC");
    }

    #[test]
    fn test_brand_string_skips_failed_leaf() {
        let platform = FakePlatform::new()
            .with_brand("AMD Ryzen 7 2700X Eight-Core Processor")
            .failing_cpuid(0x8000_0004);
        assert_eq!(cpu_name(&platform), "AMD Ryzen 7 2700X Eight-Core Pro");
    }

    #[test]
    fn test_enabled_cores_skip_fused_off() {
        // 6 of 8 cores per CCD enabled, cores 3 and 7 fused off on CCD 0
        let topology = CoreTopology::new(16, 2).unwrap();
        let cores = topology.enabled_cores(&[0b1000_1000]).unwrap();

        assert_eq!(cores.len(), 14);
        assert_eq!(cores[2], CoreAddress::new(0, 0, 2));
        assert_eq!(cores[3], CoreAddress::new(0, 1, 0));
        assert_eq!(cores[6], CoreAddress::new(1, 0, 0));
        assert_eq!(cores[13], CoreAddress::new(1, 1, 3));
    }

    #[test]
    fn test_group_addresses() {
        let topology = CoreTopology::new(16, 2).unwrap();
        assert_eq!(
            topology.ccx_addresses().unwrap(),
            vec![
                CoreAddress::new(0, 0, 0),
                CoreAddress::new(0, 1, 0),
                CoreAddress::new(1, 0, 0),
                CoreAddress::new(1, 1, 0),
            ]
        );
        assert_eq!(
            topology.ccd_addresses(),
            vec![CoreAddress::new(0, 0, 0), CoreAddress::new(1, 0, 0)]
        );
    }

    #[test]
    fn test_invalid_topology() {
        assert!(CoreTopology::new(8, 0).is_err());
    }
}
