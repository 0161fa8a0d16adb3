//! CPUID leaves and register layouts used for family identification
//!
//! ## References
//!
//! - AMD64 Architecture Programmer's Manual, Volume 3, Appendix E

use crate::register::{get_bits, RegisterLayout};

/// CPUID leaf numbers
pub mod leaf {
    /// Family/model/stepping in EAX, logical processor count in EBX
    pub const FEATURES: u32 = 0x0000_0001;

    /// Package type in EBX[31:28]
    pub const EXTENDED_FEATURES: u32 = 0x8000_0001;

    /// Processor brand string, 16 bytes per leaf
    pub const BRAND_STRING: [u32; 3] = [0x8000_0002, 0x8000_0003, 0x8000_0004];

    /// Compute unit identifiers; threads per core in EBX[11:8]
    pub const COMPUTE_UNIT: u32 = 0x8000_001E;
}

/// Package type reported by Threadripper and EPYC sockets
pub const PACKAGE_TYPE_SP3_TR: u32 = 7;

/// Processor signature, CPUID leaf 1 EAX
///
/// ## Register Format
///
/// | Bits   | Field           |
/// |--------|-----------------|
/// | 0-3    | stepping        |
/// | 4-7    | base model      |
/// | 8-11   | base family     |
/// | 12-15  | reserved        |
/// | 16-19  | extended model  |
/// | 20-27  | extended family |
/// | 28-31  | reserved        |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuSignature {
    pub stepping: u8,
    pub base_model: u8,
    pub base_family: u8,
    pub extended_model: u8,
    pub extended_family: u8,
}

impl RegisterLayout for CpuSignature {
    fn to_raw(&self) -> u32 {
        (self.stepping as u32 & 0xF)
            | ((self.base_model as u32 & 0xF) << 4)
            | ((self.base_family as u32 & 0xF) << 8)
            | ((self.extended_model as u32 & 0xF) << 16)
            | ((self.extended_family as u32) << 20)
    }

    fn from_raw(value: u32) -> Self {
        Self {
            stepping: get_bits(value, 0, 4) as u8,
            base_model: get_bits(value, 4, 4) as u8,
            base_family: get_bits(value, 8, 4) as u8,
            extended_model: get_bits(value, 16, 4) as u8,
            extended_family: get_bits(value, 20, 8) as u8,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.stepping > 0xF || self.base_model > 0xF || self.base_family > 0xF {
            return Err("Stepping, model and family must be <= 0xF (4 bits)");
        }
        if self.extended_model > 0xF {
            return Err("Extended model must be <= 0xF (4 bits)");
        }
        Ok(())
    }
}

impl CpuSignature {
    /// Family as displayed by AMD (0x17 for Zen through Zen2)
    pub fn family(&self) -> u32 {
        if self.base_family == 0xF {
            self.base_family as u32 + self.extended_family as u32
        } else {
            self.base_family as u32
        }
    }

    /// Model as displayed by AMD
    pub fn model(&self) -> u32 {
        if self.base_family == 0xF {
            ((self.extended_model as u32) << 4) | self.base_model as u32
        } else {
            self.base_model as u32
        }
    }
}

/// CPUID leaf 0x80000001 EBX
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtendedFeatures {
    pub package_type: u8,
}

impl RegisterLayout for ExtendedFeatures {
    fn to_raw(&self) -> u32 {
        (self.package_type as u32 & 0xF) << 28
    }

    fn from_raw(value: u32) -> Self {
        Self {
            package_type: get_bits(value, 28, 4) as u8,
        }
    }
}

/// CPUID leaf 1 EBX
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogicalProcessorInfo {
    pub brand_id: u8,
    pub clflush_size: u8,
    pub logical_processor_count: u8,
    pub initial_apic_id: u8,
}

impl RegisterLayout for LogicalProcessorInfo {
    fn to_raw(&self) -> u32 {
        self.brand_id as u32
            | ((self.clflush_size as u32) << 8)
            | ((self.logical_processor_count as u32) << 16)
            | ((self.initial_apic_id as u32) << 24)
    }

    fn from_raw(value: u32) -> Self {
        Self {
            brand_id: get_bits(value, 0, 8) as u8,
            clflush_size: get_bits(value, 8, 8) as u8,
            logical_processor_count: get_bits(value, 16, 8) as u8,
            initial_apic_id: get_bits(value, 24, 8) as u8,
        }
    }
}

/// CPUID leaf 0x8000001E EBX
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputeUnitInfo {
    pub compute_unit_id: u8,
    /// Threads per compute unit, minus one
    pub threads_per_compute_unit: u8,
}

impl RegisterLayout for ComputeUnitInfo {
    fn to_raw(&self) -> u32 {
        self.compute_unit_id as u32 | ((self.threads_per_compute_unit as u32 & 0xF) << 8)
    }

    fn from_raw(value: u32) -> Self {
        Self {
            compute_unit_id: get_bits(value, 0, 8) as u8,
            threads_per_compute_unit: get_bits(value, 8, 4) as u8,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.threads_per_compute_unit > 0xF {
            return Err("Threads per compute unit must be <= 0xF (4 bits)");
        }
        Ok(())
    }
}

impl ComputeUnitInfo {
    pub fn threads_per_core(&self) -> u32 {
        self.threads_per_compute_unit as u32 + 1
    }
}
