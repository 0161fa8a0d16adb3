//! Core addressing for per-core overclock messages
//!
//! The per-core frequency message carries its target in bits 31:20 of the
//! argument. Family 0x17 and earlier address a core inside its CCX; later
//! families drop the CCX level and address the core inside its CCD.

use smuctl_raw::register::{get_bits, RegisterLayout};

use crate::error::{Result, SmuctlError};

/// Cores per CCD on every Zen part
pub const CCD_SIZE: u32 = 8;

/// Bit position of the target field in the message argument
pub const CORE_MASK_SHIFT: u32 = 20;

/// Last family using the per-CCX scheme
pub const LAST_CCX_FAMILY: u32 = 0x17;

/// Location of one core in the CCD/CCX hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CoreAddress {
    pub ccd: u32,
    pub ccx: u32,
    pub core: u32,
}

impl CoreAddress {
    pub const fn new(ccd: u32, ccx: u32, core: u32) -> Self {
        Self { ccd, ccx, core }
    }
}

/// Per-CCX target
///
/// ## Register Format
///
/// | Bits  | Field |
/// |-------|-------|
/// | 20-23 | core  |
/// | 24-27 | ccx   |
/// | 28-31 | ccd   |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CcxCoreMask {
    pub ccd: u32,
    pub ccx: u32,
    pub core: u32,
}

impl RegisterLayout for CcxCoreMask {
    fn to_raw(&self) -> u32 {
        ((self.ccd & 0xF) << 28) | ((self.ccx & 0xF) << 24) | ((self.core & 0xF) << CORE_MASK_SHIFT)
    }

    fn from_raw(value: u32) -> Self {
        Self {
            ccd: get_bits(value, 28, 4),
            ccx: get_bits(value, 24, 4),
            core: get_bits(value, CORE_MASK_SHIFT, 4),
        }
    }

    fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.ccd > 0xF || self.ccx > 0xF || self.core > 0xF {
            return Err("CCD, CCX and core must be <= 0xF (4 bits)");
        }
        Ok(())
    }
}

/// Per-CCD target
///
/// ## Register Format
///
/// | Bits  | Field    |
/// |-------|----------|
/// | 20-23 | core     |
/// | 24-27 | reserved |
/// | 28-31 | ccd      |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CcdCoreMask {
    pub ccd: u32,
    pub core: u32,
}

impl RegisterLayout for CcdCoreMask {
    fn to_raw(&self) -> u32 {
        ((self.ccd & 0xF) << 28) | ((self.core & 0xF) << CORE_MASK_SHIFT)
    }

    fn from_raw(value: u32) -> Self {
        Self {
            ccd: get_bits(value, 28, 4),
            core: get_bits(value, CORE_MASK_SHIFT, 4),
        }
    }

    fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.ccd > 0xF || self.core > 0xF {
            return Err("CCD and core must be <= 0xF (4 bits)");
        }
        Ok(())
    }
}

/// Cores in one CCX for a CCD split into `ccx_per_ccd` complexes
pub fn cores_per_ccx(ccx_per_ccd: u32) -> Result<u32> {
    if ccx_per_ccd == 0 || CCD_SIZE % ccx_per_ccd != 0 {
        return Err(SmuctlError::InvalidTopology(format!(
            "{ccx_per_ccd} CCX per CCD does not divide {CCD_SIZE} cores"
        )));
    }
    Ok(CCD_SIZE / ccx_per_ccd)
}

/// Family-selected core addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreMaskScheme {
    PerCcx { ccx_per_ccd: u32 },
    PerCcd,
}

impl CoreMaskScheme {
    pub fn for_family(family: u32, ccx_per_ccd: u32) -> Self {
        if family <= LAST_CCX_FAMILY {
            CoreMaskScheme::PerCcx { ccx_per_ccd }
        } else {
            CoreMaskScheme::PerCcd
        }
    }

    pub fn encode(&self, address: CoreAddress) -> Result<u32> {
        let invalid = |e: &str| SmuctlError::InvalidTopology(format!("{address:?}: {e}"));

        match *self {
            CoreMaskScheme::PerCcx { ccx_per_ccd } => {
                let mask = CcxCoreMask {
                    ccd: address.ccd,
                    ccx: address.ccx % ccx_per_ccd.max(1),
                    core: address.core % cores_per_ccx(ccx_per_ccd)?,
                };
                mask.validate().map_err(invalid)?;
                Ok(mask.to_raw())
            }
            CoreMaskScheme::PerCcd => {
                let mask = CcdCoreMask {
                    ccd: address.ccd,
                    core: address.core,
                };
                mask.validate().map_err(invalid)?;
                Ok(mask.to_raw())
            }
        }
    }
}

/// Encode the per-core message target for `family`
pub fn core_mask(ccd: u32, ccx: u32, core: u32, family: u32, ccx_per_ccd: u32) -> Result<u32> {
    CoreMaskScheme::for_family(family, ccx_per_ccd).encode(CoreAddress::new(ccd, ccx, core))
}
