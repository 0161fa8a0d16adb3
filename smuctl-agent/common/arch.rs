// CPU family detection for AMD Zen processors

use smuctl_raw::cpuid::{leaf, CpuSignature, ExtendedFeatures, PACKAGE_TYPE_SP3_TR};
use smuctl_raw::RegisterLayout;

use crate::capability::CpuidAccess;
use crate::error::Result;

enum_with_data! {
    pub enum CpuFamilyVariant: &'static str {
        Unsupported => ("Unsupported", "Unknown"),
        SummitRidge => ("SummitRidge", "Zen"),
        Threadripper => ("Threadripper", "Zen"),
        Naples => ("Naples", "Zen"),
        PinnacleRidge => ("PinnacleRidge", "Zen+"),
        Colfax => ("Colfax", "Zen+"),
        Picasso => ("Picasso", "Zen+"),
        RavenRidge => ("RavenRidge", "Zen"),
        Matisse => ("Matisse", "Zen2"),
        CastlePeak => ("CastlePeak", "Zen2"),
        Rome => ("Rome", "Zen2"),
        Fenghuang => ("Fenghuang", "Zen"),
        Renoir => ("Renoir", "Zen2"),
        Debug => ("Debug", "Unknown"),
    }
    impl microarchitecture -> &'static str
}

/// Signature with the reserved bits 31:28 cleared
fn normalize(signature: u32) -> u32 {
    CpuSignature::from_raw(signature).to_raw()
}

/// Resolve a CPUID leaf 1 EAX signature and package type to a family variant
///
/// The table pins exact signatures: Naples differs from Summit Ridge B1 only
/// in its stepping. Package type 7 (SP3/TR4) separates the workstation and
/// server parts that share desktop silicon.
pub fn identify(signature: u32, package_type: u32) -> CpuFamilyVariant {
    let sp3 = package_type == PACKAGE_TYPE_SP3_TR;

    match normalize(signature) {
        // Zen, Summit Ridge A0/B1
        0x0080_0F00 | 0x0080_0F11 => {
            if sp3 {
                CpuFamilyVariant::Threadripper
            } else {
                CpuFamilyVariant::SummitRidge
            }
        }
        0x0080_0F12 => CpuFamilyVariant::Naples,
        // Zen+, Pinnacle Ridge
        0x0080_0F82 => {
            if sp3 {
                CpuFamilyVariant::Colfax
            } else {
                CpuFamilyVariant::PinnacleRidge
            }
        }
        0x0081_0F81 => CpuFamilyVariant::Picasso,
        // Raven Ridge A0, Raven Ridge, Raven Ridge 2 A0
        0x0081_0F00 | 0x0081_0F10 | 0x0082_0F00 => CpuFamilyVariant::RavenRidge,
        // Matisse A0/B0
        0x0087_0F00 | 0x0087_0F10 => CpuFamilyVariant::Matisse,
        0x0083_0F00 | 0x0083_0F10 => {
            if sp3 {
                CpuFamilyVariant::Rome
            } else {
                CpuFamilyVariant::CastlePeak
            }
        }
        0x0085_0F00 => CpuFamilyVariant::Fenghuang,
        0x0086_0F01 => CpuFamilyVariant::Renoir,
        _ => CpuFamilyVariant::Unsupported,
    }
}

/// Processor identity as read from CPUID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuIdentity {
    pub signature: u32,
    pub package_type: u32,
    pub variant: CpuFamilyVariant,
}

impl CpuIdentity {
    /// Display family, e.g. 0x17
    pub fn family(&self) -> u32 {
        CpuSignature::from_raw(self.signature).family()
    }

    pub fn model(&self) -> u32 {
        CpuSignature::from_raw(self.signature).model()
    }
}

/// Read the signature and package type and resolve the family variant
pub fn detect<C: CpuidAccess + ?Sized>(cpuid: &C) -> Result<CpuIdentity> {
    let signature = cpuid.cpuid(leaf::FEATURES)?.eax;
    let package_type =
        ExtendedFeatures::from_raw(cpuid.cpuid(leaf::EXTENDED_FEATURES)?.ebx).package_type as u32;

    let sig = CpuSignature::from_raw(signature);
    tracing::info!(
        "CPU: Family {:X}, Model {:X}, Stepping {:X}, Package {}",
        sig.family(),
        sig.model(),
        sig.stepping,
        package_type
    );

    let variant = identify(signature, package_type);
    if variant == CpuFamilyVariant::Unsupported {
        tracing::warn!("Unrecognized CPU signature 0x{:08X}", signature);
    } else {
        tracing::info!(
            "Detected CPU family: {} ({})",
            variant.name(),
            variant.microarchitecture()
        );
    }

    Ok(CpuIdentity {
        signature,
        package_type,
        variant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlatform;

    #[test]
    fn test_package_type_disambiguates_summit_ridge() {
        assert_eq!(identify(0x0080_0F11, 7), CpuFamilyVariant::Threadripper);
        assert_eq!(identify(0x0080_0F11, 0), CpuFamilyVariant::SummitRidge);
        assert_eq!(identify(0x0080_0F00, 7), CpuFamilyVariant::Threadripper);
    }

    #[test]
    fn test_package_type_disambiguates_zen_plus_and_zen2() {
        assert_eq!(identify(0x0080_0F82, 7), CpuFamilyVariant::Colfax);
        assert_eq!(identify(0x0080_0F82, 2), CpuFamilyVariant::PinnacleRidge);
        assert_eq!(identify(0x0083_0F10, 7), CpuFamilyVariant::Rome);
        assert_eq!(identify(0x0083_0F10, 4), CpuFamilyVariant::CastlePeak);
    }

    #[test]
    fn test_single_package_parts() {
        assert_eq!(identify(0x0080_0F12, 7), CpuFamilyVariant::Naples);
        assert_eq!(identify(0x0081_0F81, 0), CpuFamilyVariant::Picasso);
        assert_eq!(identify(0x0082_0F00, 0), CpuFamilyVariant::RavenRidge);
        assert_eq!(identify(0x0087_0F10, 7), CpuFamilyVariant::Matisse);
        assert_eq!(identify(0x0085_0F00, 0), CpuFamilyVariant::Fenghuang);
        assert_eq!(identify(0x0086_0F01, 0), CpuFamilyVariant::Renoir);
    }

    #[test]
    fn test_unrecognized_signature() {
        assert_eq!(identify(0x0000_0000, 0), CpuFamilyVariant::Unsupported);
        assert_eq!(identify(0x00A2_0F10, 0), CpuFamilyVariant::Unsupported);
        // Intel Skylake-SP
        assert_eq!(identify(0x0005_0654, 0), CpuFamilyVariant::Unsupported);
    }

    #[test]
    fn test_reserved_bits_are_ignored() {
        assert_eq!(identify(0xF080_0F11, 0), CpuFamilyVariant::SummitRidge);
    }

    #[test]
    fn test_detect_reads_both_leaves() {
        let platform = FakePlatform::new().with_identity(0x0083_0F10, 7);
        let identity = detect(&platform).unwrap();
        assert_eq!(identity.variant, CpuFamilyVariant::Rome);
        assert_eq!(identity.package_type, 7);
        assert_eq!(identity.family(), 0x17);
        assert_eq!(identity.model(), 0x31);
    }

    #[test]
    fn test_variant_metadata() {
        assert_eq!(CpuFamilyVariant::all().len(), 14);
        assert_eq!(CpuFamilyVariant::Matisse.microarchitecture(), "Zen2");
        assert_eq!(CpuFamilyVariant::Colfax.name(), "Colfax");
    }
}
