//! Register map lookup by CPU family variant

use once_cell::sync::Lazy;
use smuctl_raw::arch::{raven_ridge, raven_ridge2, rome, zen, zen2, zen_plus};
use smuctl_raw::SmuRegisterMap;
use std::collections::HashMap;

use crate::common::arch::CpuFamilyVariant;
use crate::error::{Result, SmuctlError};

/// Immutable variant -> register map table, built on first use
pub struct RegisterMapCatalog {
    maps: HashMap<CpuFamilyVariant, &'static SmuRegisterMap>,
}

impl RegisterMapCatalog {
    fn new() -> Self {
        let maps = HashMap::from([
            (CpuFamilyVariant::SummitRidge, &zen::REGISTER_MAP),
            (CpuFamilyVariant::Threadripper, &zen::REGISTER_MAP),
            (CpuFamilyVariant::PinnacleRidge, &zen_plus::REGISTER_MAP),
            (CpuFamilyVariant::Colfax, &zen_plus::REGISTER_MAP),
            (CpuFamilyVariant::RavenRidge, &raven_ridge::REGISTER_MAP),
            (CpuFamilyVariant::Picasso, &raven_ridge2::REGISTER_MAP),
            (CpuFamilyVariant::Matisse, &zen2::REGISTER_MAP),
            (CpuFamilyVariant::CastlePeak, &zen2::REGISTER_MAP),
            (CpuFamilyVariant::Renoir, &zen2::REGISTER_MAP),
            (CpuFamilyVariant::Rome, &rome::REGISTER_MAP),
        ]);

        Self { maps }
    }

    pub fn instance() -> &'static RegisterMapCatalog {
        static INSTANCE: Lazy<RegisterMapCatalog> = Lazy::new(RegisterMapCatalog::new);
        &INSTANCE
    }

    pub fn get_by_variant(&self, variant: CpuFamilyVariant) -> Result<&'static SmuRegisterMap> {
        self.maps
            .get(&variant)
            .copied()
            .ok_or(SmuctlError::UnsupportedVariant(variant))
    }

    pub fn supports(&self, variant: CpuFamilyVariant) -> bool {
        self.maps.contains_key(&variant)
    }

    /// Variants with a registered map
    pub fn variants(&self) -> Vec<CpuFamilyVariant> {
        CpuFamilyVariant::all()
            .into_iter()
            .filter(|v| self.supports(*v))
            .collect()
    }
}

pub fn get_by_variant(variant: CpuFamilyVariant) -> Result<&'static SmuRegisterMap> {
    RegisterMapCatalog::instance().get_by_variant(variant)
}
