//! Named SMU operations for the detected CPU family
//!
//! [`SmuClient`] binds a [`SmuTransport`] to the register map selected for
//! the running CPU and translates named messages into opcodes, refusing any
//! message the family leaves undefined.

use smuctl_raw::mailbox::SMN_PROCHOT_STATUS;
use smuctl_raw::msr::MSR_PATCH_LEVEL;
use smuctl_raw::{SmuMessage, SmuRegisterMap};
use std::fmt;
use std::sync::Arc;

use crate::capability::HardwareAccess;
use crate::common::arch::{self, CpuFamilyVariant, CpuIdentity};
use crate::config::TransportConfig;
use crate::error::{Result, SmuctlError};
use crate::smu::catalog;
use crate::smu::transport::SmuTransport;
use crate::tuning::core_mask::CoreMaskScheme;
use crate::tuning::topology::{self, CoreCount};
use crate::tuning::voltage::VoltageScheme;

/// Frequency field of the overclock frequency argument
const FREQUENCY_MASK: u32 = 0x000F_FFFF;

/// SMU firmware version word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmuVersion(pub u32);

impl SmuVersion {
    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn major(&self) -> u32 {
        (self.0 >> 16) & 0xFF
    }

    pub fn minor(&self) -> u32 {
        (self.0 >> 8) & 0xFF
    }

    pub fn patch(&self) -> u32 {
        self.0 & 0xFF
    }
}

impl fmt::Display for SmuVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}

pub struct SmuClient<P: ?Sized> {
    platform: Arc<P>,
    identity: CpuIdentity,
    transport: SmuTransport<P>,
    version: SmuVersion,
    msr_cpu: u32,
}

pub type DynSmuClient = SmuClient<dyn HardwareAccess>;

impl<P: HardwareAccess + ?Sized> SmuClient<P> {
    /// Identify the CPU and bind to its register map
    pub fn new(platform: Arc<P>, config: TransportConfig) -> Result<Self> {
        let identity = arch::detect(&*platform)?;
        Self::with_identity(platform, identity, config)
    }

    pub fn with_identity(
        platform: Arc<P>,
        identity: CpuIdentity,
        config: TransportConfig,
    ) -> Result<Self> {
        let map = catalog::get_by_variant(identity.variant)?;
        let transport = SmuTransport::new(Arc::clone(&platform), map, config)?;

        let mut client = Self {
            platform,
            identity,
            transport,
            version: SmuVersion::default(),
            msr_cpu: 0,
        };

        client.version = match client.get_version() {
            Ok(raw) => SmuVersion(raw),
            Err(e) => {
                tracing::warn!("Failed to read SMU version: {}", e);
                SmuVersion::default()
            }
        };
        tracing::info!(
            "SMU {} on {} ({} register map)",
            client.version,
            identity.variant.name(),
            map.name
        );

        Ok(client)
    }

    /// Logical processor used for MSR reads
    pub fn with_msr_cpu(mut self, cpu: u32) -> Self {
        self.msr_cpu = cpu;
        self
    }

    pub fn identity(&self) -> &CpuIdentity {
        &self.identity
    }

    pub fn variant(&self) -> CpuFamilyVariant {
        self.identity.variant
    }

    pub fn cpu_family(&self) -> u32 {
        self.identity.family()
    }

    pub fn signature(&self) -> u32 {
        self.identity.signature
    }

    pub fn package_type(&self) -> u32 {
        self.identity.package_type
    }

    pub fn register_map(&self) -> &'static SmuRegisterMap {
        self.transport.register_map()
    }

    pub fn transport(&self) -> &SmuTransport<P> {
        &self.transport
    }

    /// Version learned at construction, 0.0.0 if it could not be read
    pub fn smu_version(&self) -> SmuVersion {
        self.version
    }

    /// Opcode of `message`, failing if the family leaves it undefined
    pub fn opcode(&self, message: SmuMessage) -> Result<u32> {
        match self.register_map().opcode(message) {
            0 => Err(SmuctlError::UnsupportedOpcode(message.name())),
            opcode => Ok(opcode),
        }
    }

    pub fn send(&self, message: SmuMessage, argument: u32) -> Result<u32> {
        self.transport.request(self.opcode(message)?, argument)
    }

    pub fn read(&self, message: SmuMessage) -> Result<u32> {
        self.transport.query(self.opcode(message)?)
    }

    pub fn request(&self, opcode: u32, argument: u32) -> Result<u32> {
        self.transport.request(opcode, argument)
    }

    pub fn query(&self, opcode: u32) -> Result<u32> {
        self.transport.query(opcode)
    }

    pub fn get_version(&self) -> Result<u32> {
        self.read(SmuMessage::GetSmuVersion)
    }

    /// Whether manual overclocking is engaged
    ///
    /// A PBO scalar of 0 means PBO is off and manual OC is active. Families
    /// without the message and failed reads report `false`.
    pub fn get_oc_mode(&self) -> bool {
        match self.read(SmuMessage::GetPboScalar) {
            Ok(scalar) => scalar == 0,
            Err(e) => {
                tracing::debug!("PBO scalar unavailable: {}", e);
                false
            }
        }
    }

    pub fn is_prochot_enabled(&self) -> Result<bool> {
        Ok(self.transport.read_indexed(SMN_PROCHOT_STATUS)? & 1 == 1)
    }

    /// Microcode patch level, 0 if the MSR is unreadable
    pub fn get_patch_level(&self) -> u32 {
        match self.platform.read_msr_on(self.msr_cpu, MSR_PATCH_LEVEL) {
            Ok((eax, _)) => eax,
            Err(e) => {
                tracing::warn!("Failed to read patch level: {}", e);
                0
            }
        }
    }

    pub fn core_count(&self) -> Result<CoreCount> {
        topology::core_count(&*self.platform)
    }

    pub fn cpu_name(&self) -> String {
        topology::cpu_name(&*self.platform)
    }

    pub fn voltage_scheme(&self) -> VoltageScheme {
        VoltageScheme::for_family(self.cpu_family())
    }

    pub fn core_mask_scheme(&self, ccx_per_ccd: u32) -> CoreMaskScheme {
        CoreMaskScheme::for_family(self.cpu_family(), ccx_per_ccd)
    }

    /// Echo check; the SMU answers with the argument plus one
    pub fn test_message(&self, argument: u32) -> Result<u32> {
        self.send(SmuMessage::TestMessage, argument)
    }

    pub fn enable_oc_mode(&self) -> Result<()> {
        self.send(SmuMessage::EnableOcMode, 0)?;
        tracing::info!("Overclock mode enabled");
        Ok(())
    }

    pub fn disable_oc_mode(&self) -> Result<()> {
        self.send(SmuMessage::DisableOcMode, 0)?;
        tracing::info!("Overclock mode disabled");
        Ok(())
    }

    pub fn set_frequency_all_cores(&self, mhz: u32) -> Result<()> {
        self.send(SmuMessage::SetOcFreqAllCores, mhz & FREQUENCY_MASK)?;
        tracing::info!("All-core frequency set to {} MHz", mhz);
        Ok(())
    }

    /// `mask` is a target from [`CoreMaskScheme::encode`]
    pub fn set_frequency_per_core(&self, mask: u32, mhz: u32) -> Result<()> {
        self.send(SmuMessage::SetOcFreqPerCore, mask | (mhz & FREQUENCY_MASK))?;
        tracing::info!("Frequency of core 0x{:08X} set to {} MHz", mask, mhz);
        Ok(())
    }
}
