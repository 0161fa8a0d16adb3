//! SMU mailbox layout shared by every Zen register family
//!
//! The SMU is reached through two dwords in the root complex's PCI
//! configuration space: an index port selecting an address in the SMU's
//! internal register space and a data port reading or writing that address.
//! Three internal registers form the mailbox:
//!
//! | Register | Role                                                      |
//! |----------|-----------------------------------------------------------|
//! | MSG      | message opcode; writing it starts processing              |
//! | RSP      | response status, 0 while busy, [`SmuStatus`] when done    |
//! | ARG      | argument in, result out                                   |

use std::fmt;

/// PCI bus/device/function triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PciDeviceAddress {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl PciDeviceAddress {
    /// The host bridge, 00:00.0
    pub const ROOT_COMPLEX: PciDeviceAddress = PciDeviceAddress::new(0, 0, 0);

    pub const fn new(bus: u8, device: u8, function: u8) -> Self {
        Self {
            bus,
            device,
            function,
        }
    }
}

impl fmt::Display for PciDeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.device, self.function)
    }
}

/// Named message slots of a register map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmuMessage {
    TestMessage,
    GetSmuVersion,
    SetOcFreqAllCores,
    SetOcFreqPerCore,
    EnableOcMode,
    DisableOcMode,
    GetPboScalar,
}

impl SmuMessage {
    pub fn name(&self) -> &'static str {
        match self {
            SmuMessage::TestMessage => "TestMessage",
            SmuMessage::GetSmuVersion => "GetSmuVersion",
            SmuMessage::SetOcFreqAllCores => "SetOverclockFrequencyAllCores",
            SmuMessage::SetOcFreqPerCore => "SetOverclockFrequencyPerCore",
            SmuMessage::EnableOcMode => "EnableOcMode",
            SmuMessage::DisableOcMode => "DisableOcMode",
            SmuMessage::GetPboScalar => "GetPBOScalar",
        }
    }

    pub fn all() -> Vec<SmuMessage> {
        vec![
            SmuMessage::TestMessage,
            SmuMessage::GetSmuVersion,
            SmuMessage::SetOcFreqAllCores,
            SmuMessage::SetOcFreqPerCore,
            SmuMessage::EnableOcMode,
            SmuMessage::DisableOcMode,
            SmuMessage::GetPboScalar,
        ]
    }
}

/// Message opcodes understood by one register family
///
/// An opcode of 0 means the message is not defined for the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmuMessages {
    pub test_message: u32,
    pub get_smu_version: u32,
    pub set_oc_freq_all_cores: u32,
    pub set_oc_freq_per_core: u32,
    pub enable_oc_mode: u32,
    pub disable_oc_mode: u32,
    pub get_pbo_scalar: u32,
}

impl SmuMessages {
    /// Messages every family understands; everything else undefined
    pub const BASE: SmuMessages = SmuMessages {
        test_message: 0x1,
        get_smu_version: 0x2,
        set_oc_freq_all_cores: 0x0,
        set_oc_freq_per_core: 0x0,
        enable_oc_mode: 0x0,
        disable_oc_mode: 0x0,
        get_pbo_scalar: 0x0,
    };

    pub const fn opcode(&self, message: SmuMessage) -> u32 {
        match message {
            SmuMessage::TestMessage => self.test_message,
            SmuMessage::GetSmuVersion => self.get_smu_version,
            SmuMessage::SetOcFreqAllCores => self.set_oc_freq_all_cores,
            SmuMessage::SetOcFreqPerCore => self.set_oc_freq_per_core,
            SmuMessage::EnableOcMode => self.enable_oc_mode,
            SmuMessage::DisableOcMode => self.disable_oc_mode,
            SmuMessage::GetPboScalar => self.get_pbo_scalar,
        }
    }

    pub const fn is_defined(&self, message: SmuMessage) -> bool {
        self.opcode(message) != 0
    }
}

/// Register addresses and opcodes of one SMU register family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmuRegisterMap {
    /// Family name used in logs
    pub name: &'static str,

    /// PCI function hosting the index/data ports
    pub pci_address: PciDeviceAddress,

    /// Config-space offset of the index port
    pub index_port: u32,

    /// Config-space offset of the data port
    pub data_port: u32,

    /// SMU address of the message register
    pub msg_address: u32,

    /// SMU address of the response register
    pub rsp_address: u32,

    /// SMU address of the argument register
    pub arg_address: u32,

    pub messages: SmuMessages,
}

impl SmuRegisterMap {
    /// Index/data ports used by every Zen family
    pub const SMN_INDEX_PORT: u32 = 0xB8;
    pub const SMN_DATA_PORT: u32 = 0xBC;

    pub const fn opcode(&self, message: SmuMessage) -> u32 {
        self.messages.opcode(message)
    }

    /// Check that no port or mailbox address is zero
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.index_port == 0 || self.data_port == 0 {
            return Err("index and data ports must be non-zero");
        }
        if self.msg_address == 0 || self.rsp_address == 0 || self.arg_address == 0 {
            return Err("mailbox addresses must be non-zero");
        }
        if self.index_port == self.data_port {
            return Err("index and data ports must differ");
        }
        Ok(())
    }
}

/// SMU address of the thermal throttling status word; bit 0 is PROCHOT
pub const SMN_PROCHOT_STATUS: u32 = 0x0005_9804;

/// Final status codes written by the SMU to the response register
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmuStatus {
    Ok = 0x01,
    Failed = 0xFF,
    UnknownCmd = 0xFE,
    CmdRejectedPrereq = 0xFD,
    CmdRejectedBusy = 0xFC,
}

impl SmuStatus {
    pub const fn from_raw(value: u8) -> Option<SmuStatus> {
        match value {
            0x01 => Some(SmuStatus::Ok),
            0xFF => Some(SmuStatus::Failed),
            0xFE => Some(SmuStatus::UnknownCmd),
            0xFD => Some(SmuStatus::CmdRejectedPrereq),
            0xFC => Some(SmuStatus::CmdRejectedBusy),
            _ => None,
        }
    }

    pub const fn raw(self) -> u8 {
        self as u8
    }
}
