//! Raven Ridge 2 and Picasso APUs

use crate::mailbox::{PciDeviceAddress, SmuMessages, SmuRegisterMap};

/// SMU addresses for the Raven Ridge 2 layout
pub mod smn {
    pub const SMU_ADDR_MSG: u32 = 0x03B1_0A20;
    pub const SMU_ADDR_RSP: u32 = 0x03B1_0A80;
    pub const SMU_ADDR_ARG: u32 = 0x03B1_0A88;
}

/// Overclocking message opcodes
pub mod msg {
    pub const SET_OC_FREQ_ALL_CORES: u32 = 0x7D;
    pub const SET_OC_FREQ_PER_CORE: u32 = 0x7E;
    pub const ENABLE_OC_MODE: u32 = 0x69;
    pub const DISABLE_OC_MODE: u32 = 0x6A;
}

pub static REGISTER_MAP: SmuRegisterMap = SmuRegisterMap {
    name: "Raven Ridge 2",
    pci_address: PciDeviceAddress::ROOT_COMPLEX,
    index_port: SmuRegisterMap::SMN_INDEX_PORT,
    data_port: SmuRegisterMap::SMN_DATA_PORT,
    msg_address: smn::SMU_ADDR_MSG,
    rsp_address: smn::SMU_ADDR_RSP,
    arg_address: smn::SMU_ADDR_ARG,
    messages: SmuMessages {
        set_oc_freq_all_cores: msg::SET_OC_FREQ_ALL_CORES,
        set_oc_freq_per_core: msg::SET_OC_FREQ_PER_CORE,
        enable_oc_mode: msg::ENABLE_OC_MODE,
        disable_oc_mode: msg::DISABLE_OC_MODE,
        ..SmuMessages::BASE
    },
};
