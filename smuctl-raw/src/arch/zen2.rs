//! Zen2 client and workstation parts (Matisse, Castle Peak, Renoir)
//!
//! Castle Peak reports the same CPUID signature as Rome but answers to the
//! desktop opcodes.

use crate::mailbox::{PciDeviceAddress, SmuMessages, SmuRegisterMap};

/// SMU addresses for the Zen2 layout
pub mod smn {
    pub const SMU_ADDR_MSG: u32 = 0x03B1_0524;
    pub const SMU_ADDR_RSP: u32 = 0x03B1_0570;
    pub const SMU_ADDR_ARG: u32 = 0x03B1_0A40;
}

/// Overclocking message opcodes
pub mod msg {
    pub const SET_OC_FREQ_ALL_CORES: u32 = 0x5C;
    pub const SET_OC_FREQ_PER_CORE: u32 = 0x5D;
    pub const ENABLE_OC_MODE: u32 = 0x5A;
    pub const DISABLE_OC_MODE: u32 = 0x5B;
    pub const GET_PBO_SCALAR: u32 = 0x6C;
}

pub static REGISTER_MAP: SmuRegisterMap = SmuRegisterMap {
    name: "Zen2",
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
        get_pbo_scalar: msg::GET_PBO_SCALAR,
        ..SmuMessages::BASE
    },
};
