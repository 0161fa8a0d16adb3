//! Raven Ridge APUs
//!
//! Shares the Zen message and response registers but moves the argument
//! register.

use crate::mailbox::{PciDeviceAddress, SmuMessages, SmuRegisterMap};

/// SMU addresses for the Raven Ridge layout
pub mod smn {
    pub const SMU_ADDR_MSG: u32 = 0x03B1_0528;
    pub const SMU_ADDR_RSP: u32 = 0x03B1_0564;
    pub const SMU_ADDR_ARG: u32 = 0x03B1_0998;
}

pub static REGISTER_MAP: SmuRegisterMap = SmuRegisterMap {
    name: "Raven Ridge",
    pci_address: PciDeviceAddress::ROOT_COMPLEX,
    index_port: SmuRegisterMap::SMN_INDEX_PORT,
    data_port: SmuRegisterMap::SMN_DATA_PORT,
    msg_address: smn::SMU_ADDR_MSG,
    rsp_address: smn::SMU_ADDR_RSP,
    arg_address: smn::SMU_ADDR_ARG,
    messages: SmuMessages::BASE,
};
