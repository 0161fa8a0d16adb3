//! Zen+ (Pinnacle Ridge, Threadripper 2000 "Colfax")

use crate::mailbox::{PciDeviceAddress, SmuMessages, SmuRegisterMap};

/// SMU addresses for the Zen+ layout
pub mod smn {
    pub const SMU_ADDR_MSG: u32 = 0x03B1_051C;
    pub const SMU_ADDR_RSP: u32 = 0x03B1_0568;
    pub const SMU_ADDR_ARG: u32 = 0x03B1_0590;
}

pub static REGISTER_MAP: SmuRegisterMap = SmuRegisterMap {
    name: "Zen+",
    pci_address: PciDeviceAddress::ROOT_COMPLEX,
    index_port: SmuRegisterMap::SMN_INDEX_PORT,
    data_port: SmuRegisterMap::SMN_DATA_PORT,
    msg_address: smn::SMU_ADDR_MSG,
    rsp_address: smn::SMU_ADDR_RSP,
    arg_address: smn::SMU_ADDR_ARG,
    messages: SmuMessages::BASE,
};
