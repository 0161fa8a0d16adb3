//! EPYC 7002 (Rome)
//!
//! Same mailbox addresses as Zen2, server opcode numbering. Only the
//! all-core frequency message is known.

use crate::arch::zen2::smn;
use crate::mailbox::{PciDeviceAddress, SmuMessages, SmuRegisterMap};

/// Overclocking message opcodes
pub mod msg {
    pub const SET_OC_FREQ_ALL_CORES: u32 = 0x18;
}

pub static REGISTER_MAP: SmuRegisterMap = SmuRegisterMap {
    name: "Rome",
    pci_address: PciDeviceAddress::ROOT_COMPLEX,
    index_port: SmuRegisterMap::SMN_INDEX_PORT,
    data_port: SmuRegisterMap::SMN_DATA_PORT,
    msg_address: smn::SMU_ADDR_MSG,
    rsp_address: smn::SMU_ADDR_RSP,
    arg_address: smn::SMU_ADDR_ARG,
    messages: SmuMessages {
        set_oc_freq_all_cores: msg::SET_OC_FREQ_ALL_CORES,
        ..SmuMessages::BASE
    },
};
