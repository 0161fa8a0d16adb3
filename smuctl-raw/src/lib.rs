//! # smuctl-raw
//!
//! Register definitions for the AMD Zen System Management Unit mailbox.
//!
//! This crate holds hardware constants only: where each Zen generation put
//! its SMU mailbox registers, which opcodes it understands, how the status
//! byte is encoded and how the CPUID words used for family identification
//! are laid out. Policy (locking, polling, family dispatch) lives in
//! smuctl-agent.
//!
//! ## Usage
//!
//! ```
//! use smuctl_raw::arch::zen2;
//! use smuctl_raw::mailbox::SmuMessage;
//!
//! let map = zen2::REGISTER_MAP;
//! assert_eq!(map.msg_address, 0x03B1_0524);
//! assert_eq!(map.opcode(SmuMessage::EnableOcMode), 0x5A);
//! ```

pub mod arch;
pub mod cpuid;
pub mod mailbox;
pub mod msr;
pub mod register;

// Re-export for convenience
pub use mailbox::{PciDeviceAddress, SmuMessage, SmuMessages, SmuRegisterMap, SmuStatus};
pub use msr::{read_msr, MsrError};
pub use register::{get_bits, set_bits, RegisterLayout};
