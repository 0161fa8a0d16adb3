//! Human-readable SMU response codes

use once_cell::sync::Lazy;
use smuctl_raw::SmuStatus;
use std::collections::HashMap;

pub const OK: u8 = SmuStatus::Ok.raw();
pub const FAILED: u8 = SmuStatus::Failed.raw();
pub const UNKNOWN_CMD: u8 = SmuStatus::UnknownCmd.raw();
pub const CMD_REJECTED_PREREQ: u8 = SmuStatus::CmdRejectedPrereq.raw();
pub const CMD_REJECTED_BUSY: u8 = SmuStatus::CmdRejectedBusy.raw();

/// Text for bytes outside the defined codes
pub const UNKNOWN_STATUS: &str = "Unknown Status";

static STATUS_TEXT: Lazy<HashMap<SmuStatus, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (SmuStatus::Ok, "OK"),
        (SmuStatus::Failed, "Failed"),
        (SmuStatus::UnknownCmd, "Unknown Command"),
        (SmuStatus::CmdRejectedPrereq, "CMD Rejected Prereq"),
        (SmuStatus::CmdRejectedBusy, "CMD Rejected Busy"),
    ])
});

/// Describe a raw response byte; never fails
pub fn describe(raw: u8) -> &'static str {
    SmuStatus::from_raw(raw)
        .and_then(|status| STATUS_TEXT.get(&status).copied())
        .unwrap_or(UNKNOWN_STATUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defined_codes() {
        assert_eq!(describe(0x01), "OK");
        assert_eq!(describe(0xFF), "Failed");
        assert_eq!(describe(0xFE), "Unknown Command");
        assert_eq!(describe(0xFD), "CMD Rejected Prereq");
        assert_eq!(describe(0xFC), "CMD Rejected Busy");
    }

    #[test]
    fn test_every_other_byte_is_unknown() {
        assert_eq!(describe(0x37), "Unknown Status");

        let defined = [OK, FAILED, UNKNOWN_CMD, CMD_REJECTED_PREREQ, CMD_REJECTED_BUSY];
        for raw in 0..=u8::MAX {
            if !defined.contains(&raw) {
                assert_eq!(describe(raw), UNKNOWN_STATUS, "byte 0x{raw:02X}");
            }
        }
    }
}
