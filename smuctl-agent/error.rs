use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::common::arch::CpuFamilyVariant;
use crate::smu::status;

#[derive(Error, Debug)]
pub enum SmuctlError {
    #[error("PCI operation failed: {0}")]
    PciError(String),

    #[error("MSR operation failed: {0}")]
    MsrError(String),

    #[error("CPUID operation failed: {0}")]
    CpuidError(String),

    #[error("Affinity operation failed: {0}")]
    AffinityError(String),

    #[error("SMU did not answer message 0x{opcode:X} within {attempts} polls")]
    TransactionTimeout { opcode: u32, attempts: u32 },

    #[error("SMU rejected message 0x{opcode:X} with status 0x{status:02X}")]
    CommandRejected { opcode: u32, status: u8 },

    #[error("SMU mailbox lock not acquired within {0:?}")]
    LockTimeout(Duration),

    #[error("Unsupported CPU family: {}", .0.name())]
    UnsupportedVariant(CpuFamilyVariant),

    #[error("Message {0} is not defined for this CPU family")]
    UnsupportedOpcode(&'static str),

    #[error("Opcode 0 is reserved for undefined messages")]
    ZeroOpcode,

    #[error("Invalid core topology: {0}")]
    InvalidTopology(String),

    #[error("Voltage {0:.4}V is outside the encodable range")]
    VoltageOutOfRange(f64),

    #[error("VID 0x{0:X} is outside the encodable range")]
    VidOutOfRange(u32),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Nix error: {0}")]
    NixError(#[from] nix::Error),

    #[error("Prometheus error: {0}")]
    PrometheusError(#[from] prometheus::Error),
}

impl SmuctlError {
    /// Raw SMU status byte, when the SMU answered at all
    pub fn status(&self) -> Option<u8> {
        match self {
            SmuctlError::CommandRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.status() == Some(status::CMD_REJECTED_BUSY)
    }

    pub fn is_prereq(&self) -> bool {
        self.status() == Some(status::CMD_REJECTED_PREREQ)
    }

    /// The privileged I/O capability itself failed
    pub fn is_capability_failure(&self) -> bool {
        matches!(
            self,
            SmuctlError::PciError(_)
                | SmuctlError::MsrError(_)
                | SmuctlError::CpuidError(_)
                | SmuctlError::AffinityError(_)
                | SmuctlError::IoError(_)
                | SmuctlError::NixError(_)
        )
    }

    /// Whether the caller may retry after a delay
    pub fn is_retryable(&self) -> bool {
        matches!(self, SmuctlError::TransactionTimeout { .. } | SmuctlError::LockTimeout(_))
            || self.is_busy()
            || self.is_prereq()
    }
}

pub type Result<T> = std::result::Result<T, SmuctlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_keeps_raw_status() {
        let err = SmuctlError::CommandRejected {
            opcode: 0x5A,
            status: 0xFC,
        };
        assert_eq!(err.status(), Some(0xFC));
        assert!(err.is_busy());
        assert!(err.is_retryable());
        assert!(!err.is_capability_failure());
        assert!(err.to_string().contains("status 0xFC"));
    }

    #[test]
    fn test_capability_failure_is_not_retryable() {
        let err = SmuctlError::PciError("write to 00:00.0+0xB8 failed".into());
        assert!(err.is_capability_failure());
        assert!(!err.is_retryable());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_unsupported_variant_display() {
        let err = SmuctlError::UnsupportedVariant(CpuFamilyVariant::Naples);
        assert_eq!(err.to_string(), "Unsupported CPU family: Naples");
    }
}
